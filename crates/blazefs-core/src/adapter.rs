//! Filesystem-style facade over the flat object store.
//!
//! [`B2Filesystem`] maps adapter verbs onto store calls: direct uploads
//! for in-memory bodies, the large-file orchestrator for streamed writes,
//! exact-name lookups for metadata, and prefix listings re-shaped into a
//! directory tree. Every caller path is qualified with the configured
//! prefix on the way in and stripped of it on the way out.
//!
//! Hide markers read as absence: they never show up in listings, metadata
//! lookups, or reads.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use tokio::sync::OnceCell;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use typed_builder::TypedBuilder;

use blazefs_model::{AUTO_CONTENT_TYPE, FileRecord};

use crate::client::{B2Client, ByteStream, ListQuery, UploadFileParams};
use crate::config::B2Config;
use crate::error::{BlazeFsError, BlazeFsResult};
use crate::listing::build_listing;
use crate::path::{PathPrefixer, normalize};
use crate::record::ObjectRecord;
use crate::upload::LargeFileUploader;
use crate::utils::sha1_hex;

/// Options shared by the write verbs.
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct WriteOptions {
    /// MIME type to record; when absent the store sniffs one.
    #[builder(default, setter(into, strip_option))]
    pub content_type: Option<String>,
    /// Source modification time carried in object metadata, milliseconds
    /// since the epoch.
    #[builder(default, setter(strip_option))]
    pub last_modified_millis: Option<i64>,
}

/// Capability surface of a filesystem-shaped object store.
///
/// Lookup verbs (`exists`, `stat`, `size`, `mime_type`, `modified_time`)
/// report absence as `false`/`None` instead of failing; everything else
/// surfaces errors. `update` and `update_stream` are aliases of the write
/// verbs, since the store has no in-place update: writing an existing key
/// stacks a new version on top of the old one.
#[async_trait]
pub trait ObjectStorageAdapter: Send + Sync {
    /// List files and emulated directories under `directory`.
    async fn list(&self, directory: &str, recursive: bool) -> BlazeFsResult<Vec<ObjectRecord>>;

    /// Metadata for the newest visible version of `path`, if any.
    async fn stat(&self, path: &str) -> BlazeFsResult<Option<ObjectRecord>>;

    /// Whether a visible object exists at `path`.
    async fn exists(&self, path: &str) -> BlazeFsResult<bool> {
        Ok(self.stat(path).await?.is_some())
    }

    /// Content size in bytes, if the object exists.
    async fn size(&self, path: &str) -> BlazeFsResult<Option<u64>> {
        Ok(self.stat(path).await?.map(|record| record.size))
    }

    /// Recorded MIME type, if the object exists and reported one.
    async fn mime_type(&self, path: &str) -> BlazeFsResult<Option<String>> {
        Ok(self.stat(path).await?.and_then(|record| record.content_type))
    }

    /// Modification time in seconds since the epoch, if the object exists.
    async fn modified_time(&self, path: &str) -> BlazeFsResult<Option<i64>> {
        Ok(self.stat(path).await?.map(|record| record.timestamp))
    }

    /// Read the whole object into memory.
    async fn read(&self, path: &str) -> BlazeFsResult<Bytes>;

    /// Read the object as a byte stream.
    async fn read_stream(&self, path: &str) -> BlazeFsResult<ByteStream>;

    /// Write an in-memory body in a single shot.
    async fn write(
        &self,
        path: &str,
        contents: Bytes,
        options: &WriteOptions,
    ) -> BlazeFsResult<ObjectRecord>;

    /// Write a byte stream of known total size, chunking it into a
    /// large-file session when it is big enough to need one.
    async fn write_stream(
        &self,
        path: &str,
        source: impl Stream<Item = Result<Bytes, anyhow::Error>> + Send + Unpin + 'async_trait,
        total_size: Option<u64>,
        options: &WriteOptions,
    ) -> BlazeFsResult<ObjectRecord>;

    /// Alias of [`write`](Self::write).
    async fn update(
        &self,
        path: &str,
        contents: Bytes,
        options: &WriteOptions,
    ) -> BlazeFsResult<ObjectRecord> {
        self.write(path, contents, options).await
    }

    /// Alias of [`write_stream`](Self::write_stream).
    async fn update_stream(
        &self,
        path: &str,
        source: impl Stream<Item = Result<Bytes, anyhow::Error>> + Send + Unpin + 'async_trait,
        total_size: Option<u64>,
        options: &WriteOptions,
    ) -> BlazeFsResult<ObjectRecord> {
        self.write_stream(path, source, total_size, options).await
    }

    /// Move the newest version of `from` to `to`.
    async fn rename(&self, from: &str, to: &str) -> BlazeFsResult<()>;

    /// Server-side copy of the newest version of `from` to `to`.
    async fn copy(&self, from: &str, to: &str) -> BlazeFsResult<()>;

    /// Remove the newest version of `path`. An older version of the same
    /// key, if one exists, becomes visible again.
    async fn delete(&self, path: &str) -> BlazeFsResult<()>;

    /// Remove the newest version of every visible object under
    /// `directory`, returning how many were removed.
    async fn delete_directory(&self, directory: &str) -> BlazeFsResult<usize>;

    /// Directories are listing artifacts, so this stores nothing and hands
    /// back a synthetic record.
    async fn create_directory(&self, directory: &str) -> BlazeFsResult<ObjectRecord>;
}

/// Adapter facade bound to one bucket and one path prefix.
#[derive(Debug)]
pub struct B2Filesystem {
    client: Arc<dyn B2Client>,
    config: B2Config,
    prefixer: PathPrefixer,
    cancellation: CancellationToken,
    bucket_id: OnceCell<String>,
}

impl B2Filesystem {
    /// Create a facade over `client` using the bucket and prefix from
    /// `config`. The bucket id is resolved lazily on first use.
    #[must_use]
    pub fn new(client: Arc<dyn B2Client>, config: B2Config) -> Self {
        let prefixer = PathPrefixer::new(&config.path_prefix);
        Self {
            client,
            config,
            prefixer,
            cancellation: CancellationToken::new(),
            bucket_id: OnceCell::new(),
        }
    }

    /// Replace the cancellation token honored by streamed writes.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The configuration this facade was built from.
    #[must_use]
    pub fn config(&self) -> &B2Config {
        &self.config
    }

    async fn bucket_id(&self) -> BlazeFsResult<&str> {
        let id = self
            .bucket_id
            .get_or_try_init(|| async { self.client.bucket_id(&self.config.bucket_name).await })
            .await?;
        Ok(id.as_str())
    }

    async fn uploader(&self) -> BlazeFsResult<LargeFileUploader> {
        let bucket_id = self.bucket_id().await?;
        Ok(LargeFileUploader::new(Arc::clone(&self.client), bucket_id)
            .with_cancellation(self.cancellation.clone()))
    }

    /// Newest visible version of `path`. A hide marker on top counts as
    /// absent.
    async fn find_record(&self, path: &str) -> BlazeFsResult<FileRecord> {
        let key = self.prefixer.apply(path);
        let bucket_id = self.bucket_id().await?;
        let records = self
            .client
            .list_file_versions(bucket_id, &ListQuery::exact(key.clone()))
            .await?;
        records
            .into_iter()
            .find(|record| record.file_name == key)
            .filter(|record| !record.is_hide_marker())
            .ok_or_else(|| BlazeFsError::NotFound {
                key: path.to_owned(),
            })
    }

    /// Query matching every key under `directory`, prefix applied.
    fn directory_query(&self, directory: &str) -> ListQuery {
        let mut prefix = self.prefixer.apply(directory.trim_end_matches('/'));
        if !prefix.is_empty() && !prefix.ends_with('/') {
            prefix.push('/');
        }
        if prefix.is_empty() {
            ListQuery::all()
        } else {
            ListQuery::with_prefix(prefix)
        }
    }
}

/// Re-key a store-side `NotFound` to the caller's path.
fn scoped_not_found(error: BlazeFsError, path: &str) -> BlazeFsError {
    if error.is_not_found() {
        BlazeFsError::NotFound {
            key: path.to_owned(),
        }
    } else {
        error
    }
}

#[async_trait]
impl ObjectStorageAdapter for B2Filesystem {
    async fn list(&self, directory: &str, recursive: bool) -> BlazeFsResult<Vec<ObjectRecord>> {
        let query = self.directory_query(directory);
        let bucket_id = self.bucket_id().await?;
        let records = self.client.list_file_versions(bucket_id, &query).await?;
        Ok(build_listing(&records, &self.prefixer, directory, recursive))
    }

    async fn stat(&self, path: &str) -> BlazeFsResult<Option<ObjectRecord>> {
        match self.find_record(path).await {
            Ok(record) => Ok(Some(ObjectRecord::from_file_record(&record, &self.prefixer))),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn read(&self, path: &str) -> BlazeFsResult<Bytes> {
        let key = self.prefixer.apply(path);
        self.client
            .download_file(&self.config.bucket_name, &key)
            .await
            .map_err(|e| scoped_not_found(e, path))
    }

    async fn read_stream(&self, path: &str) -> BlazeFsResult<ByteStream> {
        let key = self.prefixer.apply(path);
        self.client
            .download_stream(&self.config.bucket_name, &key)
            .await
            .map_err(|e| scoped_not_found(e, path))
    }

    async fn write(
        &self,
        path: &str,
        contents: Bytes,
        options: &WriteOptions,
    ) -> BlazeFsResult<ObjectRecord> {
        let key = self.prefixer.apply(path);
        let bucket_id = self.bucket_id().await?;
        debug!(%key, bytes = contents.len(), "writing object");
        let params = UploadFileParams {
            key,
            content_type: options
                .content_type
                .clone()
                .unwrap_or_else(|| AUTO_CONTENT_TYPE.to_owned()),
            sha1_hex: sha1_hex(&contents),
            last_modified_millis: options.last_modified_millis,
            body: contents,
        };
        let record = self.client.upload_file(bucket_id, params).await?;
        Ok(ObjectRecord::from_file_record(&record, &self.prefixer))
    }

    async fn write_stream(
        &self,
        path: &str,
        source: impl Stream<Item = Result<Bytes, anyhow::Error>> + Send + Unpin + 'async_trait,
        total_size: Option<u64>,
        options: &WriteOptions,
    ) -> BlazeFsResult<ObjectRecord> {
        let total = total_size.ok_or_else(|| BlazeFsError::SizeUnknown {
            key: path.to_owned(),
        })?;
        let key = self.prefixer.apply(path);
        debug!(%key, bytes = total, "writing object from stream");
        let uploader = self.uploader().await?;
        let content_type = options.content_type.as_deref().unwrap_or(AUTO_CONTENT_TYPE);
        let record = uploader
            .upload(source, total, &key, content_type, options.last_modified_millis)
            .await
            .map_err(|e| match e {
                BlazeFsError::SizeUnknown { .. } => BlazeFsError::SizeUnknown {
                    key: path.to_owned(),
                },
                other => other,
            })?;
        Ok(ObjectRecord::from_file_record(&record, &self.prefixer))
    }

    async fn rename(&self, from: &str, to: &str) -> BlazeFsResult<()> {
        let source = self.find_record(from).await?;
        let destination = self.prefixer.apply(to);
        debug!(from = %source.file_name, to = %destination, "renaming object");
        self.client.copy_file(&source.file_id, &destination).await?;
        self.client
            .delete_file_version(&source.file_name, &source.file_id)
            .await?;
        Ok(())
    }

    async fn copy(&self, from: &str, to: &str) -> BlazeFsResult<()> {
        let source = self.find_record(from).await?;
        let destination = self.prefixer.apply(to);
        debug!(from = %source.file_name, to = %destination, "copying object");
        self.client.copy_file(&source.file_id, &destination).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> BlazeFsResult<()> {
        let record = self.find_record(path).await?;
        debug!(key = %record.file_name, "deleting newest version");
        self.client
            .delete_file_version(&record.file_name, &record.file_id)
            .await?;
        Ok(())
    }

    async fn delete_directory(&self, directory: &str) -> BlazeFsResult<usize> {
        let query = self.directory_query(directory);
        let bucket_id = self.bucket_id().await?;
        let records = self.client.list_file_versions(bucket_id, &query).await?;

        let mut deleted = 0;
        for record in records.iter().filter(|record| !record.is_hide_marker()) {
            self.client
                .delete_file_version(&record.file_name, &record.file_id)
                .await?;
            deleted += 1;
        }
        if deleted == 0 {
            return Err(BlazeFsError::InvalidState {
                message: format!("no objects under directory {directory:?}"),
            });
        }
        debug!(directory, deleted, "deleted directory contents");
        Ok(deleted)
    }

    async fn create_directory(&self, directory: &str) -> BlazeFsResult<ObjectRecord> {
        // Nothing to store; the entry only ever exists in listings.
        Ok(ObjectRecord::directory(
            normalize(directory).trim_end_matches('/'),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::memory::InMemoryB2Client;

    fn filesystem_with(prefix: &str) -> (Arc<InMemoryB2Client>, B2Filesystem) {
        let client = Arc::new(InMemoryB2Client::new("adapter-bucket"));
        let config = B2Config::builder()
            .bucket_name("adapter-bucket".into())
            .path_prefix(prefix.into())
            .build();
        let filesystem = B2Filesystem::new(Arc::clone(&client) as Arc<dyn B2Client>, config);
        (client, filesystem)
    }

    fn sample_body(len: usize) -> Bytes {
        let mut buf = Vec::with_capacity(len);
        for index in 0..len {
            buf.push((index % 251) as u8);
        }
        Bytes::from(buf)
    }

    fn chunked(body: &Bytes, chunk_len: usize) -> impl Stream<Item = Result<Bytes, anyhow::Error>> + Send + Unpin {
        let mut rest = body.clone();
        let mut chunks = Vec::new();
        while rest.len() > chunk_len {
            chunks.push(Ok(rest.split_to(chunk_len)));
        }
        chunks.push(Ok(rest));
        futures::stream::iter(chunks)
    }

    // -----------------------------------------------------------------------
    // Listings and directory emulation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_should_emulate_directories_exactly_once() {
        let (client, fs) = filesystem_with("");
        client.seed_file("a/b/c.txt", "text/plain", b"1");
        client.seed_file("a/d.txt", "text/plain", b"2");

        let records = fs
            .list("", true)
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let entries: Vec<(&str, bool)> = records
            .iter()
            .map(|r| (r.path.as_str(), r.is_dir()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("a/b/c.txt", false),
                ("a/d.txt", false),
                ("a", true),
                ("a/b", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_should_scope_listing_to_directory() {
        let (client, fs) = filesystem_with("");
        client.seed_file("a/one.txt", "text/plain", b"1");
        client.seed_file("a/b/two.txt", "text/plain", b"2");
        client.seed_file("c/three.txt", "text/plain", b"3");

        let shallow = fs
            .list("a", false)
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let entries: Vec<(&str, bool)> = shallow
            .iter()
            .map(|r| (r.path.as_str(), r.is_dir()))
            .collect();
        assert_eq!(entries, vec![("a/one.txt", false), ("a/b", true)]);

        let deep = fs
            .list("a", true)
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let entries: Vec<(&str, bool)> = deep
            .iter()
            .map(|r| (r.path.as_str(), r.is_dir()))
            .collect();
        assert_eq!(
            entries,
            vec![("a/b/two.txt", false), ("a/one.txt", false), ("a/b", true)]
        );
    }

    #[tokio::test]
    async fn test_should_strip_prefix_from_listed_paths() {
        let (client, fs) = filesystem_with("user42/");
        client.seed_file("user42/a/b/c.txt", "text/plain", b"1");
        client.seed_file("user42/a/d.txt", "text/plain", b"2");
        // Outside the prefix, must never leak into results.
        client.seed_file("other/a/e.txt", "text/plain", b"3");

        let records = fs
            .list("", true)
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        let paths: Vec<&str> = records.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a/b/c.txt", "a/d.txt", "a", "a/b"]);
    }

    #[tokio::test]
    async fn test_should_hide_tombstones_everywhere() {
        let (client, fs) = filesystem_with("user42/");
        client.seed_file("user42/gone.txt", "text/plain", b"bye");
        client.hide_file("user42/gone.txt");

        let records = fs
            .list("", true)
            .await
            .unwrap_or_else(|e| panic!("list failed: {e}"));
        assert!(records.is_empty());
        assert!(!fs.exists("gone.txt").await.unwrap());
        assert!(fs.stat("gone.txt").await.unwrap().is_none());
        assert!(fs.size("gone.txt").await.unwrap().is_none());
    }

    // -----------------------------------------------------------------------
    // Metadata lookups
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_should_convert_missing_lookups_to_absent() {
        let (_client, fs) = filesystem_with("user42/");

        assert!(!fs.exists("nope.txt").await.unwrap());
        assert!(fs.stat("nope.txt").await.unwrap().is_none());
        assert!(fs.size("nope.txt").await.unwrap().is_none());
        assert!(fs.mime_type("nope.txt").await.unwrap().is_none());
        assert!(fs.modified_time("nope.txt").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_should_report_metadata_from_write_options() {
        let (_client, fs) = filesystem_with("user42/");
        let options = WriteOptions::builder()
            .content_type("text/markdown")
            .last_modified_millis(1_756_000_002_000)
            .build();
        fs.write("docs/note.md", Bytes::from_static(b"# hi"), &options)
            .await
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        assert_eq!(fs.size("docs/note.md").await.unwrap(), Some(4));
        assert_eq!(
            fs.mime_type("docs/note.md").await.unwrap().as_deref(),
            Some("text/markdown")
        );
        assert_eq!(
            fs.modified_time("docs/note.md").await.unwrap(),
            Some(1_756_000_002)
        );
    }

    // -----------------------------------------------------------------------
    // Reads and writes
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_should_round_trip_small_write() {
        let (client, fs) = filesystem_with("user42/");

        let record = fs
            .write(
                "docs/note.md",
                Bytes::from_static(b"hello"),
                &WriteOptions::default(),
            )
            .await
            .unwrap_or_else(|e| panic!("write failed: {e}"));
        assert_eq!(record.path, "docs/note.md");
        assert!(record.is_file());
        assert_eq!(record.size, 5);
        assert_eq!(record.content_type.as_deref(), Some(AUTO_CONTENT_TYPE));

        // Stored under the prefixed key, read back through the caller path.
        assert_eq!(
            client.object_bytes("user42/docs/note.md").as_deref(),
            Some(b"hello".as_slice())
        );
        let body = fs
            .read("docs/note.md")
            .await
            .unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(&body[..], b"hello");
    }

    #[tokio::test]
    async fn test_should_error_on_read_of_missing_object() {
        let (_client, fs) = filesystem_with("user42/");

        let err = fs
            .read("absent.bin")
            .await
            .expect_err("missing object must fail");
        assert!(matches!(err, BlazeFsError::NotFound { ref key } if key == "absent.bin"));
    }

    #[tokio::test]
    async fn test_should_stream_large_write_through_chunked_session() {
        let (client, fs) = filesystem_with("user42/");
        let body = sample_body(12_000_000);

        let record = fs
            .write_stream(
                "videos/clip.mp4",
                chunked(&body, 1_048_576),
                Some(12_000_000),
                &WriteOptions::builder().content_type("video/mp4").build(),
            )
            .await
            .unwrap_or_else(|e| panic!("write_stream failed: {e}"));

        assert_eq!(record.path, "videos/clip.mp4");
        assert_eq!(record.size, 12_000_000);
        assert_eq!(client.part_url_requests(), 2);
        let finish = client
            .last_finish()
            .unwrap_or_else(|| panic!("finish snapshot missing"));
        assert_eq!(finish.part_sha1_array.len(), 2);
        assert_eq!(
            client.object_bytes("user42/videos/clip.mp4").as_ref(),
            Some(&body)
        );
    }

    #[tokio::test]
    async fn test_should_reject_streamed_write_without_size() {
        let (_client, fs) = filesystem_with("user42/");

        let err = fs
            .write_stream(
                "unknown.bin",
                chunked(&Bytes::from_static(b"body"), 2),
                None,
                &WriteOptions::default(),
            )
            .await
            .expect_err("unknown size must fail");
        assert!(matches!(err, BlazeFsError::SizeUnknown { ref key } if key == "unknown.bin"));

        let err = fs
            .write_stream(
                "empty.bin",
                futures::stream::empty::<Result<Bytes, anyhow::Error>>(),
                Some(0),
                &WriteOptions::default(),
            )
            .await
            .expect_err("zero size must fail");
        assert!(matches!(err, BlazeFsError::SizeUnknown { ref key } if key == "empty.bin"));
    }

    #[tokio::test]
    async fn test_should_cancel_streamed_write() {
        let (client, filesystem) = filesystem_with("user42/");
        let token = CancellationToken::new();
        token.cancel();
        let fs = filesystem.with_cancellation(token);
        let body = sample_body(12_000_000);

        let err = fs
            .write_stream(
                "videos/clip.mp4",
                chunked(&body, 1_048_576),
                Some(12_000_000),
                &WriteOptions::default(),
            )
            .await
            .expect_err("cancelled write must fail");
        assert!(matches!(err, BlazeFsError::Cancelled { .. }));
        assert_eq!(client.part_url_requests(), 0);
        assert_eq!(client.open_sessions(), 1);
    }

    #[tokio::test]
    async fn test_should_alias_update_to_write() {
        let (client, fs) = filesystem_with("user42/");
        fs.write("a.txt", Bytes::from_static(b"one"), &WriteOptions::default())
            .await
            .unwrap_or_else(|e| panic!("write failed: {e}"));
        fs.update("a.txt", Bytes::from_static(b"two"), &WriteOptions::default())
            .await
            .unwrap_or_else(|e| panic!("update failed: {e}"));

        let body = fs
            .read("a.txt")
            .await
            .unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(&body[..], b"two");
        // The old version still exists underneath.
        assert_eq!(client.version_count("user42/a.txt"), 2);

        fs.update_stream(
            "a.txt",
            chunked(&Bytes::from_static(b"three"), 2),
            Some(5),
            &WriteOptions::default(),
        )
        .await
        .unwrap_or_else(|e| panic!("update_stream failed: {e}"));
        let body = fs
            .read("a.txt")
            .await
            .unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(&body[..], b"three");
    }

    // -----------------------------------------------------------------------
    // Rename, copy, delete
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_should_rename_across_directories() {
        let (client, fs) = filesystem_with("user42/");
        fs.write("old/a.txt", Bytes::from_static(b"payload"), &WriteOptions::default())
            .await
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        fs.rename("old/a.txt", "new/b.txt")
            .await
            .unwrap_or_else(|e| panic!("rename failed: {e}"));

        assert!(!fs.exists("old/a.txt").await.unwrap());
        assert_eq!(client.version_count("user42/old/a.txt"), 0);
        let body = fs
            .read("new/b.txt")
            .await
            .unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(&body[..], b"payload");
    }

    #[tokio::test]
    async fn test_should_copy_preserving_source() {
        let (_client, fs) = filesystem_with("user42/");
        fs.write("src.txt", Bytes::from_static(b"shared"), &WriteOptions::default())
            .await
            .unwrap_or_else(|e| panic!("write failed: {e}"));

        fs.copy("src.txt", "dup.txt")
            .await
            .unwrap_or_else(|e| panic!("copy failed: {e}"));

        assert!(fs.exists("src.txt").await.unwrap());
        let body = fs
            .read("dup.txt")
            .await
            .unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(&body[..], b"shared");
    }

    #[tokio::test]
    async fn test_should_delete_newest_version_only() {
        let (client, fs) = filesystem_with("user42/");
        client.seed_file("user42/v.txt", "text/plain", b"old");
        client.seed_file("user42/v.txt", "text/plain", b"new");

        fs.delete("v.txt")
            .await
            .unwrap_or_else(|e| panic!("delete failed: {e}"));

        // The older version resurfaces.
        let body = fs
            .read("v.txt")
            .await
            .unwrap_or_else(|e| panic!("read failed: {e}"));
        assert_eq!(&body[..], b"old");

        fs.delete("v.txt")
            .await
            .unwrap_or_else(|e| panic!("second delete failed: {e}"));
        assert!(!fs.exists("v.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_should_error_when_deleting_missing_object() {
        let (_client, fs) = filesystem_with("user42/");

        let err = fs
            .delete("absent.txt")
            .await
            .expect_err("missing object must fail");
        assert!(matches!(err, BlazeFsError::NotFound { ref key } if key == "absent.txt"));
    }

    #[tokio::test]
    async fn test_should_delete_directory_contents() {
        let (client, fs) = filesystem_with("user42/");
        client.seed_file("user42/d/x.txt", "text/plain", b"1");
        client.seed_file("user42/d/sub/y.txt", "text/plain", b"2");
        client.seed_file("user42/keep.txt", "text/plain", b"3");

        let deleted = fs
            .delete_directory("d")
            .await
            .unwrap_or_else(|e| panic!("delete_directory failed: {e}"));
        assert_eq!(deleted, 2);
        assert!(fs.exists("keep.txt").await.unwrap());
        assert!(fs.list("d", true).await.unwrap().is_empty());

        let err = fs
            .delete_directory("d")
            .await
            .expect_err("empty directory must fail");
        assert!(matches!(err, BlazeFsError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_should_stub_create_directory() {
        let (client, fs) = filesystem_with("user42/");

        let record = fs
            .create_directory("/new/dir/")
            .await
            .unwrap_or_else(|e| panic!("create_directory failed: {e}"));
        assert!(record.is_dir());
        assert_eq!(record.path, "new/dir");
        assert_eq!(record.size, 0);
        // Nothing was stored.
        assert!(fs.list("", true).await.unwrap().is_empty());
        assert_eq!(client.version_count("user42/new/dir"), 0);
    }
}
