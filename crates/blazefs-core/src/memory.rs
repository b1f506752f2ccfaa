//! In-memory implementation of [`B2Client`].
//!
//! Backs unit tests and local development with the same observable
//! semantics as the real service: name-ordered listings that collapse to
//! the newest version per key (tombstones included), single-use per-part
//! upload targets, SHA-1 verification on every part and on finalize, and
//! permanent deletes that let older versions resurface.
//!
//! Unfinished large-file sessions never appear in listings; only finalize
//! makes an object visible.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use futures::StreamExt;
use parking_lot::{Mutex, RwLock};

use blazefs_model::{
    FileAction, FileRecord, HIDE_MARKER_CONTENT_TYPE, LAST_MODIFIED_INFO_KEY, PartRecord,
    StartLargeFileRequest, UploadPartUrl,
};

use crate::client::{B2Client, ByteStream, ListQuery, UploadFileParams};
use crate::error::{BlazeFsError, BlazeFsResult};
use crate::utils::{generate_file_id, generate_upload_token, sha1_hex, timestamp_millis};

/// Part numbers accepted by the store.
const PART_NUMBER_RANGE: std::ops::RangeInclusive<u32> = 1..=10_000;

/// One stored version of a key (newest versions sit first in the list).
#[derive(Debug, Clone)]
struct StoredVersion {
    record: FileRecord,
    body: Bytes,
}

/// One received part of an open large-file session.
#[derive(Debug, Clone)]
struct StoredPart {
    sha1_hex: String,
    body: Bytes,
}

/// An open large-file session: metadata fixed at start, parts keyed by
/// part number, and the pool of minted-but-unused upload targets.
#[derive(Debug)]
struct LargeSession {
    key: String,
    content_type: String,
    file_info: BTreeMap<String, String>,
    parts: BTreeMap<u32, StoredPart>,
    unused_tokens: HashSet<String>,
}

/// Snapshot of the most recent finalize call, for assertions on hash-list
/// order and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishSnapshot {
    /// Session that was finalized.
    pub file_id: String,
    /// The hash list exactly as submitted.
    pub part_sha1_array: Vec<String>,
}

/// In-process store speaking the [`B2Client`] contract.
///
/// # Examples
///
/// ```
/// use blazefs_core::client::B2Client;
/// use blazefs_core::memory::InMemoryB2Client;
///
/// # tokio_test::block_on(async {
/// let store = InMemoryB2Client::new("media");
/// store.seed_file("docs/hello.txt", "text/plain", b"hello");
///
/// let body = store.download_file("media", "docs/hello.txt").await.unwrap();
/// assert_eq!(body.as_ref(), b"hello");
/// # });
/// ```
#[derive(Debug)]
pub struct InMemoryB2Client {
    bucket_id: String,
    bucket_name: String,
    files: RwLock<BTreeMap<String, Vec<StoredVersion>>>,
    sessions: DashMap<String, LargeSession>,
    part_url_requests: AtomicUsize,
    last_finish: Mutex<Option<FinishSnapshot>>,
}

impl Default for InMemoryB2Client {
    fn default() -> Self {
        Self::new("test-bucket")
    }
}

impl InMemoryB2Client {
    /// Create an empty store holding one bucket.
    #[must_use]
    pub fn new(bucket_name: &str) -> Self {
        Self {
            bucket_id: generate_file_id(),
            bucket_name: bucket_name.to_owned(),
            files: RwLock::new(BTreeMap::new()),
            sessions: DashMap::new(),
            part_url_requests: AtomicUsize::new(0),
            last_finish: Mutex::new(None),
        }
    }

    /// The bucket name this store answers for.
    #[must_use]
    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    /// Insert a version directly, bypassing upload validation. Test setup
    /// and local seeding only.
    pub fn seed_file(&self, key: &str, content_type: &str, body: &[u8]) -> FileRecord {
        let record = FileRecord {
            file_id: generate_file_id(),
            file_name: key.to_owned(),
            content_length: body.len() as u64,
            content_type: Some(content_type.to_owned()),
            content_sha1: Some(sha1_hex(body)),
            upload_timestamp: timestamp_millis(),
            action: Some(FileAction::Upload),
            file_info: BTreeMap::new(),
        };
        self.push_version(StoredVersion {
            record: record.clone(),
            body: Bytes::copy_from_slice(body),
        });
        record
    }

    /// Write a hide marker masking the current versions of `key`.
    pub fn hide_file(&self, key: &str) -> FileRecord {
        let record = FileRecord {
            file_id: generate_file_id(),
            file_name: key.to_owned(),
            content_length: 0,
            content_type: Some(HIDE_MARKER_CONTENT_TYPE.to_owned()),
            content_sha1: None,
            upload_timestamp: timestamp_millis(),
            action: Some(FileAction::Hide),
            file_info: BTreeMap::new(),
        };
        self.push_version(StoredVersion {
            record: record.clone(),
            body: Bytes::new(),
        });
        record
    }

    /// Number of stored versions for `key` (tombstones count).
    #[must_use]
    pub fn version_count(&self, key: &str) -> usize {
        self.files.read().get(key).map_or(0, Vec::len)
    }

    /// Content of the newest visible version of `key`, if any.
    #[must_use]
    pub fn object_bytes(&self, key: &str) -> Option<Bytes> {
        let files = self.files.read();
        let newest = files.get(key)?.first()?;
        if newest.record.is_hide_marker() {
            None
        } else {
            Some(newest.body.clone())
        }
    }

    /// How many per-part upload targets have been minted so far.
    #[must_use]
    pub fn part_url_requests(&self) -> usize {
        self.part_url_requests.load(Ordering::Relaxed)
    }

    /// The most recent finalize call, if one happened.
    #[must_use]
    pub fn last_finish(&self) -> Option<FinishSnapshot> {
        self.last_finish.lock().clone()
    }

    /// Number of open (unfinished) large-file sessions.
    #[must_use]
    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    /// Drop every object, session, and counter.
    pub fn reset(&self) {
        self.files.write().clear();
        self.sessions.clear();
        self.part_url_requests.store(0, Ordering::Relaxed);
        *self.last_finish.lock() = None;
    }

    fn push_version(&self, version: StoredVersion) {
        let mut files = self.files.write();
        files
            .entry(version.record.file_name.clone())
            .or_default()
            .insert(0, version);
    }

    fn check_bucket_id(&self, bucket_id: &str) -> BlazeFsResult<()> {
        if bucket_id == self.bucket_id {
            Ok(())
        } else {
            Err(bad_request(format!("unknown bucket id: {bucket_id}")))
        }
    }

    fn check_bucket_name(&self, bucket_name: &str) -> BlazeFsResult<()> {
        if bucket_name == self.bucket_name {
            Ok(())
        } else {
            Err(bad_request(format!("bucket not found: {bucket_name}")))
        }
    }

    fn newest_record(&self, key: &str) -> Option<FileRecord> {
        self.files
            .read()
            .get(key)
            .and_then(|versions| versions.first())
            .map(|v| v.record.clone())
    }
}

fn bad_request(message: String) -> BlazeFsError {
    BlazeFsError::Api {
        status: 400,
        code: "bad_request".to_owned(),
        message,
    }
}

#[async_trait]
impl B2Client for InMemoryB2Client {
    async fn bucket_id(&self, bucket_name: &str) -> BlazeFsResult<String> {
        self.check_bucket_name(bucket_name)?;
        Ok(self.bucket_id.clone())
    }

    async fn list_file_versions(
        &self,
        bucket_id: &str,
        query: &ListQuery,
    ) -> BlazeFsResult<Vec<FileRecord>> {
        self.check_bucket_id(bucket_id)?;

        if let Some(name) = &query.file_name {
            return Ok(self.newest_record(name).into_iter().collect());
        }

        let files = self.files.read();
        let records = files
            .iter()
            .filter(|(key, _)| {
                query
                    .prefix
                    .as_ref()
                    .is_none_or(|prefix| key.starts_with(prefix.as_str()))
            })
            .filter_map(|(_, versions)| versions.first())
            .map(|v| v.record.clone())
            .collect();
        Ok(records)
    }

    async fn upload_file(
        &self,
        bucket_id: &str,
        params: UploadFileParams,
    ) -> BlazeFsResult<FileRecord> {
        self.check_bucket_id(bucket_id)?;

        let computed = sha1_hex(&params.body);
        if computed != params.sha1_hex {
            return Err(BlazeFsError::HashMismatch {
                key: params.key,
                part_number: 0,
                message: format!("declared {} but received {computed}", params.sha1_hex),
            });
        }

        let mut file_info = BTreeMap::new();
        if let Some(millis) = params.last_modified_millis {
            file_info.insert(LAST_MODIFIED_INFO_KEY.to_owned(), millis.to_string());
        }

        let record = FileRecord {
            file_id: generate_file_id(),
            file_name: params.key.clone(),
            content_length: params.body.len() as u64,
            content_type: Some(params.content_type),
            content_sha1: Some(computed),
            upload_timestamp: timestamp_millis(),
            action: Some(FileAction::Upload),
            file_info,
        };
        self.push_version(StoredVersion {
            record: record.clone(),
            body: params.body,
        });
        Ok(record)
    }

    async fn start_large_file(
        &self,
        request: StartLargeFileRequest,
    ) -> BlazeFsResult<FileRecord> {
        self.check_bucket_id(&request.bucket_id)?;

        let file_id = generate_file_id();
        let file_info = request.file_info.unwrap_or_default();
        self.sessions.insert(
            file_id.clone(),
            LargeSession {
                key: request.file_name.clone(),
                content_type: request.content_type.clone(),
                file_info: file_info.clone(),
                parts: BTreeMap::new(),
                unused_tokens: HashSet::new(),
            },
        );

        Ok(FileRecord {
            file_id,
            file_name: request.file_name,
            content_length: 0,
            content_type: Some(request.content_type),
            content_sha1: Some("none".to_owned()),
            upload_timestamp: timestamp_millis(),
            action: Some(FileAction::Start),
            file_info,
        })
    }

    async fn get_upload_part_url(&self, file_id: &str) -> BlazeFsResult<UploadPartUrl> {
        let mut session = self
            .sessions
            .get_mut(file_id)
            .ok_or_else(|| bad_request(format!("no such upload session: {file_id}")))?;

        let token = generate_upload_token();
        session.unused_tokens.insert(token.clone());
        self.part_url_requests.fetch_add(1, Ordering::Relaxed);

        Ok(UploadPartUrl {
            file_id: file_id.to_owned(),
            upload_url: format!("memory://{}/{file_id}", self.bucket_name),
            authorization_token: token,
        })
    }

    async fn upload_part(
        &self,
        target: &UploadPartUrl,
        part_number: u32,
        sha1_hex_value: &str,
        body: Bytes,
    ) -> BlazeFsResult<PartRecord> {
        if !PART_NUMBER_RANGE.contains(&part_number) {
            return Err(bad_request(format!(
                "part number {part_number} outside 1..=10000"
            )));
        }

        let mut session = self
            .sessions
            .get_mut(&target.file_id)
            .ok_or_else(|| bad_request(format!("no such upload session: {}", target.file_id)))?;

        // Targets are single-use: a second upload on the same token is the
        // reuse the protocol forbids.
        if !session.unused_tokens.remove(&target.authorization_token) {
            return Err(BlazeFsError::Api {
                status: 401,
                code: "bad_auth_token".to_owned(),
                message: "upload target already used or never issued".to_owned(),
            });
        }

        let computed = sha1_hex(&body);
        if computed != sha1_hex_value {
            return Err(BlazeFsError::HashMismatch {
                key: session.key.clone(),
                part_number,
                message: format!("declared {sha1_hex_value} but received {computed}"),
            });
        }

        let content_length = body.len() as u64;
        session.parts.insert(
            part_number,
            StoredPart {
                sha1_hex: computed.clone(),
                body,
            },
        );

        Ok(PartRecord {
            file_id: target.file_id.clone(),
            part_number,
            content_length,
            content_sha1: computed,
            upload_timestamp: timestamp_millis(),
        })
    }

    async fn finish_large_file(
        &self,
        file_id: &str,
        part_sha1_array: Vec<String>,
    ) -> BlazeFsResult<FileRecord> {
        {
            let session = self
                .sessions
                .get(file_id)
                .ok_or_else(|| bad_request(format!("no such upload session: {file_id}")))?;

            if part_sha1_array.len() != session.parts.len() {
                return Err(BlazeFsError::HashMismatch {
                    key: session.key.clone(),
                    part_number: 0,
                    message: format!(
                        "hash list has {} entries but {} parts were received",
                        part_sha1_array.len(),
                        session.parts.len()
                    ),
                });
            }
            for (index, (part_number, part)) in session.parts.iter().enumerate() {
                let expected_position = index as u32 + 1;
                if *part_number != expected_position {
                    return Err(bad_request(format!(
                        "part {expected_position} missing from session"
                    )));
                }
                if part.sha1_hex != part_sha1_array[index] {
                    return Err(BlazeFsError::HashMismatch {
                        key: session.key.clone(),
                        part_number: *part_number,
                        message: format!(
                            "submitted {} but part was stored as {}",
                            part_sha1_array[index], part.sha1_hex
                        ),
                    });
                }
            }
        }

        // Validation passed; consume the session and assemble the object in
        // ascending part order.
        let (_, session) = self
            .sessions
            .remove(file_id)
            .ok_or_else(|| bad_request(format!("no such upload session: {file_id}")))?;

        let mut body = Vec::new();
        for part in session.parts.values() {
            body.extend_from_slice(&part.body);
        }

        *self.last_finish.lock() = Some(FinishSnapshot {
            file_id: file_id.to_owned(),
            part_sha1_array,
        });

        let record = FileRecord {
            file_id: file_id.to_owned(),
            file_name: session.key.clone(),
            content_length: body.len() as u64,
            content_type: Some(session.content_type),
            content_sha1: Some("none".to_owned()),
            upload_timestamp: timestamp_millis(),
            action: Some(FileAction::Upload),
            file_info: session.file_info,
        };
        self.push_version(StoredVersion {
            record: record.clone(),
            body: Bytes::from(body),
        });
        Ok(record)
    }

    async fn copy_file(
        &self,
        source_file_id: &str,
        destination_key: &str,
    ) -> BlazeFsResult<FileRecord> {
        let source = {
            let files = self.files.read();
            files
                .values()
                .flatten()
                .find(|v| v.record.file_id == source_file_id)
                .cloned()
        };
        let source = source.ok_or_else(|| BlazeFsError::NotFound {
            key: source_file_id.to_owned(),
        })?;

        let record = FileRecord {
            file_id: generate_file_id(),
            file_name: destination_key.to_owned(),
            upload_timestamp: timestamp_millis(),
            ..source.record
        };
        self.push_version(StoredVersion {
            record: record.clone(),
            body: source.body,
        });
        Ok(record)
    }

    async fn delete_file_version(&self, file_name: &str, file_id: &str) -> BlazeFsResult<()> {
        let mut files = self.files.write();
        let versions = files
            .get_mut(file_name)
            .ok_or_else(|| BlazeFsError::NotFound {
                key: file_name.to_owned(),
            })?;
        let before = versions.len();
        versions.retain(|v| v.record.file_id != file_id);
        if versions.len() == before {
            return Err(BlazeFsError::NotFound {
                key: file_name.to_owned(),
            });
        }
        if versions.is_empty() {
            files.remove(file_name);
        }
        Ok(())
    }

    async fn download_file(&self, bucket_name: &str, file_name: &str) -> BlazeFsResult<Bytes> {
        self.check_bucket_name(bucket_name)?;
        self.object_bytes(file_name)
            .ok_or_else(|| BlazeFsError::NotFound {
                key: file_name.to_owned(),
            })
    }

    async fn download_stream(
        &self,
        bucket_name: &str,
        file_name: &str,
    ) -> BlazeFsResult<ByteStream> {
        let body = self.download_file(bucket_name, file_name).await?;
        Ok(futures::stream::iter([Ok(body)]).boxed())
    }
}
