//! The store client capability consumed by the orchestrator and facade.
//!
//! Implementations own transport concerns (authorization, pagination,
//! encoding); callers see request/response shapes only. The workspace ships
//! two: the reqwest transport in `blazefs-http` and the in-memory store in
//! [`crate::memory`].

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use blazefs_model::{FileRecord, PartRecord, StartLargeFileRequest, UploadPartUrl};

use crate::error::BlazeFsResult;

/// Byte stream handed out by downloads.
pub type ByteStream = BoxStream<'static, Result<Bytes, anyhow::Error>>;

/// Scope of a version listing: everything, a key prefix, or one exact key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Only keys beginning with this prefix.
    pub prefix: Option<String>,
    /// Only the newest version of exactly this key.
    pub file_name: Option<String>,
}

impl ListQuery {
    /// Every version in the bucket.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Versions under a key prefix.
    #[must_use]
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            file_name: None,
        }
    }

    /// The newest version of one exact key. Hide markers are included;
    /// the caller decides what a tombstone means.
    #[must_use]
    pub fn exact(file_name: impl Into<String>) -> Self {
        Self {
            prefix: None,
            file_name: Some(file_name.into()),
        }
    }
}

/// Everything one single-shot upload carries.
#[derive(Debug, Clone)]
pub struct UploadFileParams {
    /// Destination object key (prefix already applied).
    pub key: String,
    /// MIME type to record; `b2/x-auto` asks the store to sniff.
    pub content_type: String,
    /// Hex SHA-1 of `body`, computed by the caller over the whole body.
    pub sha1_hex: String,
    /// Optional `src_last_modified_millis` file info.
    pub last_modified_millis: Option<i64>,
    /// The object content.
    pub body: Bytes,
}

/// Authenticated operations against the object store.
///
/// One method per remote call; no retries, no session state beyond what the
/// store itself issues. Injected into the facade and orchestrator as an
/// `Arc<dyn B2Client>`.
#[async_trait]
pub trait B2Client: Send + Sync + Debug {
    /// Resolve a bucket name to the opaque id file-level calls need.
    /// Implementations cache the answer.
    async fn bucket_id(&self, bucket_name: &str) -> BlazeFsResult<String>;

    /// List file versions in name order, transparently following
    /// pagination. Hide markers are included; callers filter.
    async fn list_file_versions(
        &self,
        bucket_id: &str,
        query: &ListQuery,
    ) -> BlazeFsResult<Vec<FileRecord>>;

    /// Upload a whole object in one call.
    async fn upload_file(
        &self,
        bucket_id: &str,
        params: UploadFileParams,
    ) -> BlazeFsResult<FileRecord>;

    /// Open a large-file session; the returned record carries the session
    /// `file_id`.
    async fn start_large_file(
        &self,
        request: StartLargeFileRequest,
    ) -> BlazeFsResult<FileRecord>;

    /// Request a fresh per-part upload target for an open session. Targets
    /// are not reusable across parts.
    async fn get_upload_part_url(&self, file_id: &str) -> BlazeFsResult<UploadPartUrl>;

    /// Upload one part's bytes to a previously requested target.
    async fn upload_part(
        &self,
        target: &UploadPartUrl,
        part_number: u32,
        sha1_hex: &str,
        body: Bytes,
    ) -> BlazeFsResult<PartRecord>;

    /// Finalize a session. `part_sha1_array` must hold every part's hash in
    /// ascending part-number order; the store validates the list against
    /// what it received.
    async fn finish_large_file(
        &self,
        file_id: &str,
        part_sha1_array: Vec<String>,
    ) -> BlazeFsResult<FileRecord>;

    /// Server-side copy of an existing version to a new key.
    async fn copy_file(
        &self,
        source_file_id: &str,
        destination_key: &str,
    ) -> BlazeFsResult<FileRecord>;

    /// Remove one version permanently.
    async fn delete_file_version(&self, file_name: &str, file_id: &str) -> BlazeFsResult<()>;

    /// Download a whole object into memory.
    async fn download_file(&self, bucket_name: &str, file_name: &str) -> BlazeFsResult<Bytes>;

    /// Download an object as a byte stream.
    async fn download_stream(
        &self,
        bucket_name: &str,
        file_name: &str,
    ) -> BlazeFsResult<ByteStream>;
}
