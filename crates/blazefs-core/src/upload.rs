//! Large-file upload orchestration.
//!
//! Payloads that span at least two parts go through the B2 large-file
//! session flow: start a session, upload SHA-1-tagged parts against a
//! fresh per-part target, then finalize with the hash list in ascending
//! part order. Anything smaller is buffered and sent as a single-shot
//! upload instead.
//!
//! Cancellation is honored at part boundaries. A cancelled upload leaves
//! its session behind for the service to expire; no cleanup call is made.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use blazefs_model::{FileRecord, LAST_MODIFIED_INFO_KEY, StartLargeFileRequest};

use crate::client::{B2Client, UploadFileParams};
use crate::error::{BlazeFsError, BlazeFsResult};
use crate::utils::{ceil_div, sha1_hex};

/// Part size used when the payload holds at least one full default part.
pub const DEFAULT_PART_SIZE: u64 = 10_000_000;

/// Part size used for payloads smaller than [`DEFAULT_PART_SIZE`].
pub const FALLBACK_PART_SIZE: u64 = 5_000_000;

/// Hard ceiling on parts per session, matching the service limit.
pub const MAX_PART_COUNT: u64 = 10_000;

/// How a payload of a known size will be cut into parts.
///
/// # Examples
///
/// ```
/// use blazefs_core::upload::UploadPlan;
///
/// let plan = UploadPlan::for_size(12_000_000)?;
/// assert_eq!(plan.part_size, 10_000_000);
/// assert_eq!(plan.part_count, 2);
/// # Ok::<(), blazefs_core::BlazeFsError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPlan {
    /// Bytes per part; only the final part may be smaller.
    pub part_size: u64,
    /// Number of parts the payload divides into.
    pub part_count: u64,
}

impl UploadPlan {
    /// Pick the part size and count for a payload of `total_size` bytes.
    ///
    /// Payloads below [`DEFAULT_PART_SIZE`] use [`FALLBACK_PART_SIZE`] so
    /// that mid-sized payloads still split into multiple parts. Fails with
    /// [`BlazeFsError::InvalidState`] when the payload would need more than
    /// [`MAX_PART_COUNT`] parts.
    pub fn for_size(total_size: u64) -> BlazeFsResult<Self> {
        let part_size = if total_size < DEFAULT_PART_SIZE {
            FALLBACK_PART_SIZE
        } else {
            DEFAULT_PART_SIZE
        };
        let part_count = ceil_div(total_size, part_size);
        if part_count > MAX_PART_COUNT {
            return Err(BlazeFsError::InvalidState {
                message: format!(
                    "payload of {total_size} bytes needs {part_count} parts, over the {MAX_PART_COUNT}-part session limit"
                ),
            });
        }
        Ok(Self {
            part_size,
            part_count,
        })
    }

    /// Whether the payload is too small to be worth a session.
    #[must_use]
    pub fn is_single_shot(&self) -> bool {
        self.part_count < 2
    }
}

/// Drives one streamed upload end to end against a [`B2Client`].
///
/// The uploader is cheap to clone and holds no per-upload state; each
/// [`upload`](Self::upload) call runs its own session.
#[derive(Debug, Clone)]
pub struct LargeFileUploader {
    client: Arc<dyn B2Client>,
    bucket_id: String,
    cancellation: CancellationToken,
}

impl LargeFileUploader {
    /// Create an uploader targeting one bucket.
    #[must_use]
    pub fn new(client: Arc<dyn B2Client>, bucket_id: impl Into<String>) -> Self {
        Self {
            client,
            bucket_id: bucket_id.into(),
            cancellation: CancellationToken::new(),
        }
    }

    /// Replace the cancellation token checked before each part target
    /// request.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Upload `total_size` bytes from `source` to `key`.
    ///
    /// The stream may yield chunks of any size; they are re-buffered into
    /// plan-sized parts. The byte count actually delivered must match
    /// `total_size` exactly, and a zero `total_size` is rejected with
    /// [`BlazeFsError::SizeUnknown`] before anything is read.
    pub async fn upload<S>(
        &self,
        source: S,
        total_size: u64,
        key: &str,
        content_type: &str,
        last_modified_millis: Option<i64>,
    ) -> BlazeFsResult<FileRecord>
    where
        S: Stream<Item = Result<Bytes, anyhow::Error>> + Send + Unpin,
    {
        if total_size == 0 {
            return Err(BlazeFsError::SizeUnknown {
                key: key.to_owned(),
            });
        }
        let plan = UploadPlan::for_size(total_size)?;
        if plan.is_single_shot() {
            return self
                .upload_single_shot(source, total_size, key, content_type, last_modified_millis)
                .await;
        }
        self.upload_chunked(source, total_size, plan, key, content_type, last_modified_millis)
            .await
    }

    async fn upload_single_shot<S>(
        &self,
        mut source: S,
        total_size: u64,
        key: &str,
        content_type: &str,
        last_modified_millis: Option<i64>,
    ) -> BlazeFsResult<FileRecord>
    where
        S: Stream<Item = Result<Bytes, anyhow::Error>> + Send + Unpin,
    {
        debug!(key, bytes = total_size, "payload fits one part, skipping session");
        let mut body = BytesMut::with_capacity(total_size as usize);
        while let Some(item) = source.next().await {
            let chunk = item.map_err(BlazeFsError::Internal)?;
            body.extend_from_slice(&chunk);
        }
        if body.len() as u64 != total_size {
            return Err(BlazeFsError::InvalidState {
                message: format!(
                    "stream delivered {} bytes but {total_size} were declared",
                    body.len()
                ),
            });
        }
        let body = body.freeze();
        let params = UploadFileParams {
            key: key.to_owned(),
            content_type: content_type.to_owned(),
            sha1_hex: sha1_hex(&body),
            last_modified_millis,
            body,
        };
        self.client.upload_file(&self.bucket_id, params).await
    }

    async fn upload_chunked<S>(
        &self,
        mut source: S,
        total_size: u64,
        plan: UploadPlan,
        key: &str,
        content_type: &str,
        last_modified_millis: Option<i64>,
    ) -> BlazeFsResult<FileRecord>
    where
        S: Stream<Item = Result<Bytes, anyhow::Error>> + Send + Unpin,
    {
        let file_info = last_modified_millis.map(|millis| {
            BTreeMap::from([(LAST_MODIFIED_INFO_KEY.to_owned(), millis.to_string())])
        });
        let session = self
            .client
            .start_large_file(StartLargeFileRequest {
                bucket_id: self.bucket_id.clone(),
                file_name: key.to_owned(),
                content_type: content_type.to_owned(),
                file_info,
            })
            .await?;
        debug!(
            key,
            file_id = %session.file_id,
            parts = plan.part_count,
            part_size = plan.part_size,
            "opened large-file session"
        );

        let part_len = plan.part_size as usize;
        let mut pending = BytesMut::with_capacity(part_len);
        let mut part_hashes = Vec::with_capacity(plan.part_count as usize);
        let mut part_number: u32 = 1;
        let mut received: u64 = 0;

        while let Some(item) = source.next().await {
            let chunk = item.map_err(BlazeFsError::Internal)?;
            received += chunk.len() as u64;
            if received > total_size {
                return Err(BlazeFsError::InvalidState {
                    message: format!(
                        "stream exceeded the declared length of {total_size} bytes"
                    ),
                });
            }
            pending.extend_from_slice(&chunk);
            // The final part is held back and flushed after the stream ends,
            // so it can be smaller than the plan size.
            while pending.len() >= part_len && u64::from(part_number) < plan.part_count {
                let body = pending.split_to(part_len).freeze();
                let digest = self.send_part(&session.file_id, part_number, body, key).await?;
                part_hashes.push(digest);
                part_number += 1;
            }
        }
        if received != total_size {
            return Err(BlazeFsError::InvalidState {
                message: format!("stream ended after {received} of {total_size} declared bytes"),
            });
        }

        let digest = self
            .send_part(&session.file_id, part_number, pending.freeze(), key)
            .await?;
        part_hashes.push(digest);

        let record = self
            .client
            .finish_large_file(&session.file_id, part_hashes)
            .await?;
        info!(
            key,
            file_id = %record.file_id,
            parts = plan.part_count,
            bytes = total_size,
            "completed large-file upload"
        );
        Ok(record)
    }

    /// Upload one part: check for cancellation, fetch a fresh target, send
    /// the bytes, and hand back the part's hex SHA-1 for the finalize list.
    async fn send_part(
        &self,
        file_id: &str,
        part_number: u32,
        body: Bytes,
        key: &str,
    ) -> BlazeFsResult<String> {
        if self.cancellation.is_cancelled() {
            debug!(key, part_number, "upload cancelled, leaving session to expire");
            return Err(BlazeFsError::Cancelled {
                key: key.to_owned(),
            });
        }
        let target = self.client.get_upload_part_url(file_id).await?;
        let digest = sha1_hex(&body);
        let part = self
            .client
            .upload_part(&target, part_number, &digest, body)
            .await?;
        debug!(
            part_number = part.part_number,
            bytes = part.content_length,
            "uploaded part"
        );
        Ok(digest)
    }
}
