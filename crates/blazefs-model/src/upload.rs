//! Upload, copy, and delete call bodies, including the large-file session
//! calls that drive the chunked upload protocol.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Request body for `b2_get_upload_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadUrlRequest {
    /// Bucket the upload will land in.
    pub bucket_id: String,
}

/// A single-shot upload target: URL plus short-lived token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrl {
    /// Bucket the target is scoped to.
    pub bucket_id: String,
    /// Where to POST the body.
    pub upload_url: String,
    /// Token presented in the upload's `Authorization` header.
    pub authorization_token: String,
}

/// Request body for `b2_start_large_file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLargeFileRequest {
    /// Bucket the finished object will land in.
    pub bucket_id: String,
    /// Destination object key.
    pub file_name: String,
    /// MIME type recorded on the finished object.
    pub content_type: String,
    /// Optional metadata stored with the object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_info: Option<BTreeMap<String, String>>,
}

/// Request body for `b2_get_upload_part_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUploadPartUrlRequest {
    /// Large-file session the parts belong to.
    pub file_id: String,
}

/// A per-part upload target, scoped to one large-file session.
///
/// Targets are single-use in practice: the orchestrator requests a fresh one
/// for every part and never reuses them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadPartUrl {
    /// Session the target is scoped to.
    pub file_id: String,
    /// Where to POST the part bytes.
    pub upload_url: String,
    /// Token presented in the part upload's `Authorization` header.
    pub authorization_token: String,
}

/// Response body for `b2_upload_part`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartRecord {
    /// Session the part belongs to.
    pub file_id: String,
    /// 1-based position within the finished object.
    pub part_number: u32,
    /// Bytes stored for this part.
    pub content_length: u64,
    /// Hex SHA-1 the service verified on receipt.
    pub content_sha1: String,
    /// Milliseconds since the epoch at which the part was stored.
    #[serde(default)]
    pub upload_timestamp: i64,
}

/// Request body for `b2_finish_large_file`.
///
/// `part_sha1_array` is positional: element `i` must be the hash of part
/// `i + 1`. The service rejects the call when the list disagrees with the
/// parts it received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishLargeFileRequest {
    /// Session to finalize.
    pub file_id: String,
    /// Hex SHA-1 of every part, in ascending part-number order.
    pub part_sha1_array: Vec<String>,
}

/// Request body for `b2_copy_file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyFileRequest {
    /// Version to copy from.
    pub source_file_id: String,
    /// Destination object key.
    pub file_name: String,
}

/// Request body for `b2_delete_file_version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileVersionRequest {
    /// Key of the version being removed.
    pub file_name: String,
    /// Version to remove.
    pub file_id: String,
}
