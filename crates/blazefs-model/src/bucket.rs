//! Bucket lookup types for `b2_list_buckets`.

use serde::{Deserialize, Serialize};

/// One bucket owned by the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    /// Opaque bucket handle used by every file-level call.
    pub bucket_id: String,
    /// Human-readable bucket name.
    pub bucket_name: String,
    /// Visibility class (`allPublic`, `allPrivate`, `snapshot`).
    pub bucket_type: String,
}

/// Request body for `b2_list_buckets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsRequest {
    /// Account the buckets belong to.
    pub account_id: String,
    /// Restrict the response to the bucket with this exact name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
}

/// Response body for `b2_list_buckets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBucketsResponse {
    /// Buckets matching the request filter.
    pub buckets: Vec<Bucket>,
}
