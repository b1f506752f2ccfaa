//! Listing types for `b2_list_file_versions`.
//!
//! Version listings are the one listing call this adapter uses: unlike the
//! name-only variant, they surface hide markers, which the facade filters
//! client-side.

use serde::{Deserialize, Serialize};

use crate::file::FileRecord;

/// Request body for `b2_list_file_versions`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileVersionsRequest {
    /// Bucket to list.
    pub bucket_id: String,
    /// Resume point: first file name to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_file_name: Option<String>,
    /// Resume point: first file id to return (paired with `start_file_name`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_file_id: Option<String>,
    /// Page size; the service caps this at 10,000.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_file_count: Option<u32>,
    /// Only names beginning with this prefix are returned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
}

/// Response body for `b2_list_file_versions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFileVersionsResponse {
    /// Versions in name order, then by recency within a name.
    pub files: Vec<FileRecord>,
    /// Resume name for the next page; `None` when exhausted.
    #[serde(default)]
    pub next_file_name: Option<String>,
    /// Resume id for the next page; `None` when exhausted.
    #[serde(default)]
    pub next_file_id: Option<String>,
}

impl ListFileVersionsResponse {
    /// Whether another page remains.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.next_file_name.is_some()
    }
}
