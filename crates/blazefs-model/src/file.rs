//! File records as returned by uploads, listings, and large-file calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Content type B2 stamps on hide markers (version tombstones).
pub const HIDE_MARKER_CONTENT_TYPE: &str = "application/x-bz-hide-marker";

/// Content type asking the service to sniff the real type server-side.
pub const AUTO_CONTENT_TYPE: &str = "b2/x-auto";

/// File-info key carrying the source file's last-modified time in millis.
pub const LAST_MODIFIED_INFO_KEY: &str = "src_last_modified_millis";

/// What a file version represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    /// An unfinished large file (session started, not yet finalized).
    Start,
    /// A regular uploaded file version.
    Upload,
    /// A hide marker masking older versions of the same name.
    Hide,
    /// A virtual folder entry (only produced by delimiter listings).
    Folder,
    /// Any action this crate does not model.
    #[serde(other)]
    Unknown,
}

/// One file version as described by the service.
///
/// The same shape is returned by `b2_upload_file`, `b2_start_large_file`,
/// `b2_finish_large_file`, `b2_copy_file`, `b2_hide_file`, and each entry of
/// the listing calls, so optional fields default rather than fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Unique version identifier assigned by the store.
    pub file_id: String,
    /// Full object key within the bucket.
    pub file_name: String,
    /// Size of the stored content in bytes (0 for hide markers and
    /// unfinished large files).
    #[serde(default)]
    pub content_length: u64,
    /// MIME type recorded for the version.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Hex SHA-1 of the content; the service reports `"none"` for large
    /// files (their integrity lives in the per-part hashes).
    #[serde(default)]
    pub content_sha1: Option<String>,
    /// Milliseconds since the epoch at which the version was created.
    #[serde(default)]
    pub upload_timestamp: i64,
    /// What this version represents.
    #[serde(default)]
    pub action: Option<FileAction>,
    /// Caller-supplied metadata stored with the version.
    #[serde(default)]
    pub file_info: BTreeMap<String, String>,
}

impl FileRecord {
    /// Whether this version is a tombstone that must be filtered from
    /// normal listings and lookups.
    #[must_use]
    pub fn is_hide_marker(&self) -> bool {
        matches!(self.action, Some(FileAction::Hide))
            || self.content_type.as_deref() == Some(HIDE_MARKER_CONTENT_TYPE)
    }

    /// The `src_last_modified_millis` file info, when present and numeric.
    #[must_use]
    pub fn last_modified_millis(&self) -> Option<i64> {
        self.file_info
            .get(LAST_MODIFIED_INFO_KEY)
            .and_then(|v| v.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_deserialize_upload_response() {
        let json = r#"{
            "accountId": "a1b2c3",
            "action": "upload",
            "bucketId": "4a48fe8875c6214145260818",
            "contentLength": 1572864,
            "contentSha1": "a6a1a8b2e1cf177c20d4a79b16a2b9fab3a90a4e",
            "contentType": "video/mp4",
            "fileId": "4_z27c88f1d182b150646ff0b16_f200ec353a2184825_d20260101_m000000_c001_v0001000_t0000",
            "fileInfo": { "src_last_modified_millis": "1756000000000" },
            "fileName": "user42/videos/clip.mp4",
            "uploadTimestamp": 1756000001000
        }"#;

        let record: FileRecord =
            serde_json::from_str(json).unwrap_or_else(|e| panic!("deserialize failed: {e}"));
        assert_eq!(record.file_name, "user42/videos/clip.mp4");
        assert_eq!(record.content_length, 1_572_864);
        assert_eq!(record.action, Some(FileAction::Upload));
        assert_eq!(record.last_modified_millis(), Some(1_756_000_000_000));
        assert!(!record.is_hide_marker());
    }

    #[test]
    fn test_should_detect_hide_marker_by_content_type_or_action() {
        let json = r#"{
            "action": "hide",
            "contentLength": 0,
            "contentSha1": null,
            "contentType": "application/x-bz-hide-marker",
            "fileId": "4_z27c88f1d182b150646ff0b16_f100ec353a2184825_d20260101_m000000_c001_v0001000_t0000",
            "fileName": "user42/old.bin",
            "uploadTimestamp": 1756000002000
        }"#;

        let record: FileRecord =
            serde_json::from_str(json).unwrap_or_else(|e| panic!("deserialize failed: {e}"));
        assert!(record.is_hide_marker());

        // Either signal alone is enough.
        let by_type = FileRecord {
            action: None,
            ..record.clone()
        };
        assert!(by_type.is_hide_marker());

        let by_action = FileRecord {
            content_type: None,
            ..record
        };
        assert!(by_action.is_hide_marker());
    }

    #[test]
    fn test_should_tolerate_unknown_action() {
        let json = r#"{
            "action": "legal_hold",
            "fileId": "f1",
            "fileName": "k"
        }"#;

        let record: FileRecord =
            serde_json::from_str(json).unwrap_or_else(|e| panic!("deserialize failed: {e}"));
        assert_eq!(record.action, Some(FileAction::Unknown));
        assert_eq!(record.content_length, 0);
    }
}
