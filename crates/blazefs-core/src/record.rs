//! Facade-level object records.
//!
//! [`ObjectRecord`] is what every facade operation hands back: a parsed,
//! prefix-stripped view of one stored object or one emulated directory.
//! Records are immutable snapshots; operations never mutate one in place.

use blazefs_model::FileRecord;
use serde::{Deserialize, Serialize};

use crate::path::PathPrefixer;

/// Whether a record describes a stored object or an emulated directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// A real stored object.
    File,
    /// A synthesized directory entry (nothing is stored for it).
    Dir,
}

/// One listing/stat entry, prefix already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    /// Path relative to the configured prefix; never starts with `/`.
    pub path: String,
    /// File or emulated directory.
    pub kind: RecordKind,
    /// Content size in bytes; 0 for directories.
    pub size: u64,
    /// Seconds since the epoch at which the version was stored; 0 for
    /// directories.
    pub timestamp: i64,
    /// Recorded MIME type, when the store reported one.
    pub content_type: Option<String>,
    /// Parent path (`""` for top-level entries).
    pub dirname: String,
}

impl ObjectRecord {
    /// Parse a wire file record into a facade record, stripping the
    /// configured prefix. The timestamp prefers the source modification
    /// time recorded in file info and falls back to the store's upload
    /// time; wire milliseconds become seconds.
    #[must_use]
    pub fn from_file_record(record: &FileRecord, prefixer: &PathPrefixer) -> Self {
        let path = prefixer.strip(&record.file_name);
        let dirname = dirname_of(&path).to_owned();
        let millis = record
            .last_modified_millis()
            .unwrap_or(record.upload_timestamp);
        Self {
            path,
            kind: RecordKind::File,
            size: record.content_length,
            timestamp: millis / 1000,
            content_type: record.content_type.clone(),
            dirname,
        }
    }

    /// Synthesize a directory entry for an emulated path.
    #[must_use]
    pub fn directory(path: impl Into<String>) -> Self {
        let path = path.into();
        let dirname = dirname_of(&path).to_owned();
        Self {
            path,
            kind: RecordKind::Dir,
            size: 0,
            timestamp: 0,
            content_type: None,
            dirname,
        }
    }

    /// Whether this record is a real stored object.
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.kind == RecordKind::File
    }

    /// Whether this record is an emulated directory.
    #[must_use]
    pub fn is_dir(&self) -> bool {
        self.kind == RecordKind::Dir
    }
}

/// Parent of a `/`-separated path, `""` when there is none.
///
/// # Examples
///
/// ```
/// use blazefs_core::record::dirname_of;
///
/// assert_eq!(dirname_of("a/b/c.txt"), "a/b");
/// assert_eq!(dirname_of("top.txt"), "");
/// ```
#[must_use]
pub fn dirname_of(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}
