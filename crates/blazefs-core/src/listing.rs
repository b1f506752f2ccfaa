//! Listing assembly: tombstone filtering, prefix stripping, and directory
//! emulation over flat key sets.
//!
//! The store has no directories. This module fakes them deterministically:
//! every `/`-delimited ancestor of every listed file becomes exactly one
//! synthesized directory entry, unless that ancestor is itself a real
//! object key.

use std::collections::HashSet;

use blazefs_model::FileRecord;

use crate::path::{PathPrefixer, normalize};
use crate::record::ObjectRecord;

/// Assemble a facade listing from raw store versions.
///
/// `directory` is caller-relative (prefix not applied). Hide markers are
/// dropped, surviving versions are parsed and prefix-stripped, and ancestors
/// are synthesized. Unless `recursive`, the result is then narrowed to
/// direct children of `directory`. File entries keep the store's name order;
/// synthesized directories follow in first-reference order.
#[must_use]
pub fn build_listing(
    files: &[FileRecord],
    prefixer: &PathPrefixer,
    directory: &str,
    recursive: bool,
) -> Vec<ObjectRecord> {
    let directory = normalize(directory).trim_end_matches('/');

    let mut records: Vec<ObjectRecord> = files
        .iter()
        .filter(|f| !f.is_hide_marker())
        .map(|f| ObjectRecord::from_file_record(f, prefixer))
        .filter(|r| in_scope(&r.path, directory))
        .collect();

    let file_paths: HashSet<&str> = records.iter().map(|r| r.path.as_str()).collect();

    // Synthesize each ancestor below `directory` exactly once.
    let mut seen = HashSet::new();
    let mut dirs = Vec::new();
    for record in &records {
        for ancestor in ancestors_of(&record.path) {
            if !below(ancestor, directory) {
                continue;
            }
            if file_paths.contains(ancestor) {
                continue;
            }
            if seen.insert(ancestor.to_owned()) {
                dirs.push(ObjectRecord::directory(ancestor));
            }
        }
    }
    records.extend(dirs);

    if !recursive {
        records.retain(|r| r.dirname == directory);
    }
    records
}

/// Proper `/`-delimited ancestors of a path, shallowest first.
///
/// # Examples
///
/// ```
/// use blazefs_core::listing::ancestors_of;
///
/// let dirs: Vec<&str> = ancestors_of("a/b/c.txt").collect();
/// assert_eq!(dirs, vec!["a", "a/b"]);
/// ```
pub fn ancestors_of(path: &str) -> impl Iterator<Item = &str> {
    path.char_indices()
        .filter(|&(_, c)| c == '/')
        .map(|(i, _)| &path[..i])
}

/// Whether `path` lives inside `directory` (any depth).
fn in_scope(path: &str, directory: &str) -> bool {
    if directory.is_empty() {
        return !path.is_empty();
    }
    path.strip_prefix(directory)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// Whether `ancestor` is strictly below `directory`.
fn below(ancestor: &str, directory: &str) -> bool {
    if directory.is_empty() {
        return true;
    }
    ancestor.len() > directory.len() && in_scope(ancestor, directory)
}
