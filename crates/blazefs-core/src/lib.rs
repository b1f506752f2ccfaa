//! Core of the BlazeFS adapter: the large-file upload orchestrator plus
//! the filesystem facade it plugs into.
//!
//! This crate turns a flat, versioned object store into something
//! filesystem-shaped: prefix-scoped listings become directory trees, small
//! writes go straight to the store, and streamed writes of known size are
//! chunked through the B2 large-file session protocol (start, per-part
//! targets, SHA-1-tagged parts, ordered finalize).
//!
//! # Architecture
//!
//! ```text
//! ObjectStorageAdapter (facade verbs)
//!        |
//!        v
//!   B2Filesystem (prefixing, listings, metadata)
//!        |                  |
//!        v                  v
//! LargeFileUploader   single-shot calls
//!        |                  |
//!        +---------+--------+
//!                  v
//!        B2Client trait (HTTP or in-memory)
//! ```

pub mod adapter;
pub mod client;
pub mod config;
pub mod error;
pub mod listing;
pub mod memory;
pub mod path;
pub mod record;
pub mod upload;
pub mod utils;

pub use adapter::{B2Filesystem, ObjectStorageAdapter, WriteOptions};
pub use client::{B2Client, ByteStream};
pub use config::B2Config;
pub use error::{BlazeFsError, BlazeFsResult};
pub use record::{ObjectRecord, RecordKind};
pub use upload::LargeFileUploader;
