//! Wire types for the Backblaze B2 native API (`b2api/v2`).
//!
//! Every type here is a direct serde mapping of a JSON document exchanged
//! with the B2 service. No I/O, no policy: transports serialize these,
//! higher layers interpret them.

pub mod bucket;
pub mod error;
pub mod file;
pub mod list;
pub mod upload;

pub use bucket::{Bucket, ListBucketsRequest, ListBucketsResponse};
pub use error::ErrorResponse;
pub use file::{
    AUTO_CONTENT_TYPE, FileAction, FileRecord, HIDE_MARKER_CONTENT_TYPE, LAST_MODIFIED_INFO_KEY,
};
pub use list::{ListFileVersionsRequest, ListFileVersionsResponse};
pub use upload::{
    CopyFileRequest, DeleteFileVersionRequest, FinishLargeFileRequest, GetUploadPartUrlRequest,
    GetUploadUrlRequest, PartRecord, StartLargeFileRequest, UploadPartUrl, UploadUrl,
};
