//! HTTPS transport for the Backblaze B2 native API.
//!
//! This crate implements the [`blazefs_core::B2Client`] contract against the
//! real B2 v2 endpoints. It authorizes lazily on first use, keeps the returned
//! API and download base URLs for the lifetime of the client, and maps B2 error
//! documents onto [`blazefs_core::BlazeFsError`] variants.
//!
//! # Usage
//!
//! ```rust,no_run
//! use blazefs_core::{B2Config, B2Filesystem, ObjectStorageAdapter};
//! use blazefs_http::B2HttpClient;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), blazefs_core::BlazeFsError> {
//! let config = B2Config::from_env();
//! let client = Arc::new(B2HttpClient::new(config.clone()));
//! let fs = B2Filesystem::new(client, config);
//! let names = fs.list("reports", false).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;

pub use client::B2HttpClient;
