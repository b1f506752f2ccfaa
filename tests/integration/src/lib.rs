//! Integration tests for the BlazeFS adapter against a live B2 bucket.
//!
//! These tests talk to the real service and need an application key with
//! read/write access to a scratch bucket. They are marked `#[ignore]` so
//! they don't run during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! B2_KEY_ID=... B2_APPLICATION_KEY=... B2_BUCKET=blazefs-scratch \
//!     cargo test -p blazefs-integration -- --ignored
//! ```

use std::sync::{Arc, Once};

use rand::RngExt;

use blazefs_core::{B2Config, B2Filesystem};
use blazefs_http::B2HttpClient;

static INIT: Once = Once::new();

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Build a filesystem over the bucket named in the environment. When no
/// `B2_PREFIX` is set, everything is scoped under `blazefs-it/` so the
/// tests never touch real data in the bucket.
#[must_use]
pub fn filesystem() -> B2Filesystem {
    init_tracing();

    let mut config = B2Config::from_env();
    if config.path_prefix.is_empty() {
        config.path_prefix = "blazefs-it".to_owned();
    }
    let client = Arc::new(B2HttpClient::new(config.clone()));
    B2Filesystem::new(client, config)
}

/// Generate a unique per-test directory name, so concurrent runs cannot
/// collide and leftovers are easy to spot.
#[must_use]
pub fn test_key(prefix: &str) -> String {
    let mut rng = rand::rng();
    let mut buf = [0u8; 4];
    rng.fill(&mut buf);
    format!("{prefix}-{}", hex::encode(buf))
}

mod test_chunked;
mod test_directory;
mod test_roundtrip;
