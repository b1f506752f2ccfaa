//! Small shared helpers: hashing, arithmetic, clocks, and the identifier
//! generators used by the in-memory store.

use base64::Engine;
use chrono::Utc;
use rand::RngExt;
use sha1::{Digest, Sha1};

/// Hex-encoded SHA-1 of a byte slice.
///
/// # Examples
///
/// ```
/// use blazefs_core::utils::sha1_hex;
///
/// assert_eq!(
///     sha1_hex(b"hello"),
///     "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
/// );
/// ```
#[must_use]
pub fn sha1_hex(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}

/// Ceiling division for part counting.
///
/// # Examples
///
/// ```
/// use blazefs_core::utils::ceil_div;
///
/// assert_eq!(ceil_div(12_000_000, 10_000_000), 2);
/// assert_eq!(ceil_div(10_000_000, 10_000_000), 1);
/// ```
#[must_use]
pub fn ceil_div(numerator: u64, denominator: u64) -> u64 {
    numerator.div_ceil(denominator)
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn timestamp_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate an opaque file-version id (the in-memory store's analogue of
/// the service's `4_z..._f..._d..._t...` handles).
#[must_use]
pub fn generate_file_id() -> String {
    let mut rng = rand::rng();
    let mut buf = [0u8; 24];
    rng.fill(&mut buf);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

/// Generate a short-lived upload authorization token.
#[must_use]
pub fn generate_upload_token() -> String {
    let mut rng = rand::rng();
    let mut buf = [0u8; 32];
    rng.fill(&mut buf);
    hex::encode(buf)
}
