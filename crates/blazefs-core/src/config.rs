//! Adapter configuration.
//!
//! Provides [`B2Config`] for wiring the facade and the HTTP transport.
//! Values are loaded from environment variables via [`B2Config::from_env`],
//! matching the `B2_*` naming the service's own tooling uses.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Backblaze B2 adapter configuration.
///
/// Credentials default to empty strings so local tests against the
/// in-memory store need no environment at all; the HTTP transport rejects
/// empty credentials at authorization time.
///
/// # Examples
///
/// ```
/// use blazefs_core::config::B2Config;
///
/// let config = B2Config::default();
/// assert_eq!(config.api_url, "https://api.backblazeb2.com");
/// assert_eq!(config.path_prefix, "");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct B2Config {
    /// Application key id used for `b2_authorize_account`.
    #[builder(default = String::new())]
    pub key_id: String,

    /// Application key secret paired with `key_id`.
    #[builder(default = String::new())]
    pub application_key: String,

    /// Human bucket name; resolved to a bucket id on first use.
    #[builder(default = String::new())]
    pub bucket_name: String,

    /// Base path prepended to every caller path (e.g. `"user42/"`).
    #[builder(default = String::new())]
    pub path_prefix: String,

    /// Authorization endpoint; override to point at a test double.
    #[builder(default = String::from("https://api.backblazeb2.com"))]
    pub api_url: String,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for B2Config {
    fn default() -> Self {
        Self {
            key_id: String::new(),
            application_key: String::new(),
            bucket_name: String::new(),
            path_prefix: String::new(),
            api_url: String::from("https://api.backblazeb2.com"),
            log_level: String::from("info"),
        }
    }
}

impl B2Config {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `B2_KEY_ID` | *(empty)* |
    /// | `B2_APPLICATION_KEY` | *(empty)* |
    /// | `B2_BUCKET` | *(empty)* |
    /// | `B2_PREFIX` | *(empty)* |
    /// | `B2_API_URL` | `https://api.backblazeb2.com` |
    /// | `LOG_LEVEL` | `info` |
    ///
    /// # Examples
    ///
    /// ```
    /// use blazefs_core::config::B2Config;
    ///
    /// let config = B2Config::from_env();
    /// assert!(!config.api_url.is_empty());
    /// ```
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("B2_KEY_ID") {
            config.key_id = v;
        }
        if let Ok(v) = std::env::var("B2_APPLICATION_KEY") {
            config.application_key = v;
        }
        if let Ok(v) = std::env::var("B2_BUCKET") {
            config.bucket_name = v;
        }
        if let Ok(v) = std::env::var("B2_PREFIX") {
            config.path_prefix = v;
        }
        if let Ok(v) = std::env::var("B2_API_URL") {
            config.api_url = v;
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }
}
