//! Path normalization and prefix handling.
//!
//! Every caller-supplied path is normalized (leading `/` and `\` stripped)
//! and qualified with the configured base prefix before it reaches the
//! store; every store key is stripped of exactly that prefix on the way
//! back. Store keys never begin with a slash.

/// Strip leading `/` and `\` from a caller path.
///
/// # Examples
///
/// ```
/// use blazefs_core::path::normalize;
///
/// assert_eq!(normalize("/videos/clip.mp4"), "videos/clip.mp4");
/// assert_eq!(normalize("\\\\windows\\style"), "windows\\style");
/// assert_eq!(normalize("already/clean"), "already/clean");
/// ```
#[must_use]
pub fn normalize(path: &str) -> &str {
    path.trim_start_matches(['/', '\\'])
}

/// Applies and strips the configured base prefix.
///
/// The prefix is canonicalized at construction: surrounding slashes are
/// trimmed and a single trailing `/` is kept, so `"user42"`, `"user42/"`,
/// and `"/user42/"` behave identically. Stripping removes exactly the
/// canonical prefix, never one character less.
///
/// # Examples
///
/// ```
/// use blazefs_core::path::PathPrefixer;
///
/// let prefixer = PathPrefixer::new("user42");
/// let key = prefixer.apply("/videos/clip.mp4");
/// assert_eq!(key, "user42/videos/clip.mp4");
/// assert_eq!(prefixer.strip(&key), "videos/clip.mp4");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathPrefixer {
    prefix: String,
}

impl PathPrefixer {
    /// Create a prefixer from a configured base path. Empty input means no
    /// prefixing at all.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        let trimmed = prefix.trim_matches(['/', '\\']);
        let prefix = if trimmed.is_empty() {
            String::new()
        } else {
            format!("{trimmed}/")
        };
        Self { prefix }
    }

    /// The canonical prefix, ending in `/` unless empty.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Qualify a caller path into a store key.
    #[must_use]
    pub fn apply(&self, path: &str) -> String {
        format!("{}{}", self.prefix, normalize(path))
    }

    /// Remove the configured prefix from a store key, plus any leading
    /// slash left behind. Keys outside the prefix come back unchanged.
    #[must_use]
    pub fn strip(&self, key: &str) -> String {
        let rest = key.strip_prefix(&self.prefix).unwrap_or(key);
        rest.trim_start_matches('/').to_owned()
    }
}
