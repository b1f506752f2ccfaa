//! Adapter error types.
//!
//! Defines [`BlazeFsError`], the one error enum every operation in this
//! workspace returns. Lookup-style facade operations translate
//! [`BlazeFsError::NotFound`] into `false`/`None` results; everything else
//! propagates as a hard failure.
//!
//! # Usage
//!
//! ```
//! use blazefs_core::error::BlazeFsError;
//!
//! let err = BlazeFsError::NotFound {
//!     key: "user42/missing.bin".to_owned(),
//! };
//! assert!(err.is_not_found());
//! ```

/// Error type for every adapter, orchestrator, and transport operation.
#[derive(Debug, thiserror::Error)]
pub enum BlazeFsError {
    // -----------------------------------------------------------------------
    // Lookup errors
    // -----------------------------------------------------------------------
    /// No object version exists for the key.
    #[error("no such object: {key}")]
    NotFound {
        /// The key that was searched for.
        key: String,
    },

    // -----------------------------------------------------------------------
    // Streamed-write errors
    // -----------------------------------------------------------------------
    /// The source stream's total length is missing or zero, so no upload
    /// plan can be made.
    #[error("cannot determine the size of the source for {key}")]
    SizeUnknown {
        /// Destination key of the rejected write.
        key: String,
    },

    /// The store rejected a part or the finalize hash list.
    #[error("part hash rejected for {key} (part {part_number}): {message}")]
    HashMismatch {
        /// Destination key or session id of the failed upload.
        key: String,
        /// Part the store complained about; 0 when the finalize list as a
        /// whole was rejected.
        part_number: u32,
        /// The store's explanation.
        message: String,
    },

    /// A precondition does not hold: declared and observed source lengths
    /// disagree, the plan exceeds the part-number cap, or a directory
    /// operation targets an empty prefix.
    #[error("invalid state: {message}")]
    InvalidState {
        /// What was violated.
        message: String,
    },

    /// Cooperative cancellation stopped the upload loop. The open session
    /// is left for the store to expire.
    #[error("upload cancelled: {key}")]
    Cancelled {
        /// Destination key of the abandoned upload.
        key: String,
    },

    // -----------------------------------------------------------------------
    // Remote errors
    // -----------------------------------------------------------------------
    /// The store answered with an error document.
    #[error("api error {status} {code}: {message}")]
    Api {
        /// HTTP status of the response.
        status: u16,
        /// Machine-readable code from the error document.
        code: String,
        /// Human-readable message from the error document.
        message: String,
    },

    /// The call never produced a usable response: connect, TLS, timeout,
    /// or body-decoding failure.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the failure.
        message: String,
    },

    /// Anything unexpected from inside the adapter itself.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl BlazeFsError {
    /// Whether this error means "the object is absent" rather than "the
    /// operation failed". Lookup operations use this to answer `false`/`None`.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Short stable label for logging and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::SizeUnknown { .. } => "size_unknown",
            Self::HashMismatch { .. } => "hash_mismatch",
            Self::InvalidState { .. } => "invalid_state",
            Self::Cancelled { .. } => "cancelled",
            Self::Api { .. } => "api",
            Self::Transport { .. } => "transport",
            Self::Internal(_) => "internal",
        }
    }
}

/// Convenience result type for adapter operations.
pub type BlazeFsResult<T> = Result<T, BlazeFsError>;
