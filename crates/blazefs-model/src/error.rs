//! The error document every failed B2 call answers with.

use serde::{Deserialize, Serialize};

/// JSON body of a non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status the service chose.
    pub status: u16,
    /// Stable machine-readable code (`not_found`, `bad_request`,
    /// `unauthorized`, ...).
    pub code: String,
    /// Human-readable explanation.
    pub message: String,
}
