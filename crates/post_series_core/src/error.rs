//! Caller-facing failure taxonomy.
//!
//! Every core error maps onto one [`ErrorKind`] so request adapters can render
//! a structured message instead of a fault.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Coarse failure category surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing or malformed identifiers, empty required strings.
    InvalidArgument,
    /// Series or item does not exist.
    NotFound,
    /// Missing capability or missing/invalid anti-forgery token.
    PermissionDenied,
    /// The backing store failed.
    StorageFailure,
}

impl ErrorKind {
    /// Stable wire code.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidArgument => "invalid_argument",
            Self::NotFound => "not_found",
            Self::PermissionDenied => "permission_denied",
            Self::StorageFailure => "storage_failure",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
