//! Types for the address registry

use serde::{Deserialize, Serialize};

/// A record as stored by the registry.
///
/// The address is kept as a plain string since the registry does not enforce
/// canonical casing; comparisons go through `Address::matches`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistryEntry {
    /// The stored address, in whatever casing it was written with.
    pub address: String,
}

/// Body of a create request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateEntry<'a> {
    pub address: &'a str,
}

/// Result of reconciling one address against the registry.
///
/// Not persisted; the caller consumes it once to decide what feedback to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The address was absent and a record was created.
    Inserted,
    /// The address was already present; the registry was not touched.
    AlreadyExists,
    /// Listing or creating failed.
    TransientFailure(String),
}

impl SyncOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, SyncOutcome::AlreadyExists)
    }
}

/// Error types for registry operations
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Registry responded with status {0}")]
    StatusError(u16),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Registry unavailable: {0}")]
    Unavailable(String),
}
