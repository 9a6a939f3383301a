//! Remote address registry integration
//!
//! This module provides the HTTP client for the external address registry and the
//! `RegistrySyncer` that keeps each tracked address present there exactly once.
//! The registry is a plain list/create service keyed by address; it offers no
//! per-address existence query and no server-side uniqueness guarantee.

/// HTTP client for the registry list/create endpoints
mod client;
/// Check-then-insert reconciliation, serialized per address
mod syncer;
/// Type definitions for registry records and errors
mod types;

pub use client::RegistryClient;
pub use syncer::{AddressRegistry, RegistrySyncer};
pub use types::*;
