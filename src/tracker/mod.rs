//! Address tracking module
//!
//! This module holds the core state of the application: the deduplicated set of
//! tracked addresses with their balances, and the session that keeps it in sync
//! with the registry and the chain.
//!
//! - `address_set`: the authoritative, insertion-ordered set of account records.
//! - `session`: the single writer of the set; funnels wallet and manual entries
//!   through validation, registry reconciliation and balance fetching.
//! - `events`: event types and handlers for observing session changes.
//! - `notices`: self-expiring UI flags (duplicate banner, copied marker).

pub mod address_set;
pub mod events;
pub mod notices;
pub mod session;
pub mod types;

pub use address_set::AddressSet;
pub use events::{EventDispatcher, LoggingHandler, SessionEvent, SessionEventHandler};
pub use notices::Notices;
pub use session::{RetryPolicy, SessionConfig, TrackerSession};
pub use types::*;
