//! Transient feedback flags for the session.
//!
//! The duplicate banner and the "copied" marker disappear on their own after a
//! fixed interval. Expiry is evaluated lazily against `tokio::time::Instant`, so
//! nothing needs to run in the background to clear them.

use tokio::time::{Duration, Instant};

use crate::address::Address;

/// Default lifetime of a transient notice.
pub const DEFAULT_NOTICE_TTL: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Notices {
    ttl: Duration,
    duplicate_until: Option<Instant>,
    copied: Option<(Address, Instant)>,
    error: Option<String>,
}

impl Default for Notices {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_TTL)
    }
}

impl Notices {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            duplicate_until: None,
            copied: None,
            error: None,
        }
    }

    /// Show the duplicate banner, restarting its timer if already shown.
    pub fn raise_duplicate(&mut self) {
        self.duplicate_until = Some(Instant::now() + self.ttl);
    }

    pub fn duplicate_visible(&self) -> bool {
        self.duplicate_until
            .is_some_and(|until| Instant::now() < until)
    }

    pub fn mark_copied(&mut self, address: Address) {
        self.copied = Some((address, Instant::now() + self.ttl));
    }

    /// Address currently flagged as copied, if the flag has not expired.
    pub fn copied(&self) -> Option<&Address> {
        self.copied
            .as_ref()
            .filter(|(_, until)| Instant::now() < *until)
            .map(|(address, _)| address)
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Last error message; stays until cleared by a successful operation.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn clear(&mut self) {
        self.duplicate_until = None;
        self.copied = None;
        self.error = None;
    }
}
