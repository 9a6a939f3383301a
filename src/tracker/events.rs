//! Event system for the tracking session.
//!
//! The session emits a `SessionEvent` whenever tracked state changes in a way the
//! outside world may care about: an address was tracked or removed, a duplicate
//! was detected, a balance arrived, the registry could not be reached. Handlers
//! registered on the `EventDispatcher` receive every event; this is the seam a
//! presentation layer hooks into.

use tracing::{info, warn};

use crate::address::Address;
use crate::chain::{Balance, DISPLAY_PLACES, FetchError};
use crate::registry::SyncOutcome;

/// Where a duplicate was detected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateSource {
    /// The address is already in the local set
    Local,
    /// The registry already holds the address
    Registry,
}

/// Events emitted by the tracking session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// An address entered the set
    AddressTracked {
        address: Address,
        registry: SyncOutcome,
    },
    /// An address was rejected or flagged as a duplicate
    DuplicateDetected {
        address: Address,
        source: DuplicateSource,
    },
    /// The registry could not be reconciled; the address is still tracked
    RegistrySyncFailed { address: Address, reason: String },
    /// A balance fetch settled for a still-tracked address
    BalanceUpdated {
        address: Address,
        result: Result<Balance, FetchError>,
    },
    /// An address left the set
    AddressRemoved { address: Address },
    /// The wallet was disconnected and all state cleared
    Disconnected,
}

/// Trait for handling session events.
#[async_trait::async_trait]
pub trait SessionEventHandler: Send + Sync {
    /// Handle a session event.
    async fn handle(&mut self, event: &SessionEvent) -> Result<(), String>;

    /// Get the name of this handler for logging and diagnostics.
    fn name(&self) -> &'static str;
}

/// Event dispatcher that manages multiple event handlers.
///
/// Handlers are called in registration order. A failing handler is logged and
/// does not prevent the others from seeing the event.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Box<dyn SessionEventHandler>>,
}

impl EventDispatcher {
    /// Create a new, empty event dispatcher.
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register a new event handler.
    pub fn register_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
        self.handlers.push(handler);
    }

    /// Dispatch an event to all registered handlers.
    pub async fn dispatch(&mut self, event: SessionEvent) {
        for handler in &mut self.handlers {
            if let Err(e) = handler.handle(&event).await {
                tracing::error!("Handler {} failed to process event: {}", handler.name(), e);
            }
        }
    }
}

/// Writes every event to the log.
pub struct LoggingHandler;

#[async_trait::async_trait]
impl SessionEventHandler for LoggingHandler {
    async fn handle(&mut self, event: &SessionEvent) -> Result<(), String> {
        match event {
            SessionEvent::AddressTracked { address, registry } => {
                info!("Tracking {} (registry: {:?})", address, registry)
            }
            SessionEvent::DuplicateDetected { address, source } => {
                warn!("Duplicate address {} ({:?})", address, source)
            }
            SessionEvent::RegistrySyncFailed { address, reason } => {
                warn!("Registry sync failed for {}: {}", address, reason)
            }
            SessionEvent::BalanceUpdated {
                address,
                result: Ok(balance),
            } => info!("Balance of {}: {}", address, balance.display(DISPLAY_PLACES)),
            SessionEvent::BalanceUpdated {
                address,
                result: Err(e),
            } => warn!("Balance of {} unavailable: {}", address, e),
            SessionEvent::AddressRemoved { address } => info!("Stopped tracking {}", address),
            SessionEvent::Disconnected => info!("Wallet disconnected, session cleared"),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "logging"
    }
}
