//! Tracking session and integration point for all components.
//!
//! This module defines the `TrackerSession`, which owns the address set and wires
//! together validation, registry reconciliation, balance fetching and transient
//! notices. Both entry surfaces (wallet connect and manual entry) funnel through
//! the same `track` path.
//!
//! The session is the single writer of the `AddressSet`. Balance fetches run as
//! independent Tokio tasks and report back over a channel; their results are
//! applied by `next_update`/`settle`, where stale results (for removed or
//! re-fetched addresses) are dropped.

use backoff::ExponentialBackoff;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::address_set::AddressSet;
use super::events::{DuplicateSource, EventDispatcher, SessionEvent, SessionEventHandler};
use super::notices::{DEFAULT_NOTICE_TTL, Notices};
use super::types::{AccountRecord, AddOutcome, FetchTicket, TrackOutcome, TrackerError};
use crate::address::Address;
use crate::capability::{AuthCapability, WalletCapability};
use crate::chain::{Balance, BalanceFetcher, FetchError};
use crate::presenter::{self, ViewState};
use crate::registry::{RegistrySyncer, SyncOutcome};

/// Caller-side retry policy for balance fetches.
///
/// Only `NetworkError`s are retried, with exponential backoff, at most
/// `max_retries` times after the first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
	pub max_retries: u32,
	pub initial_interval: Duration,
	pub max_interval: Duration,
}

impl Default for RetryPolicy {
	fn default() -> Self {
		Self {
			max_retries: 2,
			initial_interval: Duration::from_millis(500),
			max_interval: Duration::from_secs(5),
		}
	}
}

impl RetryPolicy {
	pub fn none() -> Self {
		Self {
			max_retries: 0,
			..Self::default()
		}
	}

	fn backoff(&self) -> ExponentialBackoff {
		ExponentialBackoff {
			initial_interval: self.initial_interval,
			current_interval: self.initial_interval,
			max_interval: self.max_interval,
			max_elapsed_time: None,
			..ExponentialBackoff::default()
		}
	}
}

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
	pub retry: RetryPolicy,
	pub notice_ttl: Duration,
}

impl Default for SessionConfig {
	fn default() -> Self {
		Self {
			retry: RetryPolicy::default(),
			notice_ttl: DEFAULT_NOTICE_TTL,
		}
	}
}

type FetchReport = (FetchTicket, Result<Balance, FetchError>);

pub struct TrackerSession {
	set: AddressSet,
	fetcher: BalanceFetcher,
	syncer: Arc<RegistrySyncer>,
	notices: Notices,
	dispatcher: EventDispatcher,
	retry: RetryPolicy,

	token: Option<String>,
	connected: bool,

	reports_tx: mpsc::UnboundedSender<FetchReport>,
	reports_rx: mpsc::UnboundedReceiver<FetchReport>,
	in_flight: usize,
}

impl TrackerSession {
	pub fn new(fetcher: BalanceFetcher, syncer: Arc<RegistrySyncer>, config: SessionConfig) -> Self {
		let (reports_tx, reports_rx) = mpsc::unbounded_channel();
		Self {
			set: AddressSet::new(),
			fetcher,
			syncer,
			notices: Notices::new(config.notice_ttl),
			dispatcher: EventDispatcher::new(),
			retry: config.retry,
			token: None,
			connected: false,
			reports_tx,
			reports_rx,
			in_flight: 0,
		}
	}

	pub fn register_handler(&mut self, handler: Box<dyn SessionEventHandler>) {
		self.dispatcher.register_handler(handler);
	}

	/// Obtain a session token. Required before a wallet can be connected.
	pub async fn login(&mut self, auth: &dyn AuthCapability) -> Result<(), TrackerError> {
		match auth.session_token().await {
			Ok(token) => {
				info!("Authenticated session");
				self.token = Some(token);
				self.notices.clear_error();
				Ok(())
			}
			Err(e) => {
				warn!("Authentication unavailable: {}", e);
				self.notices.set_error(e.to_string());
				Err(e.into())
			}
		}
	}

	pub fn token(&self) -> Option<&str> {
		self.token.as_deref()
	}

	pub fn is_connected(&self) -> bool {
		self.connected
	}

	/// Connect a wallet and track every account it exposes.
	///
	/// Per-address failures are returned alongside successes and never abort the
	/// batch; only a missing login or wallet fails the call as a whole.
	pub async fn connect_wallet(
		&mut self,
		wallet: &dyn WalletCapability,
	) -> Result<Vec<Result<TrackOutcome, TrackerError>>, TrackerError> {
		if self.token.is_none() {
			let err = TrackerError::CapabilityUnavailable("login required".to_string());
			self.notices.set_error(err.to_string());
			return Err(err);
		}

		let accounts = wallet.request_accounts().await.map_err(|e| {
			warn!("Failed to connect wallet: {}", e);
			self.notices.set_error(e.to_string());
			TrackerError::from(e)
		})?;

		info!("Wallet connected with {} accounts", accounts.len());
		self.connected = true;

		let mut outcomes = Vec::with_capacity(accounts.len());
		for raw in accounts {
			outcomes.push(self.track(&raw).await);
		}
		Ok(outcomes)
	}

	/// Manual entry surface.
	pub async fn add_manual(&mut self, raw: &str) -> Result<TrackOutcome, TrackerError> {
		self.track(raw).await
	}

	/// Validate, deduplicate, reconcile with the registry, insert and start a
	/// balance fetch.
	pub async fn track(&mut self, raw: &str) -> Result<TrackOutcome, TrackerError> {
		let address = Address::validate(raw).map_err(|e| {
			debug!("Rejected address {:?}: {}", raw, e);
			self.notices.set_error(format!("Invalid address: {}", e));
			TrackerError::from(e)
		})?;

		if self.set.contains(&address) {
			self.flag_duplicate(&address, DuplicateSource::Local).await;
			return Err(TrackerError::DuplicateAddress(address));
		}

		let registry = self.syncer.reconcile(&address).await;
		match &registry {
			SyncOutcome::AlreadyExists => {
				self.flag_duplicate(&address, DuplicateSource::Registry)
					.await
			}
			SyncOutcome::TransientFailure(reason) => {
				self.dispatcher
					.dispatch(SessionEvent::RegistrySyncFailed {
						address: address.clone(),
						reason: reason.clone(),
					})
					.await
			}
			SyncOutcome::Inserted => {}
		}

		if self.set.add_address(address.clone()) == AddOutcome::Added {
			if let Some(ticket) = self.set.ticket(&address) {
				self.spawn_fetch(ticket);
			}
		}
		self.notices.clear_error();

		self.dispatcher
			.dispatch(SessionEvent::AddressTracked {
				address: address.clone(),
				registry: registry.clone(),
			})
			.await;

		Ok(TrackOutcome { address, registry })
	}

	async fn flag_duplicate(&mut self, address: &Address, source: DuplicateSource) {
		self.notices.raise_duplicate();
		self.dispatcher
			.dispatch(SessionEvent::DuplicateDetected {
				address: address.clone(),
				source,
			})
			.await;
	}

	/// Stop tracking `address`. Its in-flight fetch, if any, will be ignored.
	pub async fn remove(&mut self, address: &Address) -> bool {
		if !self.set.remove_address(address) {
			return false;
		}
		self.dispatcher
			.dispatch(SessionEvent::AddressRemoved {
				address: address.clone(),
			})
			.await;
		true
	}

	/// Re-fetch one address, resetting it to Loading.
	pub fn refresh(&mut self, address: &Address) -> bool {
		match self.set.mark_loading(address) {
			Some(ticket) => {
				self.spawn_fetch(ticket);
				true
			}
			None => false,
		}
	}

	pub fn refresh_all(&mut self) {
		for address in self.set.addresses() {
			self.refresh(&address);
		}
	}

	/// Drop all tracked state and release the wallet.
	pub async fn disconnect(&mut self, wallet: &dyn WalletCapability) {
		if let Err(e) = wallet.release().await {
			warn!("Failed to release wallet permissions: {}", e);
		}
		self.set.clear();
		self.notices.clear();
		self.connected = false;
		self.dispatcher.dispatch(SessionEvent::Disconnected).await;
	}

	fn spawn_fetch(&mut self, ticket: FetchTicket) {
		let fetcher = self.fetcher.clone();
		let retry = self.retry.clone();
		let reports_tx = self.reports_tx.clone();
		self.in_flight += 1;

		tokio::spawn(async move {
			let result = fetch_with_retry(&fetcher, &ticket.address, &retry).await;
			// receiver lives as long as the session
			let _ = reports_tx.send((ticket, result));
		});
	}

	/// Number of fetches whose results have not been collected yet.
	pub fn pending_fetches(&self) -> usize {
		self.in_flight
	}

	/// Wait for the next fetch to settle and apply it.
	///
	/// Returns the address the result belonged to, or `None` when nothing is in
	/// flight.
	pub async fn next_update(&mut self) -> Option<Address> {
		if self.in_flight == 0 {
			return None;
		}
		let (ticket, result) = self.reports_rx.recv().await?;
		self.in_flight -= 1;

		if self.set.apply(&ticket, result.clone()) {
			self.dispatcher
				.dispatch(SessionEvent::BalanceUpdated {
					address: ticket.address.clone(),
					result,
				})
				.await;
		}
		Some(ticket.address)
	}

	/// Apply results until no fetch is in flight.
	pub async fn settle(&mut self) {
		while self.next_update().await.is_some() {}
	}

	/// Mark `address` as copied and return the string to put on the clipboard.
	pub fn copy_address(&mut self, address: &Address) -> Option<String> {
		let record = self.set.get(address)?;
		let text = record.address.to_string();
		self.notices.mark_copied(record.address.clone());
		Some(text)
	}

	pub fn view(&self, state: &ViewState) -> Vec<&AccountRecord> {
		presenter::view(self.set.snapshot(), state)
	}

	pub fn snapshot(&self) -> &[AccountRecord] {
		self.set.snapshot()
	}

	pub fn get(&self, address: &Address) -> Option<&AccountRecord> {
		self.set.get(address)
	}

	pub fn notices(&self) -> &Notices {
		&self.notices
	}
}

async fn fetch_with_retry(
	fetcher: &BalanceFetcher,
	address: &Address,
	retry: &RetryPolicy,
) -> Result<Balance, FetchError> {
	let mut attempt = 0u32;
	backoff::future::retry(retry.backoff(), || {
		attempt += 1;
		let attempt = attempt;
		async move {
			match fetcher.fetch(address).await {
				Ok(balance) => Ok(balance),
				Err(e) if e.is_retryable() && attempt <= retry.max_retries => {
					debug!("Balance fetch for {} failed (attempt {}): {}", address, attempt, e);
					Err(backoff::Error::transient(e))
				}
				Err(e) => {
					warn!("Balance fetch for {} failed: {}", address, e);
					Err(backoff::Error::permanent(e))
				}
			}
		}
	})
	.await
}
