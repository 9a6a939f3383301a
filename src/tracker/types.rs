use crate::address::{Address, AddressError};
use crate::capability::CapabilityError;
use crate::chain::{Balance, FetchError};
use crate::registry::{RegistryError, SyncOutcome};

/// Fetch state of a tracked account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
	Loading,
	Ready,
	Error,
}

/// A tracked address together with its last known balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
	pub address: Address,
	pub balance: Option<Balance>,
	pub status: AccountStatus,
	/// Reason of the last failed fetch, cleared on success.
	pub last_error: Option<FetchError>,
	/// Identifies the fetch whose result this record is waiting for.
	pub(crate) epoch: u64,
}

impl AccountRecord {
	pub(crate) fn loading(address: Address, epoch: u64) -> Self {
		Self {
			address,
			balance: None,
			status: AccountStatus::Loading,
			last_error: None,
			epoch,
		}
	}

	/// Balance used for ordering: only a settled balance counts, everything
	/// else ranks as zero at the precision of the last known balance.
	pub fn sort_balance(&self) -> Balance {
		match (self.status, self.balance) {
			(AccountStatus::Ready, Some(balance)) => balance,
			_ => Balance::zero(self.balance.map_or(0, |b| b.decimals)),
		}
	}
}

/// Result of inserting into an `AddressSet`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
	Added,
	AlreadyPresent,
}

/// Handle for one in-flight balance fetch.
///
/// A result is only applied if the record still exists and still waits on the
/// same epoch, so removing (or re-adding) an address invalidates older fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
	pub address: Address,
	pub(crate) epoch: u64,
}

/// What happened when an address was tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackOutcome {
	pub address: Address,
	pub registry: SyncOutcome,
}

/// Errors surfaced by the tracking session.
///
/// None of these are fatal; each is converted into session state at the
/// boundary of the operation that produced it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
	#[error("Invalid address: {0}")]
	InvalidAddress(#[from] AddressError),

	#[error("Address {0} is already tracked")]
	DuplicateAddress(Address),

	#[error("Network error: {0}")]
	NetworkError(String),

	#[error("Capability unavailable: {0}")]
	CapabilityUnavailable(String),
}

impl From<FetchError> for TrackerError {
	fn from(e: FetchError) -> Self {
		TrackerError::NetworkError(e.to_string())
	}
}

impl From<RegistryError> for TrackerError {
	fn from(e: RegistryError) -> Self {
		TrackerError::NetworkError(e.to_string())
	}
}

impl From<CapabilityError> for TrackerError {
	fn from(e: CapabilityError) -> Self {
		TrackerError::CapabilityUnavailable(e.to_string())
	}
}
