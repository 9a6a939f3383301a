//! The authoritative set of tracked addresses.

use tracing::debug;

use super::types::{AccountRecord, AccountStatus, AddOutcome, FetchTicket};
use crate::address::Address;
use crate::chain::{Balance, FetchError};

/// Insertion-ordered collection of account records, unique by address.
///
/// Membership changes only through `add_address`, `remove_address` and `clear`;
/// nothing is evicted implicitly.
#[derive(Debug, Default)]
pub struct AddressSet {
	records: Vec<AccountRecord>,
	next_epoch: u64,
}

impl AddressSet {
	pub fn new() -> Self {
		Self::default()
	}

	fn position(&self, address: &Address) -> Option<usize> {
		self.records.iter().position(|r| &r.address == address)
	}

	fn bump_epoch(&mut self) -> u64 {
		self.next_epoch += 1;
		self.next_epoch
	}

	/// Insert `address` in Loading state unless it is already present.
	pub fn add_address(&mut self, address: Address) -> AddOutcome {
		if self.contains(&address) {
			debug!("Address {} already in set", address);
			return AddOutcome::AlreadyPresent;
		}
		let epoch = self.bump_epoch();
		self.records.push(AccountRecord::loading(address, epoch));
		AddOutcome::Added
	}

	/// Delete the record for `address`. Returns whether anything was removed.
	pub fn remove_address(&mut self, address: &Address) -> bool {
		match self.position(address) {
			Some(index) => {
				self.records.remove(index);
				true
			}
			None => false,
		}
	}

	/// Apply a fetch result. No-op when `address` is no longer tracked.
	pub fn update_balance(&mut self, address: &Address, result: Result<Balance, FetchError>) {
		let Some(index) = self.position(address) else {
			debug!("Dropping balance result for untracked address {}", address);
			return;
		};
		let record = &mut self.records[index];
		match result {
			Ok(balance) => {
				record.balance = Some(balance);
				record.status = AccountStatus::Ready;
				record.last_error = None;
			}
			Err(error) => {
				record.balance = None;
				record.status = AccountStatus::Error;
				record.last_error = Some(error);
			}
		}
	}

	/// Ticket for the fetch the record for `address` is currently waiting on.
	pub fn ticket(&self, address: &Address) -> Option<FetchTicket> {
		self.get(address).map(|record| FetchTicket {
			address: record.address.clone(),
			epoch: record.epoch,
		})
	}

	/// Put an existing record back into Loading and hand out a fresh ticket.
	/// Any ticket issued earlier for this address becomes stale.
	pub fn mark_loading(&mut self, address: &Address) -> Option<FetchTicket> {
		let index = self.position(address)?;
		let epoch = self.bump_epoch();
		let record = &mut self.records[index];
		record.status = AccountStatus::Loading;
		record.last_error = None;
		record.epoch = epoch;
		Some(FetchTicket {
			address: record.address.clone(),
			epoch,
		})
	}

	/// Apply a fetch result only if `ticket` is still current.
	pub fn apply(&mut self, ticket: &FetchTicket, result: Result<Balance, FetchError>) -> bool {
		let current = self
			.get(&ticket.address)
			.is_some_and(|record| record.epoch == ticket.epoch);
		if !current {
			debug!("Ignoring stale balance result for {}", ticket.address);
			return false;
		}
		self.update_balance(&ticket.address, result);
		true
	}

	pub fn get(&self, address: &Address) -> Option<&AccountRecord> {
		self.records.iter().find(|r| &r.address == address)
	}

	pub fn contains(&self, address: &Address) -> bool {
		self.position(address).is_some()
	}

	/// Records in insertion order.
	pub fn snapshot(&self) -> &[AccountRecord] {
		&self.records
	}

	pub fn addresses(&self) -> Vec<Address> {
		self.records.iter().map(|r| r.address.clone()).collect()
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn clear(&mut self) {
		self.records.clear();
	}
}
