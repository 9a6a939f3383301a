use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::types::{RegistryEntry, RegistryError, SyncOutcome};
use crate::address::Address;

/// CRUD view of the remote registry
#[async_trait]
pub trait AddressRegistry: Send + Sync {
	/// List every stored record.
	async fn list(&self) -> Result<Vec<RegistryEntry>, RegistryError>;

	/// Create a record unconditionally.
	async fn create(&self, address: &Address) -> Result<(), RegistryError>;

	/// Atomic insert-if-absent, for backends that offer one.
	///
	/// Returns `Some(true)` if a record was created, `Some(false)` if one already
	/// existed, and `None` when the backend has no such primitive.
	async fn insert_if_absent(&self, _address: &Address) -> Result<Option<bool>, RegistryError> {
		Ok(None)
	}
}

/// Keeps addresses present in the registry exactly once.
///
/// Reconciliation of the same address is serialized through a keyed lock so the
/// list-then-create sequence cannot interleave with itself. Different addresses
/// proceed concurrently.
pub struct RegistrySyncer {
	registry: Arc<dyn AddressRegistry>,
	in_flight: Mutex<HashMap<Address, Arc<tokio::sync::Mutex<()>>>>,
}

impl RegistrySyncer {
	pub fn new(registry: Arc<dyn AddressRegistry>) -> Self {
		Self {
			registry,
			in_flight: Mutex::new(HashMap::new()),
		}
	}

	/// Ensure `address` is present in the registry.
	///
	/// Never fails: listing or creation errors come back as
	/// `SyncOutcome::TransientFailure`.
	pub async fn reconcile(&self, address: &Address) -> SyncOutcome {
		let slot = self.acquire_slot(address);
		let outcome = {
			let _guard = slot.lock().await;
			self.reconcile_locked(address).await
		};
		self.release_slot(address, slot);

		match &outcome {
			SyncOutcome::Inserted => info!("Address {} registered", address),
			SyncOutcome::AlreadyExists => info!("Address {} already in registry", address),
			SyncOutcome::TransientFailure(reason) => {
				warn!("Registry sync failed for {}: {}", address, reason)
			}
		}
		outcome
	}

	async fn reconcile_locked(&self, address: &Address) -> SyncOutcome {
		match self.registry.insert_if_absent(address).await {
			Ok(Some(true)) => return SyncOutcome::Inserted,
			Ok(Some(false)) => return SyncOutcome::AlreadyExists,
			Ok(None) => {}
			Err(e) => return SyncOutcome::TransientFailure(e.to_string()),
		}

		let entries = match self.registry.list().await {
			Ok(entries) => entries,
			Err(e) => return SyncOutcome::TransientFailure(e.to_string()),
		};

		if entries.iter().any(|entry| address.matches(&entry.address)) {
			return SyncOutcome::AlreadyExists;
		}

		debug!("Address {} not among {} registry entries", address, entries.len());
		match self.registry.create(address).await {
			Ok(()) => SyncOutcome::Inserted,
			Err(e) => SyncOutcome::TransientFailure(e.to_string()),
		}
	}

	fn acquire_slot(&self, address: &Address) -> Arc<tokio::sync::Mutex<()>> {
		let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
		in_flight.entry(address.clone()).or_default().clone()
	}

	fn release_slot(&self, address: &Address, slot: Arc<tokio::sync::Mutex<()>>) {
		let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());
		drop(slot);
		// only the map still holds it
		if in_flight
			.get(address)
			.is_some_and(|held| Arc::strong_count(held) == 1)
		{
			in_flight.remove(address);
		}
	}

	#[cfg(test)]
	fn slots_held(&self) -> usize {
		self.in_flight.lock().unwrap().len()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testing::{InMemoryRegistry, address};
	use std::time::Duration;

	#[tokio::test]
	async fn test_reconcile_twice_inserts_once() {
		let registry = Arc::new(InMemoryRegistry::new());
		let syncer = RegistrySyncer::new(registry.clone());
		let addr = address(1);

		assert_eq!(syncer.reconcile(&addr).await, SyncOutcome::Inserted);
		assert_eq!(syncer.reconcile(&addr).await, SyncOutcome::AlreadyExists);
		assert_eq!(registry.count_of(&addr), 1);
		assert_eq!(syncer.slots_held(), 0);
	}

	#[tokio::test]
	async fn test_existing_entry_matched_case_insensitively() {
		let registry = Arc::new(InMemoryRegistry::new());
		let addr = address(2);
		registry.seed(&addr.to_checksum().to_uppercase().replace("0X", "0x"));
		let syncer = RegistrySyncer::new(registry.clone());

		assert_eq!(syncer.reconcile(&addr).await, SyncOutcome::AlreadyExists);
		assert_eq!(registry.create_calls(), 0);
	}

	#[tokio::test]
	async fn test_concurrent_reconcile_of_same_address_is_serialized() {
		let registry = Arc::new(InMemoryRegistry::new().with_latency(Duration::from_millis(20)));
		let syncer = Arc::new(RegistrySyncer::new(registry.clone()));
		let addr = address(3);

		let tasks = (0..4).map(|_| {
			let syncer = syncer.clone();
			let addr = addr.clone();
			tokio::spawn(async move { syncer.reconcile(&addr).await })
		});
		let outcomes: Vec<SyncOutcome> = futures::future::join_all(tasks)
			.await
			.into_iter()
			.map(|r| r.unwrap())
			.collect();

		assert_eq!(
			outcomes.iter().filter(|o| **o == SyncOutcome::Inserted).count(),
			1
		);
		assert_eq!(
			outcomes.iter().filter(|o| o.is_duplicate()).count(),
			3
		);
		assert_eq!(registry.count_of(&addr), 1);
		assert_eq!(syncer.slots_held(), 0);
	}

	#[tokio::test]
	async fn test_create_failure_is_transient() {
		let registry = Arc::new(InMemoryRegistry::new());
		registry.fail_creates(true);
		let syncer = RegistrySyncer::new(registry.clone());
		let addr = address(4);

		assert!(matches!(
			syncer.reconcile(&addr).await,
			SyncOutcome::TransientFailure(_)
		));
		assert_eq!(registry.count_of(&addr), 0);

		registry.fail_creates(false);
		assert_eq!(syncer.reconcile(&addr).await, SyncOutcome::Inserted);
	}

	#[tokio::test]
	async fn test_list_failure_is_transient() {
		let registry = Arc::new(InMemoryRegistry::new());
		registry.fail_lists(true);
		let syncer = RegistrySyncer::new(registry.clone());

		assert!(matches!(
			syncer.reconcile(&address(5)).await,
			SyncOutcome::TransientFailure(_)
		));
		assert_eq!(registry.create_calls(), 0);
	}

	#[tokio::test]
	async fn test_conditional_create_preferred_when_available() {
		let registry = Arc::new(InMemoryRegistry::new().with_conditional_create());
		let syncer = RegistrySyncer::new(registry.clone());
		let addr = address(6);

		assert_eq!(syncer.reconcile(&addr).await, SyncOutcome::Inserted);
		assert_eq!(syncer.reconcile(&addr).await, SyncOutcome::AlreadyExists);
		assert_eq!(registry.list_calls(), 0);
		assert_eq!(registry.count_of(&addr), 1);
	}
}
