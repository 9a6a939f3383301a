//! In-memory stand-ins for the external services, shared by unit tests.

use async_trait::async_trait;
use primitive_types::U256;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use crate::address::Address;
use crate::capability::{AuthCapability, CapabilityError, WalletCapability};
use crate::chain::{BalanceProvider, FetchError};
use crate::registry::{AddressRegistry, RegistryEntry, RegistryError};

/// Deterministic valid address for index `n`.
pub fn address(n: u64) -> Address {
	Address::validate(&format!("0x{:040x}", n)).expect("generated address is valid")
}

/// One 18-decimal unit scaled by `units / 100`.
pub fn cents(units: u64) -> U256 {
	U256::from(units) * U256::exp10(16)
}

#[derive(Default)]
pub struct FakeBalanceProvider {
	balances: Mutex<HashMap<Address, U256>>,
	errors: Mutex<HashMap<Address, FetchError>>,
	failures_before_success: Mutex<HashMap<Address, usize>>,
	delay: Mutex<Option<Duration>>,
	calls: AtomicUsize,
}

impl FakeBalanceProvider {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_balance(&self, address: &Address, raw: U256) {
		self.balances.lock().unwrap().insert(address.clone(), raw);
	}

	pub fn set_error(&self, address: &Address, error: FetchError) {
		self.errors.lock().unwrap().insert(address.clone(), error);
	}

	/// Fail with a network error `count` times before answering normally.
	pub fn fail_times(&self, address: &Address, count: usize) {
		self.failures_before_success
			.lock()
			.unwrap()
			.insert(address.clone(), count);
	}

	pub fn set_delay(&self, delay: Duration) {
		*self.delay.lock().unwrap() = Some(delay);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl BalanceProvider for FakeBalanceProvider {
	async fn get_balance(&self, address: &Address) -> Result<U256, FetchError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		let delay = *self.delay.lock().unwrap();
		if let Some(delay) = delay {
			tokio::time::sleep(delay).await;
		}

		{
			let mut failures = self.failures_before_success.lock().unwrap();
			if let Some(remaining) = failures.get_mut(address) {
				if *remaining > 0 {
					*remaining -= 1;
					return Err(FetchError::NetworkError("connection refused".to_string()));
				}
			}
		}

		if let Some(error) = self.errors.lock().unwrap().get(address) {
			return Err(error.clone());
		}
		Ok(self
			.balances
			.lock()
			.unwrap()
			.get(address)
			.copied()
			.unwrap_or_default())
	}
}

#[derive(Default)]
pub struct InMemoryRegistry {
	entries: Mutex<Vec<RegistryEntry>>,
	latency: Option<Duration>,
	conditional: bool,
	fail_lists: AtomicBool,
	fail_creates: AtomicBool,
	list_calls: AtomicUsize,
	create_calls: AtomicUsize,
}

impl InMemoryRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_latency(mut self, latency: Duration) -> Self {
		self.latency = Some(latency);
		self
	}

	pub fn with_conditional_create(mut self) -> Self {
		self.conditional = true;
		self
	}

	pub fn seed(&self, raw: &str) {
		self.entries.lock().unwrap().push(RegistryEntry {
			address: raw.to_string(),
		});
	}

	pub fn fail_lists(&self, fail: bool) {
		self.fail_lists.store(fail, Ordering::SeqCst);
	}

	pub fn fail_creates(&self, fail: bool) {
		self.fail_creates.store(fail, Ordering::SeqCst);
	}

	pub fn count_of(&self, address: &Address) -> usize {
		self.entries
			.lock()
			.unwrap()
			.iter()
			.filter(|entry| address.matches(&entry.address))
			.count()
	}

	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}

	pub fn create_calls(&self) -> usize {
		self.create_calls.load(Ordering::SeqCst)
	}

	async fn pause(&self) {
		if let Some(latency) = self.latency {
			tokio::time::sleep(latency).await;
		}
	}
}

#[async_trait]
impl AddressRegistry for InMemoryRegistry {
	async fn list(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);
		self.pause().await;
		if self.fail_lists.load(Ordering::SeqCst) {
			return Err(RegistryError::StatusError(503));
		}
		Ok(self.entries.lock().unwrap().clone())
	}

	async fn create(&self, address: &Address) -> Result<(), RegistryError> {
		self.create_calls.fetch_add(1, Ordering::SeqCst);
		self.pause().await;
		if self.fail_creates.load(Ordering::SeqCst) {
			return Err(RegistryError::Unavailable("write rejected".to_string()));
		}
		self.entries.lock().unwrap().push(RegistryEntry {
			address: address.to_string(),
		});
		Ok(())
	}

	async fn insert_if_absent(&self, address: &Address) -> Result<Option<bool>, RegistryError> {
		if !self.conditional {
			return Ok(None);
		}
		let mut entries = self.entries.lock().unwrap();
		if entries.iter().any(|entry| address.matches(&entry.address)) {
			return Ok(Some(false));
		}
		entries.push(RegistryEntry {
			address: address.to_string(),
		});
		Ok(Some(true))
	}
}

/// Wallet that always answers with the same account strings.
pub struct FakeWallet {
	pub accounts: Result<Vec<String>, CapabilityError>,
	pub released: AtomicBool,
}

impl FakeWallet {
	pub fn with_accounts(accounts: &[&str]) -> Self {
		Self {
			accounts: Ok(accounts.iter().map(|a| a.to_string()).collect()),
			released: AtomicBool::new(false),
		}
	}

	pub fn missing() -> Self {
		Self {
			accounts: Err(CapabilityError::Unavailable("wallet".to_string())),
			released: AtomicBool::new(false),
		}
	}
}

#[async_trait]
impl WalletCapability for FakeWallet {
	async fn request_accounts(&self) -> Result<Vec<String>, CapabilityError> {
		self.accounts.clone()
	}

	async fn release(&self) -> Result<(), CapabilityError> {
		self.released.store(true, Ordering::SeqCst);
		Ok(())
	}
}

pub struct FakeAuth(pub Option<&'static str>);

#[async_trait]
impl AuthCapability for FakeAuth {
	async fn session_token(&self) -> Result<String, CapabilityError> {
		self.0
			.map(str::to_string)
			.ok_or_else(|| CapabilityError::Unavailable("authentication".to_string()))
	}
}
