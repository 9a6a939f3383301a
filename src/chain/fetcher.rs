use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::rpc::{BalanceProvider, RpcBalanceProvider};
use super::types::{Balance, ChainConfig, FetchError};
use crate::address::Address;

/// Queries one address's balance at a time.
///
/// Each call is bounded by the configured timeout and never retried here;
/// retry policy belongs to the caller.
#[derive(Clone)]
pub struct BalanceFetcher {
	provider: Arc<dyn BalanceProvider>,
	decimals: u8,
	timeout: Duration,
}

impl BalanceFetcher {
	pub fn new(provider: Arc<dyn BalanceProvider>, decimals: u8, timeout: Duration) -> Self {
		Self {
			provider,
			decimals,
			timeout,
		}
	}

	/// Build a fetcher backed by the JSON-RPC node in `config`.
	pub fn from_config(config: &ChainConfig) -> Result<Self, FetchError> {
		let provider = RpcBalanceProvider::new(config.rpc_url.clone(), config.timeout)?;
		Ok(Self::new(Arc::new(provider), config.decimals, config.timeout))
	}

	pub async fn fetch(&self, address: &Address) -> Result<Balance, FetchError> {
		let raw = tokio::time::timeout(self.timeout, self.provider.get_balance(address))
			.await
			.map_err(|_| {
				warn!("Balance query for {} timed out after {:?}", address, self.timeout);
				FetchError::NetworkError(format!("timed out after {:?}", self.timeout))
			})??;

		debug!("Fetched balance for {}: {} (raw)", address, raw);
		Ok(Balance::new(raw, self.decimals))
	}
}
