//!
//! JSON-RPC client for chain balance queries.
//!
//! This module provides the `BalanceProvider` seam and its HTTP implementation,
//! which posts `eth_getBalance` requests to a configured node and returns the
//! raw balance in the smallest native unit.

use async_trait::async_trait;
use primitive_types::U256;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::debug;

use super::types::FetchError;
use crate::address::Address;

/// JSON-RPC error code for invalid method parameters.
const INVALID_PARAMS: i64 = -32602;

/// Source of raw on-chain balances.
#[async_trait]
pub trait BalanceProvider: Send + Sync {
	/// Balance of `address` in the smallest native unit.
	async fn get_balance(&self, address: &Address) -> Result<U256, FetchError>;
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
	code: i64,
	message: String,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
	result: Option<String>,
	error: Option<RpcErrorObject>,
}

/// Chain node client speaking Ethereum-style JSON-RPC over HTTP
pub struct RpcBalanceProvider {
	/// The underlying HTTP client.
	http_client: Client,
	/// JSON-RPC endpoint of the node.
	rpc_url: String,
	request_id: AtomicU64,
}

impl RpcBalanceProvider {
	/// Create a new provider.
	///
	/// # Arguments
	/// * `rpc_url` - The HTTP JSON-RPC endpoint.
	/// * `timeout` - Request timeout applied by the HTTP client.
	///
	/// # Returns
	/// The provider, or a `FetchError` if the HTTP client could not be built.
	pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
		let http_client = Client::builder().timeout(timeout).build()?;

		Ok(Self {
			http_client,
			rpc_url: rpc_url.into(),
			request_id: AtomicU64::new(1),
		})
	}

	fn next_id(&self) -> u64 {
		self.request_id.fetch_add(1, Ordering::Relaxed)
	}

	/// Execute a JSON-RPC call and return the `result` string.
	async fn call(&self, method: &str, params: serde_json::Value) -> Result<String, FetchError> {
		let request_body = json!({
			"jsonrpc": "2.0",
			"id": self.next_id(),
			"method": method,
			"params": params,
		});

		let response = self
			.http_client
			.post(&self.rpc_url)
			.header("Content-Type", "application/json")
			.json(&request_body)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(FetchError::NetworkError(format!(
				"HTTP error: {}",
				response.status()
			)));
		}

		let body: RpcResponse = response.json().await?;
		extract_result(body)
	}
}

#[async_trait]
impl BalanceProvider for RpcBalanceProvider {
	async fn get_balance(&self, address: &Address) -> Result<U256, FetchError> {
		debug!("Querying balance for {}", address);
		let result = self
			.call("eth_getBalance", json!([address.as_str(), "latest"]))
			.await?;
		parse_quantity(&result)
	}
}

fn extract_result(body: RpcResponse) -> Result<String, FetchError> {
	if let Some(error) = body.error {
		return Err(if error.code == INVALID_PARAMS {
			FetchError::InvalidAddress(error.message)
		} else {
			FetchError::NetworkError(format!("RPC error {}: {}", error.code, error.message))
		});
	}

	body.result
		.ok_or_else(|| FetchError::NetworkError("RPC response missing result".to_string()))
}

/// Parse a hex-encoded JSON-RPC quantity such as `0x1bc16d674ec80000`.
pub(crate) fn parse_quantity(value: &str) -> Result<U256, FetchError> {
	let digits = value
		.strip_prefix("0x")
		.ok_or_else(|| FetchError::NetworkError(format!("quantity without 0x prefix: {}", value)))?;

	if digits.is_empty() || digits.len() > 64 {
		return Err(FetchError::NetworkError(format!(
			"malformed quantity: {}",
			value
		)));
	}

	U256::from_str_radix(digits, 16)
		.map_err(|e| FetchError::NetworkError(format!("malformed quantity {}: {:?}", value, e)))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_quantity() {
		assert_eq!(parse_quantity("0x0").unwrap(), U256::zero());
		assert_eq!(
			parse_quantity("0x1bc16d674ec80000").unwrap(),
			U256::from(2_000_000_000_000_000_000u64)
		);
		assert!(parse_quantity("1234").is_err());
		assert!(parse_quantity("0x").is_err());
		assert!(parse_quantity("0xzz").is_err());
	}

	#[test]
	fn test_rpc_error_mapping() {
		let invalid: RpcResponse = serde_json::from_str(
			r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32602,"message":"invalid argument 0"}}"#,
		)
		.unwrap();
		assert_eq!(
			extract_result(invalid),
			Err(FetchError::InvalidAddress("invalid argument 0".to_string()))
		);

		let internal: RpcResponse = serde_json::from_str(
			r#"{"jsonrpc":"2.0","id":1,"error":{"code":-32000,"message":"header not found"}}"#,
		)
		.unwrap();
		assert!(matches!(
			extract_result(internal),
			Err(FetchError::NetworkError(_))
		));
	}

	#[test]
	fn test_rpc_result_extracted() {
		let ok: RpcResponse =
			serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"result":"0x10"}"#).unwrap();
		assert_eq!(extract_result(ok).unwrap(), "0x10");

		let empty: RpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":7}"#).unwrap();
		assert!(extract_result(empty).is_err());
	}
}
