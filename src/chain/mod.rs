//! Chain integration for native-token balances.
//!
//! This module provides the JSON-RPC balance provider and the `BalanceFetcher`
//! that wraps it with a bounded timeout and decimal scaling. The endpoint is an
//! explicit `ChainConfig` value handed in at construction.

/// Balance fetcher with timeout and decimal scaling
mod fetcher;
/// JSON-RPC provider for `eth_getBalance`
mod rpc;
/// Balance, config and error types
mod types;

pub use fetcher::BalanceFetcher;
pub use rpc::{BalanceProvider, RpcBalanceProvider};
pub use types::*;

/// Number of decimal places of the native token on the configured network.
pub const NATIVE_TOKEN_DECIMALS: u8 = 18;

/// Fractional digits shown when a balance is displayed.
pub const DISPLAY_PLACES: u32 = 2;
