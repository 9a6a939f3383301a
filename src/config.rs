//! Runtime configuration.
//!
//! Every setting can come from the command line or from the environment. The
//! parsed values are turned into the per-component configs that get injected at
//! construction; nothing reads the environment after startup.

use clap::Parser;
use std::time::Duration;

use crate::capability::{StaticAccounts, StaticToken};
use crate::chain::{ChainConfig, NATIVE_TOKEN_DECIMALS};
use crate::presenter::{SortDirection, ViewState};
use crate::tracker::{RetryPolicy, SessionConfig};

/// Public Flow EVM testnet node.
pub const DEFAULT_RPC_URL: &str = "https://testnet.evm.nodes.onflow.org";

/// Balance tracker with registry sync
#[derive(Parser, Debug, Clone)]
#[command(name = "balance-registry-sync")]
#[command(about = "Track address balances and keep them registered in a remote registry")]
pub struct Config {
	/// Chain JSON-RPC endpoint
	#[arg(long, env = "RPC_URL", default_value = DEFAULT_RPC_URL)]
	pub rpc_url: String,

	/// Registry collection URL (list with GET, create with POST)
	#[arg(long, env = "REGISTRY_URL")]
	pub registry_url: String,

	/// Bearer token for the registry. It is also the session token, so
	/// `--wallet-accounts` only connects when this is set.
	#[arg(long, env = "REGISTRY_TOKEN")]
	pub registry_token: Option<String>,

	/// Decimal precision of the native token (at most 77, the largest power of
	/// ten that fits in 256 bits)
	#[arg(
		long,
		env = "NATIVE_DECIMALS",
		default_value_t = NATIVE_TOKEN_DECIMALS,
		value_parser = clap::value_parser!(u8).range(0..=77)
	)]
	pub native_decimals: u8,

	/// Timeout for a single balance query, in seconds
	#[arg(long, env = "FETCH_TIMEOUT_SECS", default_value_t = 10)]
	pub fetch_timeout_secs: u64,

	/// Extra attempts after a failed balance query
	#[arg(long, env = "FETCH_RETRIES", default_value_t = 2)]
	pub fetch_retries: u32,

	/// Lifetime of transient notices, in seconds
	#[arg(long, env = "NOTICE_SECS", default_value_t = 3)]
	pub notice_secs: u64,

	/// Accounts exposed by the connected wallet, comma separated
	#[arg(long, env = "WALLET_ACCOUNTS", value_delimiter = ',')]
	pub wallet_accounts: Vec<String>,

	/// Only show addresses containing this text
	#[arg(short, long, default_value = "")]
	pub search: String,

	/// Sort by ascending balance instead of descending
	#[arg(long)]
	pub ascending: bool,

	/// Addresses to track, entered manually
	pub addresses: Vec<String>,
}

impl Config {
	pub fn chain_config(&self) -> ChainConfig {
		ChainConfig {
			rpc_url: self.rpc_url.clone(),
			decimals: self.native_decimals,
			timeout: Duration::from_secs(self.fetch_timeout_secs),
		}
	}

	pub fn session_config(&self) -> SessionConfig {
		SessionConfig {
			retry: RetryPolicy {
				max_retries: self.fetch_retries,
				..RetryPolicy::default()
			},
			notice_ttl: Duration::from_secs(self.notice_secs),
		}
	}

	/// Session login backed by the registry token.
	pub fn auth(&self) -> StaticToken {
		StaticToken(self.registry_token.clone())
	}

	/// Wallet exposing `--wallet-accounts`, if any were given.
	pub fn wallet(&self) -> Option<StaticAccounts> {
		if self.wallet_accounts.is_empty() {
			return None;
		}
		Some(StaticAccounts(self.wallet_accounts.clone()))
	}

	pub fn view_state(&self) -> ViewState {
		let direction = if self.ascending {
			SortDirection::Asc
		} else {
			SortDirection::Desc
		};
		ViewState::new(direction, self.search.clone())
	}
}
