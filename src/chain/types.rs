//! Types for chain balance retrieval

use primitive_types::U256;
use std::cmp::Ordering;
use std::time::Duration;

use crate::utils::{checked_exp10, format_token_amount};

/// Native-token balance kept at full precision.
///
/// `raw` is the amount in the smallest unit; `decimals` says where the decimal
/// point goes. Rounding only happens in [`Balance::display`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Balance {
    pub raw: U256,
    pub decimals: u8,
}

impl Balance {
    pub fn new(raw: U256, decimals: u8) -> Self {
        Self { raw, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(U256::zero(), decimals)
    }

    /// Render with `places` fractional digits.
    pub fn display(&self, places: u32) -> String {
        format_token_amount(self.raw, self.decimals as u32, places)
    }
}

/// Compare `raw * 10^shift` against `other` without losing precision. A scaled
/// value that overflows 256 bits is larger than any `U256`.
fn cmp_scaled(raw: U256, shift: u8, other: U256) -> Ordering {
    if raw.is_zero() {
        return U256::zero().cmp(&other);
    }
    match checked_exp10(shift as u32).and_then(|factor| raw.checked_mul(factor)) {
        Some(scaled) => scaled.cmp(&other),
        None => Ordering::Greater,
    }
}

impl Ord for Balance {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.decimals.cmp(&other.decimals) {
            Ordering::Equal => self.raw.cmp(&other.raw),
            Ordering::Less => cmp_scaled(self.raw, other.decimals - self.decimals, other.raw),
            Ordering::Greater => {
                cmp_scaled(other.raw, self.decimals - other.decimals, self.raw).reverse()
            }
        }
    }
}

impl PartialOrd for Balance {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Connection settings for the chain node.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// JSON-RPC endpoint of the node
    pub rpc_url: String,
    /// Decimal precision of the native unit
    pub decimals: u8,
    /// Upper bound on a single balance query
    pub timeout: Duration,
}

impl ChainConfig {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            decimals: super::NATIVE_TOKEN_DECIMALS,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Error types for balance retrieval
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Node unreachable, timed out or answered with something unusable.
    /// The caller may retry.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The node rejected the address. Not retried.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl FetchError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::NetworkError(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        FetchError::NetworkError(e.to_string())
    }
}
