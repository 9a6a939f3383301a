//! External capabilities the session depends on.
//!
//! The wallet handshake and the authentication redirect flow live outside this
//! crate. They are reached only through these traits: a wallet yields the account
//! strings it exposes and an auth provider yields a session token.

use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
	#[error("{0} is not available")]
	Unavailable(String),
}

/// Wallet connection
#[async_trait]
pub trait WalletCapability: Send + Sync {
	/// Ask the wallet for its accounts. Addresses are returned as the wallet
	/// reports them and may not be canonical.
	async fn request_accounts(&self) -> Result<Vec<String>, CapabilityError>;

	/// Drop whatever permission the wallet granted on connect.
	async fn release(&self) -> Result<(), CapabilityError> {
		Ok(())
	}
}

/// Authentication flow that produces a session token
#[async_trait]
pub trait AuthCapability: Send + Sync {
	async fn session_token(&self) -> Result<String, CapabilityError>;
}

/// Wallet whose accounts are known up front, e.g. passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct StaticAccounts(pub Vec<String>);

#[async_trait]
impl WalletCapability for StaticAccounts {
	async fn request_accounts(&self) -> Result<Vec<String>, CapabilityError> {
		if self.0.is_empty() {
			return Err(CapabilityError::Unavailable("wallet".to_string()));
		}
		Ok(self.0.clone())
	}
}

/// Auth provider backed by a pre-issued token.
#[derive(Debug, Clone, Default)]
pub struct StaticToken(pub Option<String>);

#[async_trait]
impl AuthCapability for StaticToken {
	async fn session_token(&self) -> Result<String, CapabilityError> {
		self.0
			.clone()
			.filter(|token| !token.is_empty())
			.ok_or_else(|| CapabilityError::Unavailable("authentication".to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_static_accounts() {
		let wallet = StaticAccounts(vec!["0xabc".to_string()]);
		assert_eq!(wallet.request_accounts().await.unwrap(), vec!["0xabc"]);
		assert!(StaticAccounts::default().request_accounts().await.is_err());
	}

	#[tokio::test]
	async fn test_static_token() {
		assert_eq!(
			StaticToken(Some("t0k".into())).session_token().await.unwrap(),
			"t0k"
		);
		assert_eq!(
			StaticToken(Some(String::new())).session_token().await,
			Err(CapabilityError::Unavailable("authentication".to_string()))
		);
		assert!(StaticToken(None).session_token().await.is_err());
	}
}
