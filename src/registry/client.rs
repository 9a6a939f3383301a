//!
//! HTTP client for the address registry.
//!
//! The registry exposes a single collection resource: `GET` lists every stored
//! record and `POST` creates one from a `{address}` body. All methods are async and
//! designed for use with Tokio.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use tracing::{debug, info};

use super::syncer::AddressRegistry;
use super::types::*;
use crate::address::Address;

/// Registry collection client
#[derive(Clone)]
pub struct RegistryClient {
	/// The underlying HTTP client.
	http_client: Client,
	/// URL of the registry collection.
	registry_url: String,
	/// Session token attached as a bearer credential, if any.
	token: Option<String>,
}

impl RegistryClient {
	/// Create a new registry client.
	///
	/// # Arguments
	/// * `registry_url` - The collection endpoint used for both list and create.
	///
	/// # Returns
	/// A new `RegistryClient`, or a `RegistryError` if the HTTP client could not be built.
	pub fn new(registry_url: impl Into<String>) -> Result<Self, RegistryError> {
		let http_client = Client::builder().timeout(Duration::from_secs(30)).build()?;

		Ok(Self {
			http_client,
			registry_url: registry_url.into(),
			token: None,
		})
	}

	/// Attach a session token to every subsequent request.
	pub fn set_token(&mut self, token: Option<String>) {
		self.token = token;
	}

	fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
		match &self.token {
			Some(token) => request.bearer_auth(token),
			None => request,
		}
	}

	/// Fetch every record in the registry.
	///
	/// # Returns
	/// The full list of entries, or a `RegistryError` if the request fails.
	pub async fn list(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
		let response = self
			.authorize(self.http_client.get(&self.registry_url))
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RegistryError::StatusError(response.status().as_u16()));
		}

		let entries: Vec<RegistryEntry> = response.json().await?;
		debug!("Registry returned {} entries", entries.len());
		Ok(entries)
	}

	/// Create a record for `address`.
	///
	/// The registry does not deduplicate; callers must check `list` first.
	pub async fn create(&self, address: &Address) -> Result<(), RegistryError> {
		let response = self
			.authorize(self.http_client.post(&self.registry_url))
			.header("Content-Type", "application/json")
			.json(&CreateEntry {
				address: address.as_str(),
			})
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(RegistryError::StatusError(response.status().as_u16()));
		}

		info!("Address {} added to registry", address);
		Ok(())
	}
}

#[async_trait]
impl AddressRegistry for RegistryClient {
	async fn list(&self) -> Result<Vec<RegistryEntry>, RegistryError> {
		RegistryClient::list(self).await
	}

	async fn create(&self, address: &Address) -> Result<(), RegistryError> {
		RegistryClient::create(self, address).await
	}
}
