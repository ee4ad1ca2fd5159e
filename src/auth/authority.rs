//! Lazily fetched, cached ClientLogin token.
//!
//! The authority starts populated when the configuration carried a token, otherwise empty. The
//! first [`TokenAuthority::token`] call exchanges the account and secret for a token and caches
//! it for the lifetime of the authority; nothing expires or refreshes it afterwards. Concurrent
//! first callers piggy-back on a single in-flight fetch instead of stampeding the identity
//! endpoint, while cached reads only take a read lock.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	config::ClientConfig,
	dispatch::ClientMetrics,
	error::{ConfigError, TransportError},
	http::{C2dmHttpClient, FormRequest},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	protocol,
};

/// Owner of the single cached token slot.
pub struct TokenAuthority {
	credentials: Credentials,
	source: String,
	endpoint: Url,
	cached: RwLock<Option<TokenSecret>>,
	fetch_guard: AsyncMutex<()>,
}
impl TokenAuthority {
	/// Creates an authority seeded from `config`.
	pub fn new(config: &ClientConfig) -> Self {
		Self {
			credentials: config.credentials.clone(),
			source: config.source.clone(),
			endpoint: config.endpoints.identity.clone(),
			cached: RwLock::new(config.credentials.initial_token().cloned()),
			fetch_guard: AsyncMutex::new(()),
		}
	}

	/// Returns the cached token without performing I/O.
	pub fn cached(&self) -> Option<TokenSecret> {
		self.cached.read().clone()
	}

	/// Replaces (or clears, with `None`) the cached token.
	pub fn set(&self, token: Option<TokenSecret>) {
		*self.cached.write() = token;
	}

	/// Returns the cached token, fetching and caching it first when the slot is empty.
	///
	/// A failed fetch leaves the slot empty and propagates the error.
	pub async fn token<C>(&self, http_client: &C, metrics: &ClientMetrics) -> Result<TokenSecret>
	where
		C: ?Sized + C2dmHttpClient,
	{
		if let Some(token) = self.cached() {
			obs::trace_token_cache_hit();

			return Ok(token);
		}

		let _singleflight = self.fetch_guard.lock().await;

		if let Some(token) = self.cached() {
			obs::trace_token_cache_hit();

			return Ok(token);
		}

		let token = self.fetch(http_client, metrics).await?;

		self.set(Some(token.clone()));

		Ok(token)
	}

	async fn fetch<C>(&self, http_client: &C, metrics: &ClientMetrics) -> Result<TokenSecret>
	where
		C: ?Sized + C2dmHttpClient,
	{
		const KIND: OperationKind = OperationKind::TokenFetch;

		let span = OperationSpan::new(KIND, "client_login");

		obs::record_outcome(KIND, OperationOutcome::Attempt);
		metrics.record_token_fetch();

		let result = span
			.instrument(async move {
				let form = self
					.credentials
					.login_form(&self.source)
					.ok_or_else(|| Error::from(ConfigError::MissingCredentials))?;
				let response = http_client
					.post_form(FormRequest::new(self.endpoint.clone(), form))
					.await
					.map_err(|e| Error::from(TransportError::network(e)))?;

				if !response.is_success() {
					return Err(Error::TokenFetch { body: response.body });
				}

				protocol::parse_token_response(&response.body)
					.map_err(|snippet| Error::from(TransportError::InvalidTokenResponse { snippet }))
			})
			.await;

		match &result {
			Ok(_) => obs::record_outcome(KIND, OperationOutcome::Success),
			Err(_) => obs::record_outcome(KIND, OperationOutcome::Failure),
		}

		result
	}
}
impl Debug for TokenAuthority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAuthority")
			.field("credentials", &self.credentials)
			.field("source", &self.source)
			.field("endpoint", &self.endpoint.as_str())
			.field("token_cached", &self.cached.read().is_some())
			.finish()
	}
}
