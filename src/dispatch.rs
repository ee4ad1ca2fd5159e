//! Notification dispatch: the client object, its request value, and the retry machinery.

pub mod backoff;
pub mod notification;

mod metrics;
mod send;

pub use backoff::*;
pub use metrics::*;
pub use notification::*;

// self
use crate::{
	_prelude::*,
	auth::{TokenAuthority, TokenSecret},
	config::ClientConfig,
	http::C2dmHttpClient,
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport.
pub type ReqwestC2dm = C2dm<ReqwestHttpClient>;

/// C2DM client owning the token authority and the push dispatcher.
///
/// The configuration is fixed at construction. The only mutable state is the cached token, which
/// the first send (or [`C2dm::get_token`]) populates and which stays put until the caller
/// replaces it through [`C2dm::set_token`] or [`C2dm::clear_token`].
pub struct C2dm<C>
where
	C: ?Sized + C2dmHttpClient,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Sleeper used between attempts.
	pub sleeper: Arc<dyn Sleeper>,
	/// Backoff policy applied to retryable replies.
	pub backoff: Backoff,
	/// Shared counters for requests, retries, and outcomes.
	pub metrics: Arc<ClientMetrics>,
	config: ClientConfig,
	authority: TokenAuthority,
}
impl<C> C2dm<C>
where
	C: ?Sized + C2dmHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: ClientConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self {
			http_client: http_client.into(),
			sleeper: Arc::new(TokioSleeper),
			backoff: Backoff::default(),
			metrics: Default::default(),
			authority: TokenAuthority::new(&config),
			config,
		}
	}

	/// Replaces the sleeper used between attempts.
	pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
		self.sleeper = sleeper;

		self
	}

	/// Replaces the backoff policy.
	pub fn with_backoff(mut self, backoff: Backoff) -> Self {
		self.backoff = backoff;

		self
	}

	/// Configuration the client was built with.
	pub fn config(&self) -> &ClientConfig {
		&self.config
	}

	/// Returns the client token, contacting the identity endpoint only when none is cached.
	///
	/// Persist the returned token and pass it to later clients to avoid repeated logins, which
	/// the identity service answers with captcha challenges.
	pub async fn get_token(&self) -> Result<TokenSecret> {
		self.authority.token(self.http_client.as_ref(), &self.metrics).await
	}

	/// Returns the cached token without performing I/O.
	pub fn cached_token(&self) -> Option<TokenSecret> {
		self.authority.cached()
	}

	/// Overrides the cached token.
	pub fn set_token(&self, token: impl Into<TokenSecret>) {
		self.authority.set(Some(token.into()));
	}

	/// Empties the token cache so the next send logs in again.
	pub fn clear_token(&self) {
		self.authority.set(None);
	}
}
#[cfg(feature = "reqwest")]
impl C2dm<ReqwestHttpClient> {
	/// Creates a client backed by the default reqwest transport.
	pub fn new(config: ClientConfig) -> Result<Self> {
		let http_client = ReqwestHttpClient::new()?;

		Ok(Self::with_http_client(config, http_client))
	}
}
impl<C> Debug for C2dm<C>
where
	C: ?Sized + C2dmHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("C2dm")
			.field("source", &self.config.source)
			.field("max_attempts", &self.config.max_attempts)
			.field("authority", &self.authority)
			.field("backoff", &self.backoff)
			.finish()
	}
}
