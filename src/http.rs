//! Transport primitives for the identity and push endpoints.
//!
//! The module exposes [`C2dmHttpClient`] alongside [`FormRequest`] and [`HttpResponse`] so
//! downstream crates can plug in custom HTTP stacks. Both endpoints speak form-encoded `POST`
//! requests and answer with small text bodies, so the contract stays that narrow: a transport
//! submits the form, then reports the status code, the `Retry-After` hint, and the body.
//! Non-2xx statuses are replies, not transport errors; only failures that prevent a reply
//! (DNS, connect, TLS, timeouts) belong in [`C2dmHttpClient::TransportError`].

// crates.io
#[cfg(feature = "reqwest")] use reqwest::{
	header::{AUTHORIZATION, HeaderMap, RETRY_AFTER},
	redirect::Policy,
};
#[cfg(feature = "reqwest")] use time::{OffsetDateTime, format_description::well_known::Rfc2822};
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Boxed future returned by [`C2dmHttpClient::post_form`].
pub type HttpFuture<'a, E> = Pin<Box<dyn Future<Output = Result<HttpResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports able to post forms to the C2DM endpoints.
///
/// Implementations must be `Send + Sync + 'static` so a single transport can back many clients,
/// and the futures they return must be `Send` so sends can hop executors.
pub trait C2dmHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Posts `request` and resolves with the endpoint's reply.
	fn post_form(&self, request: FormRequest) -> HttpFuture<'_, Self::TransportError>;
}

/// Form-encoded `POST` request addressed to one of the C2DM endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormRequest {
	/// Target endpoint.
	pub url: Url,
	/// Token rendered as `Authorization: GoogleLogin auth=<token>` when present.
	pub authorization: Option<TokenSecret>,
	/// Form fields in submission order.
	pub fields: Vec<(String, String)>,
}
impl FormRequest {
	/// Creates an unauthenticated request.
	pub fn new(url: Url, fields: Vec<(String, String)>) -> Self {
		Self { url, authorization: None, fields }
	}

	/// Attaches the bearer token.
	pub fn with_authorization(mut self, token: TokenSecret) -> Self {
		self.authorization = Some(token);

		self
	}

	/// Looks up the first value submitted for `name`.
	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
	}
}

/// Reply captured from an endpoint.
///
/// Additional fields may be added in future releases, so downstream code should construct
/// values through [`HttpResponse::new`] and the `with_*` helpers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
	/// HTTP status code.
	pub status: u16,
	/// Retry-After hint expressed as a relative duration.
	pub retry_after: Option<Duration>,
	/// Response body decoded as text.
	pub body: String,
}
impl HttpResponse {
	/// Creates a reply without a retry hint.
	pub fn new(status: u16, body: impl Into<String>) -> Self {
		Self { status, retry_after: None, body: body.into() }
	}

	/// Sets the retry hint.
	pub fn with_retry_after(mut self, retry_after: Option<Duration>) -> Self {
		self.retry_after = retry_after;

		self
	}

	/// Whether the status is in the `2xx` range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// Both C2DM endpoints answer directly, so the default client does not follow redirects; a
/// redirect reply is surfaced as an unexpected status instead. Configure any custom
/// [`ReqwestClient`] the same way.
#[cfg(feature = "reqwest")]
#[derive(Clone)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds the default transport.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client = ReqwestClient::builder().redirect(Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl C2dmHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_form(&self, request: FormRequest) -> HttpFuture<'_, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let mut builder = client.post(request.url).form(&request.fields);

			if let Some(token) = &request.authorization {
				builder = builder.header(AUTHORIZATION, token.authorization_header());
			}

			let response = builder.send().await?;
			let status = response.status().as_u16();
			let retry_after = parse_retry_after(response.headers());
			let body = response.text().await?;

			Ok(HttpResponse { status, retry_after, body })
		})
	}
}

#[cfg(feature = "reqwest")]
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
	let value = headers.get(RETRY_AFTER)?;
	let raw = value.to_str().ok()?.trim();

	if let Ok(secs) = raw.parse::<u64>() {
		return i64::try_from(secs).ok().map(Duration::seconds);
	}
	if let Ok(moment) = OffsetDateTime::parse(raw, &Rfc2822) {
		let delta = moment - OffsetDateTime::now_utc();

		if delta.is_positive() {
			return Some(delta);
		}
	}

	None
}
