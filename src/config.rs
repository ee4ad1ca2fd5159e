//! Client configuration: credentials, application source, retry ceiling, and endpoints.
//!
//! [`ClientConfig`] is immutable once built. The builder enforces the credential invariant
//! (a token, or an account plus secret) and a non-blank application source, so a client that
//! exists is always able to authenticate. Hosts that load settings from files can deserialize a
//! [`RawClientConfig`]; conversion runs the same validation.

// self
use crate::{
	_prelude::*,
	auth::{Credentials, TokenSecret},
	error::ConfigError,
};

/// Production ClientLogin endpoint.
pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://www.google.com/accounts/ClientLogin";
/// Production push endpoint.
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://android.apis.google.com/c2dm/send";
/// Default retry ceiling.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Identity and push endpoint URLs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
	/// ClientLogin endpoint used to exchange credentials for a token.
	pub identity: Url,
	/// Push endpoint that accepts notifications.
	pub push: Url,
}
impl Endpoints {
	/// Creates an endpoint pair from parsed URLs.
	pub fn new(identity: Url, push: Url) -> Self {
		Self { identity, push }
	}

	/// Parses an endpoint pair.
	pub fn parse(identity: &str, push: &str) -> Result<Self, ConfigError> {
		let identity =
			Url::parse(identity).map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let push = Url::parse(push).map_err(|source| ConfigError::InvalidEndpoint { source })?;

		Ok(Self { identity, push })
	}

	/// Production endpoints.
	pub fn production() -> Result<Self, ConfigError> {
		Self::parse(DEFAULT_IDENTITY_ENDPOINT, DEFAULT_PUSH_ENDPOINT)
	}
}

/// Validated client configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
	/// Token or account/secret pair.
	pub credentials: Credentials,
	/// Application identifier, usually `company-app-version`.
	pub source: String,
	/// Maximum number of push attempts per send, at least 1.
	pub max_attempts: u32,
	/// Endpoint URLs.
	pub endpoints: Endpoints,
}
impl ClientConfig {
	/// Starts a builder with defaults for everything but credentials and source.
	pub fn builder() -> ClientConfigBuilder {
		ClientConfigBuilder::default()
	}
}
impl TryFrom<RawClientConfig> for ClientConfig {
	type Error = ConfigError;

	fn try_from(raw: RawClientConfig) -> Result<Self, Self::Error> {
		ClientConfigBuilder { raw }.build()
	}
}

/// Unvalidated configuration, suitable for deserializing from host-provided settings.
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawClientConfig {
	/// Account identifier.
	pub account: Option<String>,
	/// Account secret.
	pub secret: Option<TokenSecret>,
	/// Pre-issued ClientLogin token.
	pub token: Option<TokenSecret>,
	/// Application source.
	pub source: Option<String>,
	/// Retry ceiling; defaults to [`DEFAULT_MAX_ATTEMPTS`].
	pub max_attempts: Option<u32>,
	/// Identity endpoint override.
	pub identity_endpoint: Option<Url>,
	/// Push endpoint override.
	pub push_endpoint: Option<Url>,
}
impl Debug for RawClientConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RawClientConfig")
			.field("account", &self.account)
			.field("secret_set", &self.secret.is_some())
			.field("token_set", &self.token.is_some())
			.field("source", &self.source)
			.field("max_attempts", &self.max_attempts)
			.field("identity_endpoint", &self.identity_endpoint)
			.field("push_endpoint", &self.push_endpoint)
			.finish()
	}
}

/// Builder for [`ClientConfig`] values.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
	raw: RawClientConfig,
}
impl ClientConfigBuilder {
	/// Sets the account identifier.
	pub fn account(mut self, account: impl Into<String>) -> Self {
		self.raw.account = Some(account.into());

		self
	}

	/// Sets the account secret.
	pub fn secret(mut self, secret: impl Into<TokenSecret>) -> Self {
		self.raw.secret = Some(secret.into());

		self
	}

	/// Sets a pre-issued token. A token takes precedence over an account/secret pair.
	pub fn token(mut self, token: impl Into<TokenSecret>) -> Self {
		self.raw.token = Some(token.into());

		self
	}

	/// Sets the application source.
	pub fn source(mut self, source: impl Into<String>) -> Self {
		self.raw.source = Some(source.into());

		self
	}

	/// Overrides the retry ceiling.
	pub fn max_attempts(mut self, max_attempts: u32) -> Self {
		self.raw.max_attempts = Some(max_attempts);

		self
	}

	/// Overrides both endpoints.
	pub fn endpoints(self, endpoints: Endpoints) -> Self {
		self.identity_endpoint(endpoints.identity).push_endpoint(endpoints.push)
	}

	/// Overrides only the identity endpoint.
	pub fn identity_endpoint(mut self, url: Url) -> Self {
		self.raw.identity_endpoint = Some(url);

		self
	}

	/// Overrides only the push endpoint.
	pub fn push_endpoint(mut self, url: Url) -> Self {
		self.raw.push_endpoint = Some(url);

		self
	}

	/// Validates the collected settings.
	pub fn build(self) -> Result<ClientConfig, ConfigError> {
		let RawClientConfig {
			account,
			secret,
			token,
			source,
			max_attempts,
			identity_endpoint,
			push_endpoint,
		} = self.raw;
		let token = token.filter(|token| !token.is_blank());
		let account = account.filter(|account| !account.trim().is_empty());
		let secret = secret.filter(|secret| !secret.is_blank());
		let credentials = match (token, account, secret) {
			(Some(token), _, _) => Credentials::Token(token),
			(None, Some(account), Some(secret)) => Credentials::Password { account, secret },
			_ => return Err(ConfigError::MissingCredentials),
		};
		let source = source
			.map(|source| source.trim().to_owned())
			.filter(|source| !source.is_empty())
			.ok_or(ConfigError::MissingSource)?;
		let max_attempts = max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);

		if max_attempts == 0 {
			return Err(ConfigError::ZeroMaxAttempts);
		}

		let defaults = Endpoints::production()?;
		let endpoints = Endpoints::new(
			identity_endpoint.unwrap_or(defaults.identity),
			push_endpoint.unwrap_or(defaults.push),
		);

		Ok(ClientConfig { credentials, source, max_attempts, endpoints })
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn build_requires_credentials() {
		let err = ClientConfig::builder()
			.source("acme-push-1")
			.build()
			.expect_err("Missing credentials should be rejected.");

		assert!(matches!(err, ConfigError::MissingCredentials));

		let err = ClientConfig::builder()
			.account("ops@example.com")
			.source("acme-push-1")
			.build()
			.expect_err("An account without a secret should be rejected.");

		assert!(matches!(err, ConfigError::MissingCredentials));
		assert_eq!(err.to_string(), "Must give a client token or an account and secret.");
	}

	#[test]
	fn build_requires_source() {
		let err = ClientConfig::builder()
			.account("ops@example.com")
			.secret("hunter2")
			.build()
			.expect_err("Missing source should be rejected.");

		assert!(matches!(err, ConfigError::MissingSource));

		let err = ClientConfig::builder()
			.token("asdf")
			.source("   ")
			.build()
			.expect_err("Blank source should be rejected.");

		assert!(matches!(err, ConfigError::MissingSource));
	}

	#[test]
	fn build_rejects_zero_attempts() {
		let err = ClientConfig::builder()
			.token("asdf")
			.source("acme-push-1")
			.max_attempts(0)
			.build()
			.expect_err("Zero attempts should be rejected.");

		assert!(matches!(err, ConfigError::ZeroMaxAttempts));
	}

	#[test]
	fn token_wins_over_password_and_defaults_apply() {
		let config = ClientConfig::builder()
			.account("ops@example.com")
			.secret("hunter2")
			.token("ABCDEF123")
			.source("acme-push-1")
			.build()
			.expect("Token plus password should build.");

		assert_eq!(config.credentials, Credentials::token("ABCDEF123"));
		assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
		assert_eq!(
			config.endpoints,
			Endpoints::production().expect("Production endpoints should parse.")
		);
		assert_eq!(config.endpoints.push.as_str(), DEFAULT_PUSH_ENDPOINT);
	}

	#[test]
	fn single_endpoint_override_keeps_the_other_default() {
		let config = ClientConfig::builder()
			.token("ABCDEF123")
			.source("acme-push-1")
			.push_endpoint(Url::parse("http://127.0.0.1:9000/send").expect("Failed to parse URL."))
			.build()
			.expect("Endpoint override should build.");

		assert_eq!(config.endpoints.push.as_str(), "http://127.0.0.1:9000/send");
		assert_eq!(config.endpoints.identity.as_str(), DEFAULT_IDENTITY_ENDPOINT);
	}

	#[test]
	fn raw_config_deserializes_and_validates() {
		let raw: RawClientConfig = serde_json::from_str(
			r#"{"account":"ops@example.com","secret":"hunter2","source":"acme-push-1","max_attempts":3}"#,
		)
		.expect("Raw configuration should deserialize.");
		let config = ClientConfig::try_from(raw).expect("Raw configuration should validate.");

		assert_eq!(config.credentials, Credentials::password("ops@example.com", "hunter2"));
		assert_eq!(config.max_attempts, 3);

		let raw: RawClientConfig = serde_json::from_str(r#"{"token":"abc"}"#)
			.expect("Partial configuration should deserialize.");

		assert!(matches!(ClientConfig::try_from(raw), Err(ConfigError::MissingSource)));
	}

	#[test]
	fn invalid_endpoint_is_reported() {
		let err = Endpoints::parse("not a url", DEFAULT_PUSH_ENDPOINT)
			.expect_err("Invalid endpoint should be rejected.");

		assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
	}
}
