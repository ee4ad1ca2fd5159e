//! Client-level error types shared by the token authority and the dispatcher.

// self
use crate::{_prelude::*, auth::TokenSecret, protocol::PushErrorCode};

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Every variant is terminal from the caller's point of view: the dispatcher already retried
/// `503` replies and quota errors before surfacing anything.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem detected at construction time.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure or a reply outside the expected HTTP contract.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Identity endpoint rejected the credentials (bad password, captcha challenge, ...).
	#[error("Identity endpoint rejected the credentials: {body}")]
	TokenFetch {
		/// Raw response body; usually `Error=<Reason>` plus optional captcha fields.
		body: String,
	},
	/// Push endpoint answered `401` for the current client token.
	#[error("Push endpoint rejected the client token {token}.")]
	InvalidToken {
		/// Token that was rejected. Callers must obtain a fresh one; nothing refreshes it
		/// automatically.
		token: TokenSecret,
	},
	/// Retry budget exhausted before the push endpoint accepted the message.
	#[error("Failed to deliver the notification after {attempts} attempts.")]
	MaxAttempts {
		/// Number of attempts that were made.
		attempts: u32,
	},
	/// Device registration is permanently invalid; stop sending to it.
	#[error("Device registration is invalid: {code}.")]
	InvalidDevice {
		/// Either [`PushErrorCode::InvalidRegistration`] or [`PushErrorCode::NotRegistered`].
		code: PushErrorCode,
	},
	/// Payload exceeds the push service size limit.
	#[error("Notification payload exceeds the {} byte limit.", crate::protocol::MAX_PAYLOAD_BYTES)]
	MessageTooBig,
	/// Endpoint returned a body outside the known protocol.
	#[error("Unknown response received: {body}")]
	UnknownResponse {
		/// Raw response body.
		body: String,
	},
}
impl Error {
	/// Returns `true` when the target device should no longer be addressed.
	pub fn is_device_invalid(&self) -> bool {
		matches!(self, Self::InvalidDevice { .. })
	}
}

/// Configuration and validation failures raised while building a client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Endpoint URL cannot be parsed.
	#[error("Endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},

	/// Neither a client token nor an account/secret pair was supplied.
	#[error("Must give a client token or an account and secret.")]
	MissingCredentials,
	/// Application source is missing or blank.
	#[error("Must provide an application source.")]
	MissingSource,
	/// Retry ceiling must allow at least one attempt.
	#[error("The max_attempts value must be positive.")]
	ZeroMaxAttempts,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures and replies that break the HTTP contract of either endpoint.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure (DNS, TCP, TLS, timeout).
	#[error("Couldn't connect to the C2DM service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Push endpoint answered with a status that is neither success, `401`, nor `503`.
	#[error("Unknown failure sending notification, status code: {status}.")]
	UnexpectedStatus {
		/// HTTP status code.
		status: u16,
	},
	/// Identity endpoint answered `2xx` with a body that does not carry a token on its third line.
	#[error("Invalid identity response: {snippet}")]
	InvalidTokenResponse {
		/// First characters of the offending body.
		snippet: String,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
