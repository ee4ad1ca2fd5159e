//! Parsers for the line-oriented `key=value` bodies returned by the C2DM endpoints.
//!
//! Parsing is kept free of I/O and retry concerns: the dispatcher feeds reply bodies in and acts
//! on the tagged results.

// std
use std::str::FromStr;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// Payload size limit enforced by the push service.
pub const MAX_PAYLOAD_BYTES: usize = 1024;
/// Length of the body snippet attached to malformed identity replies.
pub const SNIPPET_LEN: usize = 64;

/// Extracts the token from a ClientLogin success body.
///
/// The body is a newline-delimited list of `key=value` lines (`SID`, `LSID`, `Auth`); the token is
/// the value of the third line. Returns the first [`SNIPPET_LEN`] characters of the body as the
/// error when the shape does not match.
pub fn parse_token_response(body: &str) -> Result<TokenSecret, String> {
	body.trim()
		.lines()
		.nth(2)
		.and_then(|line| line.split_once('='))
		.map(|(_, value)| value.trim())
		.filter(|value| !value.is_empty())
		.map(TokenSecret::new)
		.ok_or_else(|| snippet(body))
}

/// Returns at most [`SNIPPET_LEN`] characters of `body`.
pub fn snippet(body: &str) -> String {
	body.chars().take(SNIPPET_LEN).collect()
}

/// Tagged reading of a push endpoint success body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PushResponse {
	/// `id=<message id>`.
	MessageId(String),
	/// `Error=<reason>` (any key other than `id`).
	Failure(PushErrorCode),
	/// Anything that is not a single `key=value` pair.
	Malformed(String),
}
impl PushResponse {
	/// Parses a push reply body.
	pub fn parse(body: &str) -> Self {
		let mut parts = body.trim().split('=');
		let (Some(key), Some(value), None) = (parts.next(), parts.next(), parts.next()) else {
			return Self::Malformed(body.to_owned());
		};

		if key == "id" { Self::MessageId(value.to_owned()) } else { Self::Failure(value.into()) }
	}
}

/// Error codes documented for the push endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PushErrorCode {
	/// Too many messages sent by the sender.
	QuotaExceeded,
	/// Too many messages sent to this particular device.
	DeviceQuotaExceeded,
	/// Request lacked a registration id.
	MissingRegistration,
	/// Registration id is malformed.
	InvalidRegistration,
	/// Sender id does not match the one the device registered with.
	MismatchSenderId,
	/// Application was uninstalled or unregistered from the device.
	NotRegistered,
	/// Payload exceeds [`MAX_PAYLOAD_BYTES`].
	MessageTooBig,
	/// Request lacked a collapse key.
	MissingCollapseKey,
	/// Code this crate does not know.
	Other(String),
}
impl PushErrorCode {
	/// Returns the wire spelling of the code.
	pub fn as_str(&self) -> &str {
		match self {
			Self::QuotaExceeded => "QuotaExceeded",
			Self::DeviceQuotaExceeded => "DeviceQuotaExceeded",
			Self::MissingRegistration => "MissingRegistration",
			Self::InvalidRegistration => "InvalidRegistration",
			Self::MismatchSenderId => "MismatchSenderId",
			Self::NotRegistered => "NotRegistered",
			Self::MessageTooBig => "MessageTooBig",
			Self::MissingCollapseKey => "MissingCollapseKey",
			Self::Other(code) => code,
		}
	}

	/// Quota errors are retried with exponential backoff.
	pub fn is_quota(&self) -> bool {
		matches!(self, Self::QuotaExceeded | Self::DeviceQuotaExceeded)
	}

	/// The device registration can never succeed again.
	pub fn is_invalid_device(&self) -> bool {
		matches!(self, Self::InvalidRegistration | Self::NotRegistered)
	}
}
impl From<&str> for PushErrorCode {
	fn from(value: &str) -> Self {
		match value {
			"QuotaExceeded" => Self::QuotaExceeded,
			"DeviceQuotaExceeded" => Self::DeviceQuotaExceeded,
			"MissingRegistration" => Self::MissingRegistration,
			"InvalidRegistration" => Self::InvalidRegistration,
			"MismatchSenderId" => Self::MismatchSenderId,
			"NotRegistered" => Self::NotRegistered,
			"MessageTooBig" => Self::MessageTooBig,
			"MissingCollapseKey" => Self::MissingCollapseKey,
			other => Self::Other(other.to_owned()),
		}
	}
}
impl From<String> for PushErrorCode {
	fn from(value: String) -> Self {
		value.as_str().into()
	}
}
impl From<PushErrorCode> for String {
	fn from(value: PushErrorCode) -> Self {
		value.as_str().to_owned()
	}
}
impl FromStr for PushErrorCode {
	type Err = std::convert::Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(s.into())
	}
}
impl Display for PushErrorCode {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_comes_from_third_line() {
		let token = parse_token_response("line1\nline2\nToken=ABCDEF123\n")
			.expect("Three-line body should yield a token.");

		assert_eq!(token.expose(), "ABCDEF123");
	}

	#[test]
	fn client_login_body_yields_auth_value() {
		let token = parse_token_response("SID=sid-value\nLSID=lsid-value\nAuth=DQAAAGgA_auth\n")
			.expect("ClientLogin body should yield a token.");

		assert_eq!(token.expose(), "DQAAAGgA_auth");
	}

	#[test]
	fn short_bodies_report_a_truncated_snippet() {
		assert_eq!(parse_token_response("SID=a\nLSID=b\n"), Err("SID=a\nLSID=b\n".to_owned()));

		let html = format!("<!doctype html>{}", "x".repeat(200));
		let err = parse_token_response(&html).expect_err("HTML should not parse as a token.");

		assert_eq!(err.chars().count(), SNIPPET_LEN);
		assert!(html.starts_with(&err));
	}

	#[test]
	fn third_line_without_value_is_rejected() {
		assert!(parse_token_response("a=1\nb=2\nAuth=\n").is_err());
		assert!(parse_token_response("a=1\nb=2\nno-separator\n").is_err());
	}

	#[test]
	fn push_bodies_are_tagged() {
		assert_eq!(
			PushResponse::parse("id=0:1234567890\n"),
			PushResponse::MessageId("0:1234567890".into())
		);
		assert_eq!(
			PushResponse::parse("Error=InvalidRegistration"),
			PushResponse::Failure(PushErrorCode::InvalidRegistration)
		);
		assert_eq!(
			PushResponse::parse("Error=SomethingNew"),
			PushResponse::Failure(PushErrorCode::Other("SomethingNew".into()))
		);
	}

	#[test]
	fn push_bodies_without_a_single_pair_are_malformed() {
		assert_eq!(PushResponse::parse("garbage"), PushResponse::Malformed("garbage".into()));
		assert_eq!(PushResponse::parse("id=a=b"), PushResponse::Malformed("id=a=b".into()));
		assert_eq!(PushResponse::parse(""), PushResponse::Malformed(String::new()));
	}

	#[test]
	fn error_codes_classify() {
		assert!(PushErrorCode::from("DeviceQuotaExceeded").is_quota());
		assert!(PushErrorCode::from("NotRegistered").is_invalid_device());
		assert!(!PushErrorCode::from("MessageTooBig").is_quota());
		assert_eq!(PushErrorCode::from("MismatchSenderId").to_string(), "MismatchSenderId");
	}
}
