//! Credential material accepted by the client.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Account type sent to the identity endpoint.
pub const ACCOUNT_TYPE: &str = "HOSTED_OR_GOOGLE";
/// Service identifier for C2DM ClientLogin tokens.
pub const SERVICE: &str = "ac2dm";

/// How the client authenticates against the push endpoint.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
	/// Account identifier and secret exchanged for a token on first use.
	Password {
		/// Account identifier (usually the sender's e-mail address).
		account: String,
		/// Account secret.
		secret: TokenSecret,
	},
	/// Pre-issued ClientLogin token; no identity round-trip is needed.
	Token(TokenSecret),
}
impl Credentials {
	/// Builds account/secret credentials.
	pub fn password(account: impl Into<String>, secret: impl Into<TokenSecret>) -> Self {
		Self::Password { account: account.into(), secret: secret.into() }
	}

	/// Builds token credentials.
	pub fn token(token: impl Into<TokenSecret>) -> Self {
		Self::Token(token.into())
	}

	/// Token supplied up front, if any.
	pub fn initial_token(&self) -> Option<&TokenSecret> {
		match self {
			Self::Token(token) => Some(token),
			Self::Password { .. } => None,
		}
	}

	/// Form fields posted to the identity endpoint, or `None` for token credentials.
	pub(crate) fn login_form(&self, source: &str) -> Option<Vec<(String, String)>> {
		let Self::Password { account, secret } = self else {
			return None;
		};

		Some(vec![
			("accountType".into(), ACCOUNT_TYPE.into()),
			("Email".into(), account.clone()),
			("Passwd".into(), secret.expose().to_owned()),
			("service".into(), SERVICE.into()),
			("source".into(), source.to_owned()),
		])
	}
}
impl Debug for Credentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Password { account, .. } => f
				.debug_struct("Credentials::Password")
				.field("account", account)
				.field("secret", &"<redacted>")
				.finish(),
			Self::Token(_) => f.debug_tuple("Credentials::Token").field(&"<redacted>").finish(),
		}
	}
}
