//! Async client for the Android C2DM push service: cached ClientLogin tokens, typed delivery
//! failures, and bounded exponential backoff in one small crate.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod obs;
pub mod protocol;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for tests; enabled via `cfg(test)` or the `test` crate
	//! feature.

	pub use crate::_prelude::*;

	// std
	use std::collections::VecDeque;
	// crates.io
	use parking_lot::Mutex;
	// self
	#[cfg(feature = "reqwest")] use crate::dispatch::ReqwestC2dm;
	use crate::{
		config::{ClientConfig, Endpoints},
		dispatch::{C2dm, SleepFuture, Sleeper},
		http::{C2dmHttpClient, FormRequest, HttpFuture, HttpResponse},
	};

	/// Identity endpoint used by scripted transports.
	pub const TEST_IDENTITY_URL: &str = "https://identity.test/accounts/ClientLogin";
	/// Push endpoint used by scripted transports.
	pub const TEST_PUSH_URL: &str = "https://push.test/c2dm/send";

	/// Transport failure produced by [`ScriptedHttpClient`].
	#[derive(Debug, ThisError)]
	#[error("Scripted transport failure: {0}.")]
	pub struct ScriptedTransportError(pub String);

	/// One scripted reply.
	pub type ScriptedReply = Result<HttpResponse, ScriptedTransportError>;

	/// In-process transport that replays queued replies and records every request it receives.
	#[derive(Debug, Default)]
	pub struct ScriptedHttpClient {
		replies: Mutex<VecDeque<ScriptedReply>>,
		requests: Mutex<Vec<FormRequest>>,
	}
	impl ScriptedHttpClient {
		/// Builds a transport that answers with `replies` in order.
		pub fn new(replies: impl IntoIterator<Item = ScriptedReply>) -> Self {
			Self { replies: Mutex::new(replies.into_iter().collect()), requests: Default::default() }
		}

		/// Returns a snapshot of every request received so far.
		pub fn requests(&self) -> Vec<FormRequest> {
			self.requests.lock().clone()
		}

		/// Number of requests received so far.
		pub fn calls(&self) -> usize {
			self.requests.lock().len()
		}
	}
	impl C2dmHttpClient for ScriptedHttpClient {
		type TransportError = ScriptedTransportError;

		fn post_form(&self, request: FormRequest) -> HttpFuture<'_, Self::TransportError> {
			self.requests.lock().push(request);

			let reply = self.replies.lock().pop_front().unwrap_or_else(|| {
				Err(ScriptedTransportError("no scripted reply left".into()))
			});

			Box::pin(async move { reply })
		}
	}

	/// Sleeper that records requested delays and returns immediately.
	#[derive(Debug, Default)]
	pub struct RecordingSleeper {
		delays: Mutex<Vec<Duration>>,
	}
	impl RecordingSleeper {
		/// Returns every delay requested so far.
		pub fn delays(&self) -> Vec<Duration> {
			self.delays.lock().clone()
		}
	}
	impl Sleeper for RecordingSleeper {
		fn sleep(&self, delay: Duration) -> SleepFuture<'_> {
			self.delays.lock().push(delay);

			Box::pin(async {})
		}
	}

	/// Builds a `200 OK` reply carrying `body`.
	pub fn ok(body: &str) -> ScriptedReply {
		Ok(HttpResponse::new(200, body))
	}

	/// Builds a reply with an arbitrary status and empty body.
	pub fn status(code: u16) -> ScriptedReply {
		Ok(HttpResponse::new(code, ""))
	}

	/// Builds a `503` reply with an optional `Retry-After` hint in seconds.
	pub fn unavailable(retry_after_secs: Option<i64>) -> ScriptedReply {
		Ok(HttpResponse::new(503, "")
			.with_retry_after(retry_after_secs.map(Duration::seconds)))
	}

	/// Endpoints pointing at the scripted hosts.
	pub fn test_endpoints() -> Endpoints {
		Endpoints::new(
			Url::parse(TEST_IDENTITY_URL).expect("Failed to parse scripted identity URL."),
			Url::parse(TEST_PUSH_URL).expect("Failed to parse scripted push URL."),
		)
	}

	/// Endpoints serving the production paths from `base_url`, for example a mock server root.
	pub fn endpoints_at(base_url: &str) -> Endpoints {
		let base_url = base_url.trim_end_matches('/');

		Endpoints::parse(
			&format!("{base_url}/accounts/ClientLogin"),
			&format!("{base_url}/c2dm/send"),
		)
		.expect("Failed to parse endpoints under the test base URL.")
	}

	/// Builds a client backed by the default reqwest transport.
	#[cfg(feature = "reqwest")]
	pub fn build_reqwest_test_client(config: ClientConfig) -> ReqwestC2dm {
		C2dm::new(config).expect("Failed to build reqwest-backed test client.")
	}

	/// Token-backed configuration targeting the scripted endpoints.
	pub fn token_config(token: &str, max_attempts: u32) -> ClientConfig {
		ClientConfig::builder()
			.token(token)
			.source("acme-push-tests-1")
			.max_attempts(max_attempts)
			.endpoints(test_endpoints())
			.build()
			.expect("Failed to build token-backed test configuration.")
	}

	/// Credential-backed configuration targeting the scripted endpoints.
	pub fn password_config(max_attempts: u32) -> ClientConfig {
		ClientConfig::builder()
			.account("ops@example.com")
			.secret("hunter2")
			.source("acme-push-tests-1")
			.max_attempts(max_attempts)
			.endpoints(test_endpoints())
			.build()
			.expect("Failed to build credential-backed test configuration.")
	}

	/// Builds a client around a scripted transport and a recording sleeper.
	pub fn build_scripted_client(
		config: ClientConfig,
		replies: impl IntoIterator<Item = ScriptedReply>,
	) -> (C2dm<ScriptedHttpClient>, Arc<ScriptedHttpClient>, Arc<RecordingSleeper>) {
		let http_client = Arc::new(ScriptedHttpClient::new(replies));
		let sleeper = Arc::new(RecordingSleeper::default());
		let client = C2dm::with_http_client(config, http_client.clone())
			.with_sleeper(sleeper.clone());

		(client, http_client, sleeper)
	}
}

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::Duration;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, serde_json as _};

pub use crate::{
	auth::{Credentials, TokenSecret},
	config::{ClientConfig, Endpoints},
	dispatch::{C2dm, Notification},
	error::{Error, Result},
};
