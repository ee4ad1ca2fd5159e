//! Push delivery with bounded retries.
//!
//! [`C2dm::send`] fetches (or reuses) the client token, submits the notification, and classifies
//! the reply. Only the two server-signaled transient conditions are retried in place: a `503`
//! (waiting for `Retry-After` when the service provides a positive one, else `2^(attempt-1)`
//! seconds) and a `QuotaExceeded`/`DeviceQuotaExceeded` body (always exponential). Everything
//! else ends the send immediately. The loop never sleeps after the final permitted attempt.

// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	dispatch::{Backoff, C2dm, Notification},
	error::TransportError,
	http::{C2dmHttpClient, FormRequest, HttpResponse},
	obs::{self, OperationKind, OperationOutcome, OperationSpan},
	protocol::{PushErrorCode, PushResponse},
};

/// What the dispatcher does after one push reply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Step {
	/// The service accepted the message.
	Delivered(String),
	/// Transient failure; wait `delay` and resubmit.
	Retry { delay: Duration, reason: String },
}

impl<C> C2dm<C>
where
	C: ?Sized + C2dmHttpClient,
{
	/// Sends `notification` and returns the message id assigned by the push service.
	pub async fn send(&self, notification: &Notification) -> Result<String> {
		const KIND: OperationKind = OperationKind::Send;

		let span = OperationSpan::new(KIND, "push");

		obs::record_outcome(KIND, OperationOutcome::Attempt);

		let result = span.instrument(self.dispatch(notification)).await;

		match &result {
			Ok(_) => {
				self.metrics.record_success();
				obs::record_outcome(KIND, OperationOutcome::Success);
			},
			Err(_) => {
				self.metrics.record_failure();
				obs::record_outcome(KIND, OperationOutcome::Failure);
			},
		}

		result
	}

	/// Convenience wrapper around [`C2dm::send`] taking the request parts directly.
	pub async fn send_notification<I, K, V>(
		&self,
		device_id: &str,
		collapse_key: &str,
		data: I,
	) -> Result<String>
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<String>,
	{
		let notification = Notification::new(device_id, collapse_key).extend_data(data);

		self.send(&notification).await
	}

	async fn dispatch(&self, notification: &Notification) -> Result<String> {
		let token = self.get_token().await?;
		let request =
			FormRequest::new(self.config.endpoints.push.clone(), notification.form_fields())
				.with_authorization(token.clone());
		let max_attempts = self.config.max_attempts;
		let mut attempt = 1;

		while attempt <= max_attempts {
			self.metrics.record_request();

			let response = self
				.http_client
				.post_form(request.clone())
				.await
				.map_err(|e| Error::from(TransportError::network(e)))?;
			let (delay, reason) = match classify(response, attempt, &self.backoff, &token)? {
				Step::Delivered(message_id) => return Ok(message_id),
				Step::Retry { delay, reason } => (delay, reason),
			};

			if attempt == max_attempts {
				break;
			}

			obs::trace_retry(attempt, delay, &reason);
			obs::record_outcome(OperationKind::Send, OperationOutcome::Retry);
			self.metrics.record_retry();
			self.sleeper.sleep(delay).await;

			attempt += 1;
		}

		Err(Error::MaxAttempts { attempts: max_attempts })
	}
}

/// Maps one push reply to the next step of the send loop.
pub(crate) fn classify(
	response: HttpResponse,
	attempt: u32,
	backoff: &Backoff,
	token: &TokenSecret,
) -> Result<Step> {
	match response.status {
		401 => return Err(Error::InvalidToken { token: token.clone() }),
		503 =>
			return Ok(Step::Retry {
				delay: backoff.for_unavailable(attempt, response.retry_after),
				reason: "service unavailable".into(),
			}),
		_ if !response.is_success() =>
			return Err(TransportError::UnexpectedStatus { status: response.status }.into()),
		_ => (),
	}

	match PushResponse::parse(&response.body) {
		PushResponse::MessageId(message_id) => Ok(Step::Delivered(message_id)),
		PushResponse::Malformed(body) => Err(Error::UnknownResponse { body }),
		PushResponse::Failure(code) if code.is_invalid_device() =>
			Err(Error::InvalidDevice { code }),
		PushResponse::Failure(PushErrorCode::MessageTooBig) => Err(Error::MessageTooBig),
		PushResponse::Failure(code) if code.is_quota() =>
			Ok(Step::Retry { delay: backoff.delay(attempt), reason: code.to_string() }),
		PushResponse::Failure(_) => Err(Error::UnknownResponse { body: response.body }),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::_preludet::*;

	fn classify_default(response: HttpResponse, attempt: u32) -> Result<Step> {
		classify(response, attempt, &Backoff::default(), &TokenSecret::new("tok"))
	}

	#[test]
	fn classify_success_and_terminal_replies() {
		assert_eq!(
			classify_default(HttpResponse::new(200, "id=0:42\n"), 1).expect("Success expected."),
			Step::Delivered("0:42".into())
		);
		assert!(matches!(
			classify_default(HttpResponse::new(401, ""), 1),
			Err(Error::InvalidToken { ref token }) if token.expose() == "tok"
		));
		assert!(matches!(
			classify_default(HttpResponse::new(500, ""), 1),
			Err(Error::Transport(TransportError::UnexpectedStatus { status: 500 }))
		));
		assert!(matches!(
			classify_default(HttpResponse::new(200, "Error=NotRegistered"), 1),
			Err(Error::InvalidDevice { code: PushErrorCode::NotRegistered })
		));
		assert!(matches!(
			classify_default(HttpResponse::new(200, "Error=MessageTooBig"), 1),
			Err(Error::MessageTooBig)
		));
		assert!(matches!(
			classify_default(HttpResponse::new(200, "Error=MismatchSenderId"), 1),
			Err(Error::UnknownResponse { ref body }) if body == "Error=MismatchSenderId"
		));
		assert!(matches!(
			classify_default(HttpResponse::new(200, "<html>"), 1),
			Err(Error::UnknownResponse { ref body }) if body == "<html>"
		));
	}

	#[test]
	fn classify_retryable_replies() {
		let unavailable = HttpResponse::new(503, "").with_retry_after(Some(Duration::seconds(9)));

		assert!(matches!(
			classify_default(unavailable, 1),
			Ok(Step::Retry { delay, .. }) if delay == Duration::seconds(9)
		));
		assert!(matches!(
			classify_default(HttpResponse::new(503, ""), 3),
			Ok(Step::Retry { delay, .. }) if delay == Duration::seconds(4)
		));

		// Quota replies ignore Retry-After.
		let quota = HttpResponse::new(200, "Error=QuotaExceeded")
			.with_retry_after(Some(Duration::seconds(30)));

		assert!(matches!(
			classify_default(quota, 2),
			Ok(Step::Retry { delay, ref reason })
				if delay == Duration::seconds(2) && reason == "QuotaExceeded"
		));
	}

	#[tokio::test]
	async fn send_builds_authorized_form_request() {
		let (client, http_client, _) =
			build_scripted_client(token_config("ABCDEF123", 5), [ok("id=0:1234567890")]);
		let message_id = client
			.send(&Notification::new("device-1", "updates").with_data("alert", "hi"))
			.await
			.expect("Send should succeed.");
		let request = http_client.requests().remove(0);

		assert_eq!(message_id, "0:1234567890");
		assert_eq!(request.url.as_str(), TEST_PUSH_URL);
		assert_eq!(
			request.authorization.as_ref().map(TokenSecret::authorization_header),
			Some("GoogleLogin auth=ABCDEF123".to_owned())
		);
		assert_eq!(request.field("registration_id"), Some("device-1"));
		assert_eq!(request.field("collapse_key"), Some("updates"));
		assert_eq!(request.field("data.alert"), Some("hi"));
		assert_eq!(client.metrics.successes(), 1);
	}

	#[tokio::test]
	async fn first_send_logs_in_then_reuses_the_token() {
		let (client, http_client, _) = build_scripted_client(
			password_config(5),
			[ok("SID=s\nLSID=l\nAuth=fresh\n"), ok("id=1"), ok("id=2")],
		);

		let first = client
			.send_notification("device-1", "updates", [("alert", "hi")])
			.await
			.expect("First send should succeed.");
		let second = client
			.send_notification("device-1", "updates", Vec::<(String, String)>::new())
			.await
			.expect("Second send should succeed.");

		assert_eq!(first, "1");
		assert_eq!(second, "2");

		let requests = http_client.requests();

		assert_eq!(requests.len(), 3);
		assert_eq!(requests[0].url.as_str(), TEST_IDENTITY_URL);
		assert_eq!(requests[2].authorization, Some(TokenSecret::new("fresh")));
		assert_eq!(client.metrics.token_fetches(), 1);
	}

	#[tokio::test]
	async fn token_fetch_failure_skips_the_push() {
		let (client, http_client, _) = build_scripted_client(
			password_config(5),
			[Ok(HttpResponse::new(403, "Error=CaptchaRequired"))],
		);
		let err = client
			.send(&Notification::new("d", "k"))
			.await
			.expect_err("Rejected login should fail the send.");

		assert!(matches!(err, Error::TokenFetch { .. }));
		assert_eq!(http_client.calls(), 1);
		assert_eq!(client.metrics.requests(), 0);
		assert_eq!(client.metrics.failures(), 1);
	}

	#[tokio::test]
	async fn single_attempt_budget_never_sleeps() {
		let (client, http_client, sleeper) =
			build_scripted_client(token_config("tok", 1), [unavailable(None)]);
		let err = client.send(&Notification::new("d", "k")).await.expect_err("Budget is one.");

		assert!(matches!(err, Error::MaxAttempts { attempts: 1 }));
		assert_eq!(http_client.calls(), 1);
		assert!(sleeper.delays().is_empty());
	}
}
