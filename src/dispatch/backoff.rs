//! Backoff timing and the sleeping seam used between push attempts.

// self
use crate::_prelude::*;

/// Boxed future returned by [`Sleeper::sleep`].
pub type SleepFuture<'a> = Pin<Box<dyn Future<Output = ()> + 'a + Send>>;

/// Suspends the current send between attempts.
pub trait Sleeper
where
	Self: Send + Sync,
{
	/// Resolves once `delay` has elapsed.
	fn sleep(&self, delay: Duration) -> SleepFuture<'_>;
}

/// Default sleeper backed by the tokio timer.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleeper;
impl Sleeper for TokioSleeper {
	fn sleep(&self, delay: Duration) -> SleepFuture<'_> {
		let delay = std::time::Duration::try_from(delay).unwrap_or_default();

		Box::pin(tokio::time::sleep(delay))
	}
}

/// Exponential backoff: `base * 2^(attempt - 1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Backoff {
	/// Delay before the second attempt.
	pub base: Duration,
}
impl Backoff {
	const MAX_SHIFT: u32 = 30;

	/// Delay after a failed `attempt` (1-based).
	pub fn delay(&self, attempt: u32) -> Duration {
		let shift = attempt.saturating_sub(1).min(Self::MAX_SHIFT);

		self.base.saturating_mul(1_i32 << shift)
	}

	/// Delay after a `503` reply: a positive `Retry-After` wins over the exponential delay.
	pub fn for_unavailable(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
		retry_after.filter(|hint| hint.is_positive()).unwrap_or_else(|| self.delay(attempt))
	}
}
impl Default for Backoff {
	fn default() -> Self {
		Self { base: Duration::SECOND }
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn delays_double_per_attempt() {
		let backoff = Backoff::default();
		let delays = (1..=5).map(|attempt| backoff.delay(attempt)).collect::<Vec<_>>();

		assert_eq!(delays, [1, 2, 4, 8, 16].map(Duration::seconds));
	}

	#[test]
	fn huge_attempts_do_not_overflow() {
		let backoff = Backoff::default();

		assert_eq!(backoff.delay(0), Duration::SECOND);
		assert_eq!(backoff.delay(u32::MAX), Duration::seconds(1 << 30));
	}

	#[test]
	fn unavailable_prefers_positive_retry_after() {
		let backoff = Backoff::default();

		assert_eq!(backoff.for_unavailable(3, Some(Duration::seconds(7))), Duration::seconds(7));
		assert_eq!(backoff.for_unavailable(3, Some(Duration::ZERO)), Duration::seconds(4));
		assert_eq!(backoff.for_unavailable(2, None), Duration::seconds(2));
	}

	#[tokio::test]
	async fn tokio_sleeper_tolerates_negative_delays() {
		TokioSleeper.sleep(Duration::seconds(-1)).await;
	}
}
