//! `c2dm_operation_total` counter.
//!
//! One increment per outcome: a send records `attempt` on entry, `retry` for every backoff sleep
//! taken after a `503` or quota reply, then exactly one of `success` or `failure`. Token fetches
//! record `attempt` plus their final outcome and never `retry`. Cache hits record nothing.

// self
use crate::obs::{OperationKind, OperationOutcome};

/// Counter name exported to the global `metrics` recorder.
pub const OPERATION_COUNTER: &str = "c2dm_operation_total";

/// Increments [`OPERATION_COUNTER`] labeled with `operation` and `outcome`.
///
/// Does nothing unless the `metrics` feature is enabled.
pub fn record_outcome(kind: OperationKind, outcome: OperationOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			OPERATION_COUNTER,
			"operation" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn labels_match_exported_names() {
		assert_eq!(OPERATION_COUNTER, "c2dm_operation_total");
		assert_eq!(OperationKind::TokenFetch.as_str(), "token_fetch");
		assert_eq!(OperationOutcome::Retry.to_string(), "retry");
	}

	#[test]
	fn recording_without_a_recorder_is_harmless() {
		let outcomes = [OperationOutcome::Attempt, OperationOutcome::Retry, OperationOutcome::Failure];

		for outcome in outcomes {
			record_outcome(OperationKind::Send, outcome);
		}
	}
}
