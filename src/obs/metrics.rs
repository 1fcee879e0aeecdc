// self
use crate::obs::{CredentialKind, ResolveOutcome};

/// Records a resolve outcome via the global metrics recorder (when enabled).
pub fn record_resolve_outcome(kind: CredentialKind, outcome: ResolveOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"obo_credential_resolve_total",
			"credential" => kind.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = (kind, outcome);
	}
}
