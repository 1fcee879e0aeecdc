//! Optional observability helpers for credential resolution.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `obo_credential.resolve` with the
//!   `credential` (strategy) and `stage` (call site) fields.
//! - Enable `metrics` to increment the `obo_credential_resolve_total` counter for every
//!   attempt/cache-hit/exchange/failure, labeled by `credential` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Credential strategies observed during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CredentialKind {
	/// Static prefetched-token credential.
	StaticToken,
	/// On-behalf-of exchange credential.
	OnBehalfOf,
}
impl CredentialKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialKind::StaticToken => "static_token",
			CredentialKind::OnBehalfOf => "on_behalf_of",
		}
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each resolve attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResolveOutcome {
	/// Entry to a resolve call.
	Attempt,
	/// Local static token returned without touching the exchange layer.
	Static,
	/// Served from the exchange cache; no live exchange occurred.
	CacheHit,
	/// Live exchange performed and the cache was populated.
	Exchanged,
	/// Failure propagated back to the caller.
	Failure,
}
impl ResolveOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ResolveOutcome::Attempt => "attempt",
			ResolveOutcome::Static => "static",
			ResolveOutcome::CacheHit => "cache_hit",
			ResolveOutcome::Exchanged => "exchanged",
			ResolveOutcome::Failure => "failure",
		}
	}
}
impl Display for ResolveOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
