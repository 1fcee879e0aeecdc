//! In-process token cache keyed by (tenant, client, assertion, scope set).

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientId, ScopeSet, TenantId, UserAssertion},
};

/// Unique key identifying a cached on-behalf-of exchange result.
///
/// The assertion and scope components are digest fingerprints, so the key is
/// deterministic, collision-resistant across (tenant, client, assertion,
/// scope-set) tuples, and independent of the order scopes were supplied in.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheKey {
	/// Tenant component.
	pub tenant: TenantId,
	/// Client component.
	pub client: ClientId,
	/// Fingerprint of the inbound user assertion.
	pub assertion_fingerprint: String,
	/// Fingerprint of the normalized scope set.
	pub scope_fingerprint: String,
}
impl CacheKey {
	/// Derives the key for the provided identity, assertion, and scopes.
	pub fn new(
		tenant: &TenantId,
		client: &ClientId,
		assertion: &UserAssertion,
		scope: &ScopeSet,
	) -> Self {
		Self {
			tenant: tenant.clone(),
			client: client.clone(),
			assertion_fingerprint: assertion.fingerprint(),
			scope_fingerprint: scope.fingerprint(),
		}
	}
}

type CacheMap = RwLock<HashMap<CacheKey, AccessToken>>;

/// Thread-safe in-process store for exchange results.
///
/// Entries are never actively evicted; expiry is evaluated on every read and an
/// expired entry is simply overwritten by the next successful exchange.
#[derive(Debug, Default)]
pub struct TokenCache(CacheMap);
impl TokenCache {
	/// Returns the non-expired entry for `key`, treating expired entries as a miss.
	pub fn get(&self, key: &CacheKey, now: OffsetDateTime) -> Option<AccessToken> {
		self.0.read().get(key).filter(|token| !token.is_expired_at(now)).cloned()
	}

	/// Inserts or replaces the entry for `key`.
	pub fn insert(&self, key: CacheKey, token: AccessToken) {
		self.0.write().insert(key, token);
	}

	/// Number of entries currently held, expired ones included.
	pub fn len(&self) -> usize {
		self.0.read().len()
	}

	/// Returns `true` when no entry has ever been stored.
	pub fn is_empty(&self) -> bool {
		self.0.read().is_empty()
	}
}
