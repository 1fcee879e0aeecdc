//! Identity exchange client: cache-first on-behalf-of exchanges with a live fallback.

pub mod cache;

pub use cache::{CacheKey, TokenCache};

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientId, ScopeSet, TenantId, UserAssertion},
	credential::TokenRequestContext,
	error::ConfigError,
	provider::{ClientCredentialMaterial, IdentityProvider, OnBehalfOfRequest},
};

/// Performs on-behalf-of exchanges for one bound client identity and owns the
/// in-process token cache.
///
/// `lookup_cached` never performs network I/O; `exchange_live` always does. The
/// cache is shared mutable state synchronized internally, so one client can back
/// any number of concurrent resolve calls.
pub struct ExchangeClient {
	tenant: TenantId,
	client: ClientId,
	credential: ClientCredentialMaterial,
	provider: Arc<dyn IdentityProvider>,
	cache: TokenCache,
	exchange_guards: Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>,
}
impl ExchangeClient {
	/// Creates a client bound to the provided identity and provider boundary.
	pub fn new(
		tenant: TenantId,
		client: ClientId,
		credential: ClientCredentialMaterial,
		provider: Arc<dyn IdentityProvider>,
	) -> Self {
		Self {
			tenant,
			client,
			credential,
			provider,
			cache: TokenCache::default(),
			exchange_guards: Mutex::default(),
		}
	}

	/// Tenant the client identity is bound to.
	pub fn tenant(&self) -> &TenantId {
		&self.tenant
	}

	/// Bound confidential client identifier.
	pub fn client(&self) -> &ClientId {
		&self.client
	}

	/// Returns the cached token for the request, treating expired entries as a miss.
	///
	/// Completes immediately; a valid hit must never trigger a live exchange.
	pub fn lookup_cached(
		&self,
		ctx: &TokenRequestContext,
		assertion: &UserAssertion,
	) -> Option<AccessToken> {
		let key = self.cache_key(ctx.scope(), assertion);

		self.cache.get(&key, OffsetDateTime::now_utc())
	}

	/// Performs a live exchange against the identity provider and caches the result.
	///
	/// Concurrent misses for the same key coalesce onto one provider call: the
	/// per-key guard serializes them and the cache is re-checked once the guard is
	/// held. Failed exchanges propagate as-is and never populate the cache.
	pub async fn exchange_live(
		&self,
		ctx: &TokenRequestContext,
		assertion: &UserAssertion,
	) -> Result<AccessToken> {
		let scope = ctx.scope();

		if scope.is_empty() {
			return Err(ConfigError::EmptyScopes.into());
		}

		let key = self.cache_key(scope, assertion);
		let guard = self.exchange_guard(&key);
		let _singleflight = guard.lock().await;

		if let Some(token) = self.cache.get(&key, OffsetDateTime::now_utc()) {
			return Ok(token);
		}

		let token = self
			.provider
			.acquire_on_behalf_of(OnBehalfOfRequest {
				tenant: &self.tenant,
				client: &self.client,
				credential: &self.credential,
				assertion,
				scope,
			})
			.await?;

		self.cache.insert(key, token.clone());

		Ok(token)
	}

	fn cache_key(&self, scope: &ScopeSet, assertion: &UserAssertion) -> CacheKey {
		CacheKey::new(&self.tenant, &self.client, assertion, scope)
	}

	fn exchange_guard(&self, key: &CacheKey) -> Arc<AsyncMutex<()>> {
		let mut guards = self.exchange_guards.lock();

		guards.entry(key.clone()).or_insert_with(|| Arc::new(AsyncMutex::new(()))).clone()
	}
}
impl Debug for ExchangeClient {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ExchangeClient")
			.field("tenant", &self.tenant)
			.field("client", &self.client)
			.field("cached_entries", &self.cache.len())
			.finish()
	}
}
