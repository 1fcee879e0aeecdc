// std
use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
};
// crates.io
use parking_lot::Mutex;
use time::{Duration, OffsetDateTime};
// self
use obo_credential::{
	auth::AccessToken,
	credential::{OnBehalfOfFlowCredential, TokenCredential, TokenRequestContext},
	error::{AuthenticationError, AuthenticationErrorKind, Error},
	provider::{IdentityProvider, OnBehalfOfRequest, ProviderFuture},
};

struct ScriptedProvider {
	calls: AtomicUsize,
	script: Mutex<VecDeque<Result<AccessToken, AuthenticationError>>>,
}
impl ScriptedProvider {
	fn new(
		script: impl IntoIterator<Item = Result<AccessToken, AuthenticationError>>,
	) -> Arc<Self> {
		Arc::new(Self {
			calls: AtomicUsize::new(0),
			script: Mutex::new(script.into_iter().collect()),
		})
	}

	fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl IdentityProvider for ScriptedProvider {
	fn acquire_on_behalf_of<'a>(
		&'a self,
		_request: OnBehalfOfRequest<'a>,
	) -> ProviderFuture<'a, AccessToken> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let next = self.script.lock().pop_front();

		Box::pin(async move {
			match next {
				Some(Ok(token)) => Ok(token),
				Some(Err(err)) => Err(err.into()),
				None => panic!("Provider script exhausted; an unexpected exchange occurred."),
			}
		})
	}
}

fn token(value: &str, ttl: Duration) -> AccessToken {
	AccessToken::new(value, OffsetDateTime::now_utc() + ttl)
		.expect("Token fixture should be valid.")
}

fn credential_with(provider: Arc<ScriptedProvider>) -> OnBehalfOfFlowCredential {
	OnBehalfOfFlowCredential::builder()
		.tenant_id("tenant-1")
		.client_id("client-1")
		.client_secret("secret-1")
		.token_string("assertion-1")
		.provider(provider)
		.build()
		.expect("On-behalf-of credential should build.")
}

fn request(scopes: &[&str]) -> TokenRequestContext {
	TokenRequestContext::new(scopes.iter().copied())
		.expect("Request fixture should be valid.")
}

#[tokio::test]
async fn first_resolve_exchanges_then_serves_from_cache() {
	let provider = ScriptedProvider::new([Ok(token("tok-1", Duration::hours(1)))]);
	let credential = credential_with(provider.clone());
	let ctx = request(&["downstream/.default"]);
	let first = credential.resolve(&ctx).await.expect("Initial resolution should succeed.");

	assert_eq!(first.token.expose(), "tok-1");
	assert_eq!(provider.calls(), 1);

	let second = credential.resolve(&ctx).await.expect("Cached resolution should succeed.");

	assert_eq!(second.token.expose(), "tok-1");
	assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn expired_entry_reads_as_miss_and_triggers_one_more_exchange() {
	let provider = ScriptedProvider::new([
		Ok(token("tok-stale", Duration::seconds(-1))),
		Ok(token("tok-fresh", Duration::hours(1))),
	]);
	let credential = credential_with(provider.clone());
	let ctx = request(&["downstream/.default"]);
	let first = credential.resolve(&ctx).await.expect("Initial resolution should succeed.");

	// A live exchange returns whatever the provider issued, even if already stale.
	assert_eq!(first.token.expose(), "tok-stale");
	assert_eq!(provider.calls(), 1);

	let second = credential
		.resolve(&ctx)
		.await
		.expect("Resolution past the cached expiry should re-exchange.");

	assert_eq!(second.token.expose(), "tok-fresh");
	assert_eq!(provider.calls(), 2);

	let third = credential.resolve(&ctx).await.expect("Refreshed entry should now be cached.");

	assert_eq!(third.token.expose(), "tok-fresh");
	assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn scope_order_does_not_fragment_the_cache() {
	let provider = ScriptedProvider::new([Ok(token("tok-1", Duration::hours(1)))]);
	let credential = credential_with(provider.clone());
	let first = credential
		.resolve(&request(&["api.read", "api.write"]))
		.await
		.expect("Initial resolution should succeed.");
	let second = credential
		.resolve(&request(&["api.write", "api.read"]))
		.await
		.expect("Reordered scopes should hit the same cache entry.");

	assert_eq!(first.token.expose(), "tok-1");
	assert_eq!(second.token.expose(), "tok-1");
	assert_eq!(provider.calls(), 1);
}

#[tokio::test]
async fn distinct_scopes_exchange_separately() {
	let provider = ScriptedProvider::new([
		Ok(token("tok-read", Duration::hours(1))),
		Ok(token("tok-write", Duration::hours(1))),
	]);
	let credential = credential_with(provider.clone());
	let read = credential
		.resolve(&request(&["api.read"]))
		.await
		.expect("Read-scope resolution should succeed.");
	let write = credential
		.resolve(&request(&["api.write"]))
		.await
		.expect("Write-scope resolution should succeed.");

	assert_eq!(read.token.expose(), "tok-read");
	assert_eq!(write.token.expose(), "tok-write");
	assert_eq!(provider.calls(), 2);

	let read_again = credential
		.resolve(&request(&["api.read"]))
		.await
		.expect("Read-scope entry should still be cached.");

	assert_eq!(read_again.token.expose(), "tok-read");
	assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn provider_rejection_propagates_and_is_not_cached() {
	let provider = ScriptedProvider::new([
		Err(AuthenticationError::new(
			AuthenticationErrorKind::InvalidAssertion,
			"invalid_grant",
			"assertion audience mismatch",
		)),
		Ok(token("tok-retry", Duration::hours(1))),
	]);
	let credential = credential_with(provider.clone());
	let ctx = request(&["downstream/.default"]);
	let err = credential.resolve(&ctx).await.expect_err("Provider rejection should surface.");

	assert!(matches!(err, Error::Authentication(_)));
	assert_eq!(provider.calls(), 1);

	let retried = credential
		.resolve(&ctx)
		.await
		.expect("A later resolution should retry instead of replaying the failure.");

	assert_eq!(retried.token.expose(), "tok-retry");
	assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn concurrent_first_resolves_coalesce_onto_one_exchange() {
	let provider = ScriptedProvider::new([Ok(token("tok-1", Duration::hours(1)))]);
	let credential = credential_with(provider.clone());
	let ctx = request(&["downstream/.default"]);
	let (first, second) = tokio::join!(credential.resolve(&ctx), credential.resolve(&ctx));

	assert_eq!(
		first.expect("First concurrent resolution should succeed.").token.expose(),
		"tok-1"
	);
	assert_eq!(
		second.expect("Second concurrent resolution should succeed.").token.expose(),
		"tok-1"
	);
	assert_eq!(provider.calls(), 1);
}
