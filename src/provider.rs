//! Identity-provider boundary consumed by the exchange client.
//!
//! The trait is this crate's only seam to an identity-provider client stack.
//! Certificate/secret parsing, JWT signing, and HTTP transport configuration all
//! live behind it; the core hands over plain values and receives either a token
//! or a classified [`AuthenticationError`](crate::error::AuthenticationError).

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ClientId, ScopeSet, TenantId, TokenSecret, UserAssertion},
};

/// Deferred provider result: completes with exactly one token or an error.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Client library boundary performing the actual network exchange.
///
/// Implementations must be `Send + Sync` so a single provider can back many
/// concurrent resolve calls. The crate does not retry a failed exchange, define
/// timeouts, or abort abandoned calls; all of that is the implementation's
/// (or its transport's) responsibility.
pub trait IdentityProvider
where
	Self: Send + Sync,
{
	/// Exchanges the user assertion plus the client identity for a downstream token.
	fn acquire_on_behalf_of<'a>(
		&'a self,
		request: OnBehalfOfRequest<'a>,
	) -> ProviderFuture<'a, AccessToken>;
}

/// Confidential-client authentication material.
///
/// Certificate-based clients supply a pre-signed RFC 7523 client assertion;
/// loading the certificate and signing the assertion happen outside this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClientCredentialMaterial {
	/// Shared client secret.
	Secret(TokenSecret),
	/// Pre-signed JWT client assertion derived from a client certificate.
	SignedAssertion(TokenSecret),
}

/// Borrowed view of one on-behalf-of exchange request.
#[derive(Clone, Debug)]
pub struct OnBehalfOfRequest<'a> {
	/// Tenant the confidential client belongs to.
	pub tenant: &'a TenantId,
	/// Confidential client identifier.
	pub client: &'a ClientId,
	/// Client authentication material.
	pub credential: &'a ClientCredentialMaterial,
	/// Inbound assertion naming the delegated identity.
	pub assertion: &'a UserAssertion,
	/// Scopes requested for the downstream token.
	pub scope: &'a ScopeSet,
}
