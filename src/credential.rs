//! Polymorphic credential contract and the request context passed to `resolve`.

pub mod on_behalf_of;
pub mod static_token;

mod validate;

pub use on_behalf_of::{OnBehalfOfFlowCredential, OnBehalfOfFlowCredentialBuilder};
pub use static_token::{StaticTokenCredential, StaticTokenCredentialBuilder};

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ScopeSet, ScopeValidationError},
};

/// Deferred resolution result: completes with exactly one token or an error.
pub type CredentialFuture<'a> = Pin<Box<dyn Future<Output = Result<AccessToken>> + 'a + Send>>;

/// Capability shared by every credential strategy.
///
/// Implementations are flat structs holding only the state their strategy needs.
/// `resolve` never mutates observable credential state; the on-behalf-of variant
/// updates only its internal exchange cache.
pub trait TokenCredential
where
	Self: Send + Sync,
{
	/// Resolves an access token for the requested scopes.
	fn resolve<'a>(&'a self, ctx: &'a TokenRequestContext) -> CredentialFuture<'a>;
}

/// A scoped request for a token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRequestContext {
	scope: ScopeSet,
}
impl TokenRequestContext {
	/// Creates a request context from the provided scopes.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Ok(Self { scope: ScopeSet::new(scopes)? })
	}

	/// Creates a request context from an already-normalized scope set.
	pub fn from_scope(scope: ScopeSet) -> Self {
		Self { scope }
	}

	/// Returns the requested scope set.
	pub fn scope(&self) -> &ScopeSet {
		&self.scope
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn request_context_normalizes_scopes() {
		let ctx = TokenRequestContext::new(["profile", "email"])
			.expect("Request context fixture should be valid.");

		assert_eq!(ctx.scope().normalized(), "email profile");
	}

	#[test]
	fn request_context_rejects_invalid_scopes() {
		assert!(TokenRequestContext::new(["has space"]).is_err());
	}
}
