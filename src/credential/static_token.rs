//! Static prefetched-token credential and its builder.

// self
use crate::{
	_prelude::*,
	auth::AccessToken,
	credential::{
		CredentialFuture, TokenCredential, TokenRequestContext,
		validate::{self, ConfigField, ConfigGroup},
	},
	error::ExpiredTokenError,
	obs::{self, CredentialKind, ResolveOutcome, ResolveSpan},
};

/// Credential backed by a token obtained out of band.
///
/// Requested scopes are accepted but never validated against the stored token;
/// the token is opaque at this layer and scope mismatch is the caller's
/// responsibility. Resolution performs no I/O and is idempotent while the token
/// remains valid.
#[derive(Clone, Debug)]
pub struct StaticTokenCredential {
	token: AccessToken,
}
impl StaticTokenCredential {
	/// Returns a builder collecting the static token configuration.
	pub fn builder() -> StaticTokenCredentialBuilder {
		StaticTokenCredentialBuilder::default()
	}

	fn resolve_now(&self, now: OffsetDateTime) -> Result<AccessToken> {
		if self.token.is_expired_at(now) {
			return Err(ExpiredTokenError { expired_at: self.token.expires_at }.into());
		}

		Ok(self.token.clone())
	}
}
impl TokenCredential for StaticTokenCredential {
	fn resolve<'a>(&'a self, _ctx: &'a TokenRequestContext) -> CredentialFuture<'a> {
		const KIND: CredentialKind = CredentialKind::StaticToken;

		let span = ResolveSpan::new(KIND, "static_token");

		obs::record_resolve_outcome(KIND, ResolveOutcome::Attempt);

		// The static path never suspends; the future completes immediately.
		Box::pin(span.instrument(async move {
			let result = self.resolve_now(OffsetDateTime::now_utc());

			match &result {
				Ok(_) => obs::record_resolve_outcome(KIND, ResolveOutcome::Static),
				Err(_) => obs::record_resolve_outcome(KIND, ResolveOutcome::Failure),
			}

			result
		}))
	}
}

/// Fluent builder producing an immutable [`StaticTokenCredential`].
///
/// Exactly one of the following must be supplied:
/// - [`token_string`](Self::token_string) together with [`expires_at`](Self::expires_at), or
/// - a prebuilt [`access_token`](Self::access_token).
#[derive(Clone, Debug, Default)]
pub struct StaticTokenCredentialBuilder {
	token_string: Option<String>,
	expires_at: Option<OffsetDateTime>,
	access_token: Option<AccessToken>,
}
impl StaticTokenCredentialBuilder {
	const CREDENTIAL: &'static str = "StaticTokenCredential";

	/// Sets the prefetched token string.
	pub fn token_string(mut self, token: impl Into<String>) -> Self {
		self.token_string = Some(token.into());

		self
	}

	/// Sets the expiry instant paired with the token string.
	pub fn expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Sets a prebuilt access token.
	pub fn access_token(mut self, token: AccessToken) -> Self {
		self.access_token = Some(token);

		self
	}

	/// Validates the mutually-exclusive configuration and builds the credential.
	pub fn build(self) -> Result<StaticTokenCredential> {
		let groups = [
			ConfigGroup::new("token string + expiry", vec![
				ConfigField::new("token_string", self.token_string.is_some()),
				ConfigField::new("expires_at", self.expires_at.is_some()),
			]),
			ConfigGroup::new("prebuilt access token", vec![ConfigField::new(
				"access_token",
				self.access_token.is_some(),
			)]),
		];
		let token = match validate::require_exactly_one(Self::CREDENTIAL, &groups)? {
			0 => match (self.token_string, self.expires_at) {
				(Some(token), Some(expires_at)) => AccessToken::new(token, expires_at)?,
				// `require_exactly_one` guarantees both fields are present.
				_ => return Err(missing_after_validation()),
			},
			_ => match self.access_token {
				Some(token) => token,
				None => return Err(missing_after_validation()),
			},
		};

		Ok(StaticTokenCredential { token })
	}
}

fn missing_after_validation() -> Error {
	crate::error::ConfigError::MissingCredentialSource {
		credential: StaticTokenCredentialBuilder::CREDENTIAL,
		groups: "token string + expiry, prebuilt access token".into(),
	}
	.into()
}
