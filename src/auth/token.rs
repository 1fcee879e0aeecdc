//! Token value types: secrets, access tokens, and the inbound user assertion.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError};

/// Redacted secret wrapper keeping bearer material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Immutable bearer credential usable against a downstream API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Token secret; callers must avoid logging it.
	pub token: TokenSecret,
	/// Fixed instant after which the token is no longer valid.
	pub expires_at: OffsetDateTime,
}
impl AccessToken {
	/// Creates an access token after rejecting empty token strings.
	pub fn new(token: impl Into<String>, expires_at: OffsetDateTime) -> Result<Self, ConfigError> {
		let token: String = token.into();

		if token.is_empty() {
			return Err(ConfigError::EmptyTokenString);
		}

		Ok(Self { token: TokenSecret::new(token), expires_at })
	}

	/// Returns `true` if the token has expired at the provided instant.
	///
	/// Expiry is inclusive: a token whose `expires_at` equals `instant` is no
	/// longer usable, matching the "strictly in the future" resolution rule.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		instant >= self.expires_at
	}

	/// Returns `true` if the token is expired relative to the current clock.
	pub fn is_expired(&self) -> bool {
		self.is_expired_at(OffsetDateTime::now_utc())
	}
}
impl Debug for AccessToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AccessToken")
			.field("token", &"<redacted>")
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Inbound bearer token proving the identity an exchange is performed on behalf of.
///
/// The assertion is opaque to this layer beyond non-emptiness. Cache keys use
/// [`fingerprint`](Self::fingerprint) so the raw token never acts as a map key
/// and never appears in diagnostics.
#[derive(Clone, PartialEq, Eq)]
pub struct UserAssertion(TokenSecret);
impl UserAssertion {
	/// Wraps an inbound assertion token after rejecting empty strings.
	pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
		let token: String = token.into();

		if token.is_empty() {
			return Err(ConfigError::EmptyTokenString);
		}

		Ok(Self(TokenSecret::new(token)))
	}

	/// Returns the raw assertion for submission to the identity provider.
	pub fn expose(&self) -> &str {
		self.0.expose()
	}

	/// Stable digest of the assertion (base64 no-pad SHA-256).
	pub fn fingerprint(&self) -> String {
		let mut hasher = Sha256::new();

		hasher.update(self.0.expose().as_bytes());

		STANDARD_NO_PAD.encode(hasher.finalize())
	}
}
impl Debug for UserAssertion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("UserAssertion").field(&"<redacted>").finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn secret_formatters_redact() {
		let secret = TokenSecret::new("super-secret");

		assert_eq!(format!("{secret:?}"), "TokenSecret(\"<redacted>\")");
		assert_eq!(format!("{secret}"), "<redacted>");
	}

	#[test]
	fn access_token_rejects_empty_string() {
		let err = AccessToken::new("", OffsetDateTime::now_utc())
			.expect_err("Empty token strings must be rejected.");

		assert!(matches!(err, ConfigError::EmptyTokenString));
	}

	#[test]
	fn access_token_expiry_is_inclusive() {
		let instant = time::macros::datetime!(2025-06-01 12:00 UTC);
		let token = AccessToken::new("tok", instant).expect("Token fixture should be valid.");

		assert!(token.is_expired_at(instant));
		assert!(token.is_expired_at(instant + Duration::seconds(1)));
		assert!(!token.is_expired_at(instant - Duration::seconds(1)));
	}

	#[test]
	fn assertion_fingerprint_is_stable_and_discriminating() {
		let a1 = UserAssertion::new("assertion-one").expect("First assertion should be valid.");
		let a1_again = UserAssertion::new("assertion-one").expect("Repeat assertion should be valid.");
		let a2 = UserAssertion::new("assertion-two").expect("Second assertion should be valid.");

		assert_eq!(a1.fingerprint(), a1_again.fingerprint());
		assert_ne!(a1.fingerprint(), a2.fingerprint());
		assert_eq!(format!("{a1:?}"), "UserAssertion(\"<redacted>\")");
	}
}
