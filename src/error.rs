//! Crate-level error types shared across credentials, the exchange client, and providers.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(feature = "reqwest")]
type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Build-time configuration problem; never raised by `resolve`.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// A static or cached token had already expired at resolution time.
	#[error(transparent)]
	ExpiredToken(#[from] ExpiredTokenError),
	/// The identity provider rejected the live exchange.
	#[error(transparent)]
	Authentication(#[from] AuthenticationError),
	/// Transport failure (DNS, TCP, TLS) while reaching the identity provider.
	#[error(transparent)]
	Transport(#[from] TransportError),
}

/// Configuration and validation failures raised while building credentials.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// No mutually-exclusive configuration group was populated.
	#[error("{credential} requires exactly one of the following configurations: {groups}.")]
	MissingCredentialSource {
		/// Credential type under construction.
		credential: &'static str,
		/// Comma-separated group labels the builder accepts.
		groups: String,
	},
	/// A configuration group was started but not completed.
	#[error("{credential} configuration `{group}` is missing: {missing}.")]
	IncompleteCredentialSource {
		/// Credential type under construction.
		credential: &'static str,
		/// Label of the partially populated group.
		group: &'static str,
		/// Comma-separated field names that were left unset.
		missing: String,
	},
	/// Fields from more than one mutually-exclusive group were populated.
	#[error("{credential} received conflicting configuration fields: {fields}.")]
	ConflictingCredentialSources {
		/// Credential type under construction.
		credential: &'static str,
		/// Comma-separated field names that conflict.
		fields: String,
	},
	/// A live exchange requires at least one scope.
	#[error("At least one scope is required for an on-behalf-of exchange.")]
	EmptyScopes,
	/// Access token strings cannot be empty.
	#[error("Access token string cannot be empty.")]
	EmptyTokenString,
	/// The identity-provider authority is not a valid URL.
	#[error("Identity-provider authority is not a valid URL: {url}.")]
	InvalidAuthority {
		/// The offending authority string.
		url: String,
	},
	/// Identifier validation failed.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
}

/// Raised when a token's expiry has passed at the moment of resolution.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Token expired at {expired_at}.")]
pub struct ExpiredTokenError {
	/// Instant at which the token stopped being valid.
	pub expired_at: OffsetDateTime,
}

/// Machine-readable categories for provider rejections.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AuthenticationErrorKind {
	/// The client identifier is unknown to the provider.
	InvalidClient,
	/// The client secret or signed assertion was rejected.
	InvalidClientCredential,
	/// The requested scopes were invalid or denied.
	InvalidScope,
	/// The inbound user assertion was rejected.
	InvalidAssertion,
	/// The provider returned an error this crate does not classify.
	Unknown,
}
impl AuthenticationErrorKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			AuthenticationErrorKind::InvalidClient => "invalid_client",
			AuthenticationErrorKind::InvalidClientCredential => "invalid_client_credential",
			AuthenticationErrorKind::InvalidScope => "invalid_scope",
			AuthenticationErrorKind::InvalidAssertion => "invalid_assertion",
			AuthenticationErrorKind::Unknown => "unknown",
		}
	}
}
impl Display for AuthenticationErrorKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Raised when the identity provider rejects a live on-behalf-of exchange.
///
/// Carries the provider's raw error code alongside the classified kind so callers
/// can distinguish configuration mistakes from transient provider failures
/// without parsing the message.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Identity provider rejected the exchange ({code}): {message}.")]
pub struct AuthenticationError {
	/// Classified error category.
	pub kind: AuthenticationErrorKind,
	/// Raw provider error code (e.g. `invalid_client`).
	pub code: String,
	/// Provider-supplied message.
	pub message: String,
	/// HTTP status returned by the token endpoint, when available.
	pub http_status: Option<u16>,
}
impl AuthenticationError {
	/// Creates an error with the provided kind, raw code, and message.
	pub fn new(
		kind: AuthenticationErrorKind,
		code: impl Into<String>,
		message: impl Into<String>,
	) -> Self {
		Self { kind, code: code.into(), message: message.into(), http_status: None }
	}

	/// Attaches the HTTP status observed on the failing response.
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}
}

/// Transport-level failures (network, IO) surfaced by provider implementations.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[cfg(feature = "reqwest")]
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
}
#[cfg(feature = "reqwest")]
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authentication_error_formats_code_and_message() {
		let err = AuthenticationError::new(
			AuthenticationErrorKind::InvalidClient,
			"invalid_client",
			"AADSTS700016: application not found",
		)
		.with_http_status(401);

		assert_eq!(err.http_status, Some(401));
		assert!(err.to_string().contains("invalid_client"));
		assert!(err.to_string().contains("AADSTS700016"));
	}

	#[test]
	fn config_error_surfaces_through_top_level_error() {
		let err: Error = ConfigError::EmptyScopes.into();

		assert!(matches!(err, Error::Config(ConfigError::EmptyScopes)));
		assert!(err.to_string().contains("At least one scope"));
	}

	#[test]
	fn expired_token_error_reports_instant() {
		let expired_at = time::macros::datetime!(2025-01-01 00:00 UTC);
		let err = ExpiredTokenError { expired_at };

		assert!(err.to_string().contains("2025-01-01"));
	}
}
