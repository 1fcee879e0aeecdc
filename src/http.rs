//! Reqwest-backed identity provider performing the on-behalf-of wire exchange.
//!
//! The provider posts the standard jwt-bearer on-behalf-of form to
//! `{authority}/{tenant}/oauth2/v2.0/token`. Confidential-client authentication
//! uses either the `client_secret` field or an RFC 7523 `client_assertion`,
//! depending on the [`ClientCredentialMaterial`] supplied by the exchange
//! client. Retry, backoff, and timeout policy are inherited from the wrapped
//! [`ReqwestClient`]; this layer performs exactly one request per exchange.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TenantId},
	error::{AuthenticationError, AuthenticationErrorKind, ConfigError, TransportError},
	provider::{ClientCredentialMaterial, IdentityProvider, OnBehalfOfRequest, ProviderFuture},
};

/// Default authority for the public identity cloud.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

const GRANT_TYPE_JWT_BEARER: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const CLIENT_ASSERTION_TYPE_JWT_BEARER: &str =
	"urn:ietf:params:oauth:client-assertion-type:jwt-bearer";
const REQUESTED_TOKEN_USE_OBO: &str = "on_behalf_of";

/// [`IdentityProvider`] implementation backed by a shared [`ReqwestClient`].
#[derive(Clone, Debug)]
pub struct ReqwestIdentityProvider {
	client: ReqwestClient,
	authority: Url,
}
impl ReqwestIdentityProvider {
	/// Creates a provider against the given authority with a default HTTP client.
	pub fn new(authority: Url) -> Self {
		Self::with_client(authority, ReqwestClient::default())
	}

	/// Creates a provider that reuses the caller-provided HTTP client.
	pub fn with_client(authority: Url, client: ReqwestClient) -> Self {
		Self { client, authority }
	}

	/// Parses the authority string and creates a provider with a default HTTP client.
	pub fn from_authority_str(authority: &str) -> Result<Self, ConfigError> {
		let authority = Url::parse(authority)
			.map_err(|_| ConfigError::InvalidAuthority { url: authority.to_owned() })?;

		Ok(Self::new(authority))
	}

	fn token_endpoint(&self, tenant: &TenantId) -> Result<Url, ConfigError> {
		let raw = format!(
			"{}/{}/oauth2/v2.0/token",
			self.authority.as_str().trim_end_matches('/'),
			tenant
		);

		Url::parse(&raw).map_err(|_| ConfigError::InvalidAuthority { url: raw })
	}

	async fn acquire(&self, request: OnBehalfOfRequest<'_>) -> Result<AccessToken> {
		let endpoint = self.token_endpoint(request.tenant)?;
		let mut form = vec![
			("grant_type", GRANT_TYPE_JWT_BEARER.to_owned()),
			("requested_token_use", REQUESTED_TOKEN_USE_OBO.to_owned()),
			("client_id", request.client.to_string()),
			("assertion", request.assertion.expose().to_owned()),
			("scope", request.scope.normalized()),
		];

		match request.credential {
			ClientCredentialMaterial::Secret(secret) =>
				form.push(("client_secret", secret.expose().to_owned())),
			ClientCredentialMaterial::SignedAssertion(assertion) => {
				form.push(("client_assertion", assertion.expose().to_owned()));
				form.push((
					"client_assertion_type",
					CLIENT_ASSERTION_TYPE_JWT_BEARER.to_owned(),
				));
			},
		}

		let response = self
			.client
			.post(endpoint)
			.form(&form)
			.send()
			.await
			.map_err(TransportError::from)?;
		let status = response.status().as_u16();
		let body = response.bytes().await.map_err(TransportError::from)?;

		if (200..300).contains(&status) {
			let payload: TokenEndpointResponse = parse_body(&body, status)?;
			let expires_in = i64::try_from(payload.expires_in).map_err(|_| {
				malformed_response(status, "expires_in exceeds the supported range")
			})?;
			let expires_at = OffsetDateTime::now_utc() + Duration::seconds(expires_in);

			Ok(AccessToken::new(payload.access_token, expires_at)?)
		} else {
			let payload: TokenEndpointError = parse_body(&body, status)?;

			Err(AuthenticationError::new(
				classify_error_code(&payload.error),
				payload.error,
				payload.error_description.unwrap_or_else(|| "No description provided".into()),
			)
			.with_http_status(status)
			.into())
		}
	}
}
impl IdentityProvider for ReqwestIdentityProvider {
	fn acquire_on_behalf_of<'a>(
		&'a self,
		request: OnBehalfOfRequest<'a>,
	) -> ProviderFuture<'a, AccessToken> {
		Box::pin(self.acquire(request))
	}
}

/// Successful token endpoint payload.
#[derive(Debug, Deserialize)]
struct TokenEndpointResponse {
	access_token: String,
	expires_in: u64,
}

/// OAuth error payload returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenEndpointError {
	error: String,
	error_description: Option<String>,
}

fn parse_body<T>(body: &[u8], status: u16) -> Result<T>
where
	T: DeserializeOwned,
{
	let deserializer = &mut serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(deserializer)
		.map_err(|source| malformed_response(status, &format!("at {}: {source}", source.path())))
}

fn malformed_response(status: u16, detail: &str) -> Error {
	AuthenticationError::new(
		AuthenticationErrorKind::Unknown,
		"invalid_response",
		format!("Token endpoint returned a malformed response {detail}"),
	)
	.with_http_status(status)
	.into()
}

fn classify_error_code(code: &str) -> AuthenticationErrorKind {
	if code.eq_ignore_ascii_case("unauthorized_client") {
		AuthenticationErrorKind::InvalidClient
	} else if code.eq_ignore_ascii_case("invalid_client") {
		AuthenticationErrorKind::InvalidClientCredential
	} else if code.eq_ignore_ascii_case("invalid_scope")
		|| code.eq_ignore_ascii_case("consent_required")
	{
		AuthenticationErrorKind::InvalidScope
	} else if code.eq_ignore_ascii_case("invalid_grant") {
		AuthenticationErrorKind::InvalidAssertion
	} else {
		AuthenticationErrorKind::Unknown
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn token_endpoint_includes_tenant_segment() {
		let provider = ReqwestIdentityProvider::from_authority_str(DEFAULT_AUTHORITY)
			.expect("Default authority should parse.");
		let tenant = TenantId::new("tenant-1").expect("Tenant fixture should be valid.");
		let endpoint =
			provider.token_endpoint(&tenant).expect("Token endpoint should be constructible.");

		assert_eq!(
			endpoint.as_str(),
			"https://login.microsoftonline.com/tenant-1/oauth2/v2.0/token"
		);
	}

	#[test]
	fn invalid_authority_is_rejected() {
		assert!(matches!(
			ReqwestIdentityProvider::from_authority_str("not a url"),
			Err(ConfigError::InvalidAuthority { .. })
		));
	}

	#[test]
	fn error_codes_classify_into_kinds() {
		assert_eq!(classify_error_code("unauthorized_client"), AuthenticationErrorKind::InvalidClient);
		assert_eq!(
			classify_error_code("invalid_client"),
			AuthenticationErrorKind::InvalidClientCredential
		);
		assert_eq!(classify_error_code("invalid_scope"), AuthenticationErrorKind::InvalidScope);
		assert_eq!(classify_error_code("INVALID_GRANT"), AuthenticationErrorKind::InvalidAssertion);
		assert_eq!(classify_error_code("server_error"), AuthenticationErrorKind::Unknown);
	}

	#[test]
	fn success_payload_parses() {
		let body = br#"{"token_type":"Bearer","scope":"api/.default","expires_in":3599,"access_token":"tok"}"#;
		let payload: TokenEndpointResponse =
			parse_body(body, 200).expect("Success payload should parse.");

		assert_eq!(payload.access_token, "tok");
		assert_eq!(payload.expires_in, 3599);
	}

	#[test]
	fn malformed_payload_reports_path() {
		let body = br#"{"access_token":"tok","expires_in":"soon"}"#;
		let err = parse_body::<TokenEndpointResponse>(body, 200)
			.expect_err("Malformed payload must be rejected.");

		assert!(err.to_string().contains("expires_in"));
	}
}
