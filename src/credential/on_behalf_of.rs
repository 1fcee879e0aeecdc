//! On-behalf-of flow credential and its builder.

// self
use crate::{
	_prelude::*,
	auth::{ClientId, TenantId, TokenSecret, UserAssertion},
	credential::{
		CredentialFuture, TokenCredential, TokenRequestContext,
		validate::{self, ConfigField, ConfigGroup},
	},
	error::ConfigError,
	exchange::ExchangeClient,
	obs::{self, CredentialKind, ResolveOutcome, ResolveSpan},
	provider::{ClientCredentialMaterial, IdentityProvider},
};

/// Credential that exchanges an inbound assertion for a downstream token.
///
/// Resolution is cache-first: the owned [`ExchangeClient`]'s cache is consulted
/// before any network I/O, and a valid hit never triggers a live exchange. The
/// credential itself is immutable; only the exchange cache mutates.
pub struct OnBehalfOfFlowCredential {
	client: ExchangeClient,
	assertion: UserAssertion,
}
impl OnBehalfOfFlowCredential {
	/// Returns a builder collecting the client identity and assertion.
	pub fn builder() -> OnBehalfOfFlowCredentialBuilder {
		OnBehalfOfFlowCredentialBuilder::default()
	}

	/// Exchange client bound to this credential's identity.
	pub fn exchange_client(&self) -> &ExchangeClient {
		&self.client
	}
}
impl TokenCredential for OnBehalfOfFlowCredential {
	fn resolve<'a>(&'a self, ctx: &'a TokenRequestContext) -> CredentialFuture<'a> {
		const KIND: CredentialKind = CredentialKind::OnBehalfOf;

		let span = ResolveSpan::new(KIND, "on_behalf_of");

		obs::record_resolve_outcome(KIND, ResolveOutcome::Attempt);

		Box::pin(span.instrument(async move {
			// Cache lookup always precedes any live exchange attempt.
			if let Some(token) = self.client.lookup_cached(ctx, &self.assertion) {
				obs::record_resolve_outcome(KIND, ResolveOutcome::CacheHit);

				return Ok(token);
			}

			let result = self.client.exchange_live(ctx, &self.assertion).await;

			match &result {
				Ok(_) => obs::record_resolve_outcome(KIND, ResolveOutcome::Exchanged),
				Err(_) => obs::record_resolve_outcome(KIND, ResolveOutcome::Failure),
			}

			result
		}))
	}
}
impl Debug for OnBehalfOfFlowCredential {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OnBehalfOfFlowCredential")
			.field("client", &self.client)
			.field("assertion", &self.assertion)
			.finish()
	}
}

/// Fluent builder producing an immutable [`OnBehalfOfFlowCredential`].
///
/// Requires the tenant id, client id, the inbound assertion token string, and
/// exactly one of a client secret or a pre-signed client (certificate)
/// assertion. Builders are single-use and not shared across threads.
#[derive(Default)]
pub struct OnBehalfOfFlowCredentialBuilder {
	tenant_id: Option<String>,
	client_id: Option<String>,
	client_secret: Option<String>,
	client_assertion: Option<String>,
	token_string: Option<String>,
	provider: Option<Arc<dyn IdentityProvider>>,
}
impl OnBehalfOfFlowCredentialBuilder {
	const CREDENTIAL: &'static str = "OnBehalfOfFlowCredential";

	/// Sets the tenant identifier of the confidential client.
	pub fn tenant_id(mut self, tenant: impl Into<String>) -> Self {
		self.tenant_id = Some(tenant.into());

		self
	}

	/// Sets the client identifier of the confidential client.
	pub fn client_id(mut self, client: impl Into<String>) -> Self {
		self.client_id = Some(client.into());

		self
	}

	/// Sets the client secret.
	pub fn client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets a pre-signed client assertion derived from a client certificate.
	pub fn client_certificate_assertion(mut self, assertion: impl Into<String>) -> Self {
		self.client_assertion = Some(assertion.into());

		self
	}

	/// Sets the inbound assertion token presented by the calling identity.
	pub fn token_string(mut self, token: impl Into<String>) -> Self {
		self.token_string = Some(token.into());

		self
	}

	/// Overrides the identity-provider implementation performing live exchanges.
	///
	/// When the `reqwest` feature is enabled the builder falls back to a
	/// [`ReqwestIdentityProvider`](crate::http::ReqwestIdentityProvider) against
	/// the default authority; without it a provider is mandatory.
	pub fn provider(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
		self.provider = Some(provider);

		self
	}

	/// Validates the configuration and builds the credential.
	pub fn build(self) -> Result<OnBehalfOfFlowCredential> {
		let identity_group = [ConfigGroup::new("client identity", vec![
			ConfigField::new("tenant_id", self.tenant_id.is_some()),
			ConfigField::new("client_id", self.client_id.is_some()),
			ConfigField::new("token_string", self.token_string.is_some()),
		])];

		validate::require_exactly_one(Self::CREDENTIAL, &identity_group)?;

		let auth_groups = [
			ConfigGroup::new("client secret", vec![ConfigField::new(
				"client_secret",
				self.client_secret.is_some(),
			)]),
			ConfigGroup::new("client certificate assertion", vec![ConfigField::new(
				"client_certificate_assertion",
				self.client_assertion.is_some(),
			)]),
		];
		let credential = match validate::require_exactly_one(Self::CREDENTIAL, &auth_groups)? {
			0 => self.client_secret.map(|secret| {
				ClientCredentialMaterial::Secret(TokenSecret::new(secret))
			}),
			_ => self.client_assertion.map(|assertion| {
				ClientCredentialMaterial::SignedAssertion(TokenSecret::new(assertion))
			}),
		}
		.ok_or(ConfigError::MissingCredentialSource {
			credential: Self::CREDENTIAL,
			groups: "client secret, client certificate assertion".into(),
		})?;
		let (tenant, client, token) = match (self.tenant_id, self.client_id, self.token_string) {
			(Some(tenant), Some(client), Some(token)) => (tenant, client, token),
			// `require_exactly_one` guarantees all identity fields are present.
			_ =>
				return Err(ConfigError::MissingCredentialSource {
					credential: Self::CREDENTIAL,
					groups: "client identity".into(),
				}
				.into()),
		};
		let tenant = TenantId::new(tenant).map_err(ConfigError::from)?;
		let client = ClientId::new(client).map_err(ConfigError::from)?;
		let assertion = UserAssertion::new(token)?;
		let provider: Arc<dyn IdentityProvider> = match self.provider {
			Some(provider) => provider,
			#[cfg(feature = "reqwest")]
			None => Arc::new(crate::http::ReqwestIdentityProvider::from_authority_str(
				crate::http::DEFAULT_AUTHORITY,
			)?),
			#[cfg(not(feature = "reqwest"))]
			None =>
				return Err(ConfigError::MissingCredentialSource {
					credential: Self::CREDENTIAL,
					groups: "identity provider".into(),
				}
				.into()),
		};

		Ok(OnBehalfOfFlowCredential {
			client: ExchangeClient::new(tenant, client, credential, provider),
			assertion,
		})
	}
}
impl Debug for OnBehalfOfFlowCredentialBuilder {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OnBehalfOfFlowCredentialBuilder")
			.field("tenant_id", &self.tenant_id)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("client_assertion_set", &self.client_assertion.is_some())
			.field("token_string_set", &self.token_string.is_some())
			.finish()
	}
}
