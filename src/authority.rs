//! Authority metadata: how the token endpoint is located and how the token request is shaped.
//!
//! Authorities disagree on three details of the client-credentials exchange, captured here as
//! [`AuthorityQuirks`]: where the token endpoint lives relative to the authority URL
//! ([`EndpointConvention`]), how the client authenticates ([`ClientAuthMethod`]), and which form
//! field carries the target resource ([`ResourceParameter`]). Defaults follow Azure AD v1, the
//! convention behind the default authority.

// self
use crate::{_prelude::*, error::TokenAcquisitionError};

/// Authority used when the caller does not name one.
pub const DEFAULT_AUTHORITY: &str = "https://login.windows.net/common";
/// Path suffix appended to the authority for OpenID Connect discovery.
pub const WELL_KNOWN_PATH: &str = ".well-known/openid-configuration";

const AAD_TOKEN_PATH: &str = "oauth2/token";
const DEFAULT_SCOPE_SUFFIX: &str = "/.default";

/// How the token endpoint is derived from the authority URL.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EndpointConvention {
	#[default]
	/// Azure AD v1: `<authority>/oauth2/token`.
	Aad,
	/// OpenID Connect discovery: read `token_endpoint` from
	/// `<authority>/.well-known/openid-configuration`.
	Discovery,
	/// The authority URL is the token endpoint.
	Direct,
}

/// Client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
}

/// Token request field that names the target resource.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ResourceParameter {
	#[default]
	/// `resource=<target>` (Azure AD v1).
	Resource,
	/// `audience=<target>` (Auth0 and similar).
	Audience,
	/// `scope=<target>/.default` (Microsoft identity platform v2).
	Scope,
}
impl ResourceParameter {
	/// Returns the form field name and value that carry `resource`.
	pub fn form_field(self, resource: &str) -> (&'static str, String) {
		match self {
			ResourceParameter::Resource => ("resource", resource.to_owned()),
			ResourceParameter::Audience => ("audience", resource.to_owned()),
			ResourceParameter::Scope => ("scope", default_scope(resource)),
		}
	}
}

/// Authority-specific quirks that influence the token request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityQuirks {
	/// Token endpoint derivation rule.
	pub endpoint_convention: EndpointConvention,
	/// Client authentication mode.
	pub client_auth: ClientAuthMethod,
	/// Field used to name the target resource.
	pub resource_parameter: ResourceParameter,
}

/// Parsed authority URL paired with its endpoint convention.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Authority {
	/// Authority URL as supplied by the caller.
	pub url: Url,
	/// Token endpoint derivation rule.
	pub convention: EndpointConvention,
}
impl Authority {
	/// Parses the raw authority string.
	pub fn parse(
		raw: &str,
		convention: EndpointConvention,
	) -> Result<Self, TokenAcquisitionError> {
		let url = Url::parse(raw.trim()).map_err(|source| {
			TokenAcquisitionError::InvalidAuthority { authority: raw.to_owned(), source }
		})?;

		if url.cannot_be_a_base() || url.host_str().is_none() {
			return Err(TokenAcquisitionError::InvalidAuthority {
				authority: raw.to_owned(),
				source: url::ParseError::EmptyHost,
			});
		}

		Ok(Self { url, convention })
	}

	/// Returns the token endpoint when it can be derived without a network call.
	///
	/// [`EndpointConvention::Discovery`] yields `None`; use [`Authority::discovery_url`] and
	/// [`OpenIdConfiguration`] instead.
	pub fn derived_token_endpoint(&self) -> Option<Url> {
		match self.convention {
			EndpointConvention::Aad => Some(join_path(&self.url, AAD_TOKEN_PATH)),
			EndpointConvention::Discovery => None,
			EndpointConvention::Direct => Some(self.url.clone()),
		}
	}

	/// URL of the OpenID Connect discovery document for this authority.
	pub fn discovery_url(&self) -> Url {
		if self.url.path().trim_end_matches('/').ends_with(WELL_KNOWN_PATH) {
			return self.url.clone();
		}

		join_path(&self.url, WELL_KNOWN_PATH)
	}

	/// Returns `true` when the authority is reached over TLS.
	pub fn is_secure(&self) -> bool {
		self.url.scheme() == "https"
	}
}

/// Subset of the OpenID Connect discovery document used by the probe.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct OpenIdConfiguration {
	/// Absolute URL of the token endpoint.
	pub token_endpoint: String,
	/// Issuer identifier, when advertised.
	#[serde(default)]
	pub issuer: Option<String>,
}
impl OpenIdConfiguration {
	/// Parses a discovery document, reporting the JSON path of any mismatch.
	pub fn from_slice(body: &[u8]) -> Result<Self, TokenAcquisitionError> {
		let deserializer = &mut serde_json::Deserializer::from_slice(body);

		serde_path_to_error::deserialize(deserializer)
			.map_err(|source| TokenAcquisitionError::DiscoveryParse { source })
	}

	/// Parses the advertised token endpoint.
	pub fn token_endpoint_url(&self) -> Result<Url, TokenAcquisitionError> {
		Url::parse(&self.token_endpoint).map_err(|source| {
			TokenAcquisitionError::InvalidTokenEndpoint {
				endpoint: self.token_endpoint.clone(),
				source,
			}
		})
	}
}

fn join_path(base: &Url, suffix: &str) -> Url {
	let mut url = base.clone();
	let path = format!("{}/{suffix}", base.path().trim_end_matches('/'));

	url.set_path(&path);
	url.set_query(None);
	url.set_fragment(None);

	url
}

fn default_scope(resource: &str) -> String {
	if resource.ends_with(DEFAULT_SCOPE_SUFFIX) {
		resource.to_owned()
	} else {
		format!("{}{DEFAULT_SCOPE_SUFFIX}", resource.trim_end_matches('/'))
	}
}
