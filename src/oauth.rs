//! Client-credentials token acquisition built on the `oauth2` crate.
//!
//! [`TokenAcquirer::acquire`] resolves the token endpoint for an authority (deriving it from the
//! authority URL or reading the OpenID Connect discovery document), sends a single
//! `grant_type=client_credentials` request naming the target resource, and maps the outcome
//! into a [`TokenResult`] or a [`TokenAcquisitionError`]. Nothing is retried or cached.

mod response;

pub use oauth2;
pub use response::AuthorityTokenResponse;

// crates.io
use oauth2::{
	AsyncHttpClient, AuthType, Client, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RequestTokenError, Scope, StandardRevocableToken, TokenResponse, TokenUrl,
	basic::{
		BasicErrorResponse, BasicRequestTokenError, BasicRevocationErrorResponse,
		BasicTokenIntrospectionResponse,
	},
	http::{Method as OAuthMethod, Request as OAuthRequest, header::ACCEPT},
};
// self
use crate::{
	_prelude::*,
	auth::{Secret, TokenResult, canonical_token_type},
	authority::{
		Authority, AuthorityQuirks, ClientAuthMethod, OpenIdConfiguration, ResourceParameter,
	},
	error::{ConfigError, TokenAcquisitionError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	obs::{Stage, StageSpan},
};

type AuthorityClient = Client<
	BasicErrorResponse,
	AuthorityTokenResponse,
	BasicTokenIntrospectionResponse,
	StandardRevocableToken,
	BasicRevocationErrorResponse,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointNotSet,
	EndpointSet,
>;

/// Inputs of a single client-credentials exchange.
#[derive(Clone, Debug)]
pub struct TokenRequest {
	/// Application (client) identifier.
	pub app_id: String,
	/// Application secret.
	pub app_secret: Secret,
	/// Resource/audience the token is requested for.
	pub resource: String,
	/// Authority URL as supplied by the caller.
	pub authority: String,
	/// Authority-specific request shaping.
	pub quirks: AuthorityQuirks,
}
impl TokenRequest {
	/// Creates a request using the default (Azure AD v1) authority quirks.
	pub fn new(
		app_id: impl Into<String>,
		app_secret: Secret,
		resource: impl Into<String>,
		authority: impl Into<String>,
	) -> Self {
		Self {
			app_id: app_id.into(),
			app_secret,
			resource: resource.into(),
			authority: authority.into(),
			quirks: AuthorityQuirks::default(),
		}
	}

	/// Overrides the authority quirks.
	pub fn with_quirks(mut self, quirks: AuthorityQuirks) -> Self {
		self.quirks = quirks;

		self
	}
}

/// Exchanges application credentials for an access token.
pub struct TokenAcquirer<C = ReqwestHttpClient>
where
	C: ?Sized + TokenHttpClient,
{
	http_client: Arc<C>,
}
impl<C> TokenAcquirer<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Creates an acquirer that sends every authority call through `http_client`.
	pub fn with_http_client(http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into() }
	}

	/// Performs the client-credentials grant described by `request`.
	pub async fn acquire(
		&self,
		request: &TokenRequest,
	) -> Result<TokenResult, TokenAcquisitionError> {
		let span = StageSpan::new(Stage::TokenAcquisition);

		span.instrument(async move {
			let authority =
				Authority::parse(&request.authority, request.quirks.endpoint_convention)?;

			if !authority.is_secure() {
				tracing::warn!(authority = %authority.url, "Authority is not using HTTPS.");
			}

			let token_url = match authority.derived_token_endpoint() {
				Some(url) => url,
				None => self.discover_token_endpoint(&authority).await?,
			};

			tracing::debug!(
				app_id = %request.app_id,
				token_endpoint = %token_url,
				resource = %request.resource,
				"Requesting client-credentials token."
			);

			let oauth_client = build_oauth_client(request, &token_url)?;
			let meta = ResponseMetadataSlot::default();
			let instrumented = self.http_client.with_metadata(meta.clone());
			let mut exchange = oauth_client.exchange_client_credentials();

			exchange = match request.quirks.resource_parameter {
				ResourceParameter::Scope => {
					let (_, value) = ResourceParameter::Scope.form_field(&request.resource);

					exchange.add_scope(Scope::new(value))
				},
				parameter => {
					let (name, value) = parameter.form_field(&request.resource);

					exchange.add_extra_param(name, value)
				},
			};

			let response = exchange
				.request_async(&instrumented)
				.await
				.map_err(|err| map_request_error(meta.take(), err))?;
			let token = map_token_response(&response);

			tracing::debug!(
				token_type = %token.token_type,
				expires_at = ?token.expires_at,
				"Token endpoint issued an access token."
			);

			Ok(token)
		})
		.await
	}

	async fn discover_token_endpoint(
		&self,
		authority: &Authority,
	) -> Result<Url, TokenAcquisitionError> {
		let url = authority.discovery_url();
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let request = OAuthRequest::builder()
			.method(OAuthMethod::GET)
			.uri(url.as_str())
			.header(ACCEPT, "application/json")
			.body(Vec::new())
			.map_err(ConfigError::from)?;

		tracing::debug!(discovery = %url, "Fetching OpenID Connect discovery document.");

		let response = instrumented
			.call(request)
			.await
			.map_err(|err| map_transport_error(meta.take(), err))?;
		let status = response.status();

		if !status.is_success() {
			return Err(TokenAcquisitionError::Discovery {
				url: url.to_string(),
				message: format!("authority answered HTTP {status}"),
				status: Some(status.as_u16()),
			});
		}

		let token_url = OpenIdConfiguration::from_slice(response.body())?.token_endpoint_url()?;

		if token_url.scheme() != "https" {
			tracing::warn!(
				token_endpoint = %token_url,
				"Discovered token endpoint is not using HTTPS."
			);
		}

		Ok(token_url)
	}
}
impl TokenAcquirer<ReqwestHttpClient> {
	/// Creates an acquirer backed by a fresh non-redirecting reqwest client.
	pub fn new(timeout: Option<std::time::Duration>) -> Result<Self, ConfigError> {
		Ok(Self::with_http_client(ReqwestHttpClient::new(timeout)?))
	}
}
impl<C> Debug for TokenAcquirer<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAcquirer").finish_non_exhaustive()
	}
}

fn build_oauth_client(
	request: &TokenRequest,
	token_url: &Url,
) -> Result<AuthorityClient, TokenAcquisitionError> {
	let token_url = TokenUrl::new(token_url.to_string()).map_err(|source| {
		TokenAcquisitionError::InvalidTokenEndpoint { endpoint: token_url.to_string(), source }
	})?;
	let mut oauth_client: AuthorityClient = Client::new(ClientId::new(request.app_id.clone()))
		.set_client_secret(ClientSecret::new(request.app_secret.expose().to_owned()))
		.set_token_uri(token_url);

	if matches!(request.quirks.client_auth, ClientAuthMethod::ClientSecretPost) {
		oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
	}

	Ok(oauth_client)
}

fn map_token_response(response: &AuthorityTokenResponse) -> TokenResult {
	let token_type = canonical_token_type(response.token_type().as_ref());
	let token = TokenResult::new(token_type, response.access_token().secret().to_owned());
	let expires_at = response
		.expires_in()
		.and_then(|ttl| Duration::try_from(ttl).ok())
		.and_then(|ttl| OffsetDateTime::now_utc().checked_add(ttl));

	match expires_at {
		Some(instant) => token.with_expires_at(instant),
		None => token,
	}
}

fn map_request_error<E>(
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
) -> TokenAcquisitionError
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.as_ref().and_then(|value| value.status);

	match err {
		RequestTokenError::ServerResponse(response) => {
			let code = response.error().as_ref();
			let reason = match response.error_description() {
				Some(description) => format!("{code}: {description}"),
				None => code.to_owned(),
			};

			TokenAcquisitionError::Rejected { reason, status }
		},
		RequestTokenError::Request(error) => map_transport_error(meta, error),
		RequestTokenError::Parse(source, _body) => match status {
			Some(code) if !(200..300).contains(&code) => TokenAcquisitionError::Unexpected {
				message: format!("token endpoint answered HTTP {code} without an OAuth error body"),
				status,
			},
			_ => TokenAcquisitionError::MalformedResponse { source, status },
		},
		RequestTokenError::Other(message) => TokenAcquisitionError::Unexpected { message, status },
	}
}

fn map_transport_error<E>(
	meta: Option<ResponseMetadata>,
	err: HttpClientError<E>,
) -> TokenAcquisitionError
where
	E: 'static + Send + Sync + StdError,
{
	let status = meta.and_then(|value| value.status);

	match err {
		HttpClientError::Reqwest(inner) => TokenAcquisitionError::Transport { source: inner },
		HttpClientError::Http(inner) => ConfigError::from(inner).into(),
		HttpClientError::Io(inner) => TokenAcquisitionError::transport(inner),
		HttpClientError::Other(message) => TokenAcquisitionError::Unexpected { message, status },
		_ => TokenAcquisitionError::Unexpected {
			message: "HTTP client error occurred while calling the authority".into(),
			status,
		},
	}
}
