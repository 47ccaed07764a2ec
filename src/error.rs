//! Probe-level error types shared by the token acquirer, request executor, and binary.

// self
use crate::_prelude::*;

/// Probe-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical probe error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Credential exchange with the authority failed; the run stops before any request is sent.
	#[error(transparent)]
	TokenAcquisition(#[from] TokenAcquisitionError),
	/// The authorized request could not be completed.
	#[error(transparent)]
	RequestExecution(#[from] RequestExecutionError),
}

/// Configuration and construction failures raised before any network traffic.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures surfaced while exchanging client credentials for a token.
#[derive(Debug, ThisError)]
pub enum TokenAcquisitionError {
	/// Authority string is not a valid absolute URL.
	#[error("Authority `{authority}` is not a valid URL.")]
	InvalidAuthority {
		/// Authority as supplied by the caller.
		authority: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint could not be expressed as a URL.
	#[error("Token endpoint `{endpoint}` is not a valid URL.")]
	InvalidTokenEndpoint {
		/// Endpoint value that failed to parse.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// OpenID Connect discovery document could not be fetched.
	#[error("Discovery document at {url} could not be retrieved: {message}.")]
	Discovery {
		/// Discovery document URL.
		url: String,
		/// Description of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Discovery document was not valid JSON or lacked `token_endpoint`.
	#[error("Discovery document is malformed.")]
	DiscoveryParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Authority answered with an OAuth error response.
	#[error("Authority rejected the client credentials: {reason}.")]
	Rejected {
		/// `error_description` when present, otherwise the OAuth `error` code.
		reason: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token endpoint answered with a body that is not a token response.
	#[error("Token endpoint returned a malformed response.")]
	MalformedResponse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error("Network error occurred while calling the authority.")]
	Transport {
		/// Transport-specific error.
		#[source]
		source: BoxError,
	},
	/// Transport reported a failure it could not classify.
	#[error("Authority call failed: {message}.")]
	Unexpected {
		/// Description of the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Request to the authority could not be constructed.
	#[error(transparent)]
	Config(#[from] ConfigError),
}
impl TokenAcquisitionError {
	/// Wraps a transport-specific network error.
	pub fn transport(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Transport { source: Box::new(src) }
	}
}

/// Failures surfaced while sending the authorized request.
#[derive(Debug, ThisError)]
pub enum RequestExecutionError {
	/// Token material cannot be carried in an HTTP header.
	#[error("Access token cannot be used as an Authorization header value.")]
	InvalidHeader {
		/// Underlying header validation failure.
		#[source]
		source: reqwest::header::InvalidHeaderValue,
	},
	/// Request could not be assembled.
	#[error("Request to {url} could not be built.")]
	Build {
		/// Target URL.
		url: String,
		/// Underlying builder failure.
		#[source]
		source: ReqwestError,
	},
	/// Request could not be sent or no response arrived.
	#[error("Request to {url} failed.")]
	Send {
		/// Target URL.
		url: String,
		/// Underlying transport failure.
		#[source]
		source: ReqwestError,
	},
	/// Response body could not be read or decoded.
	#[error("Response body from {url} could not be read.")]
	Body {
		/// Target URL.
		url: String,
		/// Underlying transport failure.
		#[source]
		source: ReqwestError,
	},
}

/// Returns the most specific message available for `err`.
///
/// Wrapper errors ("request failed") carry little detail, so the innermost `source()` wins and
/// the top-level message is used only when there is no cause.
pub fn clearest_message(err: &(dyn StdError + 'static)) -> String {
	let mut current = err;

	while let Some(next) = current.source() {
		current = next;
	}

	current.to_string()
}
