//! Immutable options for a single probe run.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::Method;
// self
use crate::{
	_prelude::*,
	auth::Secret,
	authority::{AuthorityQuirks, DEFAULT_AUTHORITY},
};

/// Everything a probe run needs, populated by the command line (or a caller).
#[derive(Clone, Debug)]
pub struct RequestOptions {
	/// Application (client) identifier.
	pub app_id: String,
	/// Application secret.
	pub app_secret: Secret,
	/// Target URI of the authorized request.
	pub target_uri: Url,
	/// Target URI as the caller wrote it, echoed in console output.
	pub target_input: String,
	/// HTTP method of the authorized request.
	pub method: Method,
	/// Request body; only sent with `POST`.
	pub body: Option<String>,
	/// Resource the token is requested for; the target URI authority when unset.
	pub target_resource: Option<String>,
	/// Authority URL.
	pub authority: String,
	/// Authority-specific token request shaping.
	pub quirks: AuthorityQuirks,
	/// Overall timeout applied to each HTTP call; none by default.
	pub timeout: Option<StdDuration>,
}
impl RequestOptions {
	/// Creates options for a `GET` against `target_uri` using the default authority.
	pub fn new(app_id: impl Into<String>, app_secret: Secret, target_uri: Url) -> Self {
		Self {
			app_id: app_id.into(),
			app_secret,
			target_input: target_uri.to_string(),
			target_uri,
			method: Method::GET,
			body: None,
			target_resource: None,
			authority: DEFAULT_AUTHORITY.into(),
			quirks: AuthorityQuirks::default(),
			timeout: None,
		}
	}

	/// Uses the parsed `target` and keeps its input spelling for display.
	pub fn with_target(mut self, target: TargetUri) -> Self {
		self.target_uri = target.url;
		self.target_input = target.input;

		self
	}

	/// Sets the HTTP method.
	pub fn with_method(mut self, method: Method) -> Self {
		self.method = method;

		self
	}

	/// Sets the request body.
	pub fn with_body(mut self, body: impl Into<String>) -> Self {
		self.body = Some(body.into());

		self
	}

	/// Sets the token resource explicitly.
	pub fn with_target_resource(mut self, resource: impl Into<String>) -> Self {
		self.target_resource = Some(resource.into());

		self
	}

	/// Sets the authority URL.
	pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
		self.authority = authority.into();

		self
	}

	/// Overrides the authority quirks.
	pub fn with_quirks(mut self, quirks: AuthorityQuirks) -> Self {
		self.quirks = quirks;

		self
	}

	/// Applies a timeout to each HTTP call.
	pub fn with_timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Resource used to scope the token.
	///
	/// Falls back to the target URI authority when no resource was given or it is blank.
	pub fn resource(&self) -> Cow<'_, str> {
		match self.target_resource.as_deref().filter(|value| !value.trim().is_empty()) {
			Some(resource) => Cow::Borrowed(resource),
			None => Cow::Owned(uri_authority(&self.target_uri)),
		}
	}
}

/// Target URI together with the text it was parsed from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TargetUri {
	/// Parsed URI.
	pub url: Url,
	/// Trimmed input text.
	pub input: String,
}
impl FromStr for TargetUri {
	type Err = String;

	fn from_str(raw: &str) -> Result<Self, Self::Err> {
		Ok(Self { url: parse_target_uri(raw)?, input: raw.trim().to_owned() })
	}
}

/// Authority component of `url`: host, plus the port when it is not the scheme default.
///
/// User information is never included.
pub fn uri_authority(url: &Url) -> String {
	let host = url.host_str().unwrap_or_default();

	match url.port() {
		Some(port) => format!("{host}:{port}"),
		None => host.to_owned(),
	}
}

/// Parses an HTTP method case-insensitively, normalizing it to upper case.
pub fn parse_method(raw: &str) -> Result<Method, String> {
	let normalized = raw.trim().to_ascii_uppercase();

	if normalized.is_empty() {
		return Err("HTTP method cannot be empty".into());
	}

	Method::from_bytes(normalized.as_bytes())
		.map_err(|_| format!("`{raw}` is not a valid HTTP method"))
}

/// Parses a target URI, requiring an `http`/`https` scheme and a host.
pub fn parse_target_uri(raw: &str) -> Result<Url, String> {
	let url = Url::parse(raw.trim()).map_err(|e| format!("`{raw}` is not a valid URI: {e}"))?;

	if !matches!(url.scheme(), "http" | "https") {
		return Err(format!("`{raw}` must use http or https"));
	}
	if url.host_str().is_none() {
		return Err(format!("`{raw}` has no host"));
	}

	Ok(url)
}
