//! Authorized request execution.
//!
//! [`RequestExecutor`] replays the caller's request against the target URI with the acquired
//! token in the `Authorization` header and captures status, headers, and body as an
//! [`HttpOutcome`]. Any HTTP status is a completed request; only transport failures are errors.

pub mod headers;
pub mod render;

pub use headers::*;
pub use render::*;

// std
use std::time::{Duration as StdDuration, Instant};
// crates.io
use reqwest::{
	Method, Request, StatusCode,
	header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue},
};
// self
use crate::{
	_prelude::*,
	auth::TokenResult,
	console::Line,
	error::{ConfigError, RequestExecutionError},
	obs::{Stage, StageSpan},
	options::RequestOptions,
};

/// Content type attached to every `POST` body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Status, headers, and body captured from the target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpOutcome {
	/// Response status.
	pub status: StatusCode,
	/// Response-level headers as `(name, comma-joined values)`.
	pub response_headers: Vec<(String, String)>,
	/// Content-level headers as `(name, comma-joined values)`.
	pub content_headers: Vec<(String, String)>,
	/// Response body decoded as text.
	pub body: String,
}
impl HttpOutcome {
	/// Returns `true` for 2xx statuses.
	pub fn is_success(&self) -> bool {
		self.status.is_success()
	}

	/// Console lines describing this outcome.
	pub fn lines(&self) -> Vec<Line> {
		outcome_lines(self)
	}
}

/// Sends the authorized request to the target.
#[derive(Clone, Debug)]
pub struct RequestExecutor {
	client: ReqwestClient,
}
impl RequestExecutor {
	/// Builds an executor with reqwest's default redirect policy and an optional timeout.
	pub fn new(timeout: Option<StdDuration>) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self::with_client(builder.build()?))
	}

	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self { client }
	}

	/// Assembles the request without sending it.
	///
	/// The `Authorization` header is `<token_type> <access_token>` and is marked sensitive. Only
	/// `POST` carries a body: the caller's body (empty when absent) with
	/// `Content-Type: application/json`. Other methods never send one.
	pub fn build_request(
		&self,
		options: &RequestOptions,
		token: &TokenResult,
	) -> Result<Request, RequestExecutionError> {
		let mut authorization = HeaderValue::from_str(&token.authorization_value())
			.map_err(|source| RequestExecutionError::InvalidHeader { source })?;

		authorization.set_sensitive(true);

		let mut builder = self
			.client
			.request(options.method.clone(), options.target_uri.clone())
			.header(AUTHORIZATION, authorization);

		if options.method == Method::POST {
			builder = builder
				.header(CONTENT_TYPE, JSON_CONTENT_TYPE)
				.body(options.body.clone().unwrap_or_default());
		} else if options.body.is_some() {
			tracing::debug!(method = %options.method, "Ignoring request body for non-POST method.");
		}

		builder.build().map_err(|source| RequestExecutionError::Build {
			url: options.target_uri.to_string(),
			source,
		})
	}

	/// Sends the authorized request and captures the response.
	pub async fn execute(
		&self,
		options: &RequestOptions,
		token: &TokenResult,
	) -> Result<HttpOutcome, RequestExecutionError> {
		let span = StageSpan::new(Stage::AuthorizedRequest);

		span.instrument(async move {
			let request = self.build_request(options, token)?;
			let url = options.target_uri.to_string();
			let started = Instant::now();

			tracing::debug!(method = %options.method, url = %url, "Sending authorized request.");

			let response = self
				.client
				.execute(request)
				.await
				.map_err(|source| RequestExecutionError::Send { url: url.clone(), source })?;
			let status = response.status();
			let SplitHeaders { response: response_headers, content: content_headers } =
				split_headers(response.headers());
			let body = response
				.text()
				.await
				.map_err(|source| RequestExecutionError::Body { url: url.clone(), source })?;

			tracing::info!(
				status = status.as_u16(),
				elapsed_ms = started.elapsed().as_millis() as u64,
				body_len = body.len(),
				"Target responded."
			);

			Ok(HttpOutcome { status, response_headers, content_headers, body })
		})
		.await
	}
}
