//! Orchestration of a single probe run: acquire a token, send the authorized request, render.

// std
use std::{process::ExitCode, time::Duration as StdDuration};
// self
use crate::{
	_prelude::*,
	auth::TokenResult,
	console::{ConsoleSink, Line},
	error::clearest_message,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{TokenAcquirer, TokenRequest},
	options::RequestOptions,
	request::RequestExecutor,
};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
	/// No token was acquired; nothing was sent to the target.
	TokenFailed,
	/// The authorized request did not produce a response.
	RequestFailed,
	/// The target answered with `status`.
	Completed {
		/// HTTP status code returned by the target.
		status: u16,
	},
}
impl RunOutcome {
	/// Returns `true` for a completed run with a 2xx status.
	pub fn is_success(self) -> bool {
		matches!(self, RunOutcome::Completed { status } if (200..300).contains(&status))
	}

	/// Process exit status: `0` unless `fail` is set and the run was not successful.
	pub fn exit_status(self, fail: bool) -> u8 {
		u8::from(fail && !self.is_success())
	}

	/// [`RunOutcome::exit_status`] as an [`ExitCode`].
	pub fn exit_code(self, fail: bool) -> ExitCode {
		ExitCode::from(self.exit_status(fail))
	}
}

/// Runs the token acquirer and request executor strictly in sequence.
pub struct Probe<C = ReqwestHttpClient>
where
	C: ?Sized + TokenHttpClient,
{
	acquirer: TokenAcquirer<C>,
	executor: RequestExecutor,
}
impl<C> Probe<C>
where
	C: ?Sized + TokenHttpClient,
{
	/// Assembles a probe from pre-built parts.
	pub fn with_parts(acquirer: TokenAcquirer<C>, executor: RequestExecutor) -> Self {
		Self { acquirer, executor }
	}

	/// Performs one run, emitting every line to `sink`.
	///
	/// The executor is only invoked after a token was acquired.
	pub async fn run<S>(&self, options: &RequestOptions, sink: &mut S) -> RunOutcome
	where
		S: ?Sized + ConsoleSink,
	{
		let token = match self.acquire(options).await {
			Ok(token) => {
				let line = format!("Acquired Bearer Token for AppId {}", options.app_id);

				sink.emit(Line::success(line));

				token
			},
			Err(message) => {
				sink.emit(Line::failure(format!("Failed to get bearer token: {message}")));

				return RunOutcome::TokenFailed;
			},
		};

		sink.emit(Line::neutral(format!("Sending request to {}", options.target_input)));

		match self.executor.execute(options, &token).await {
			Ok(outcome) => {
				let status = outcome.status.as_u16();

				sink.emit_all(outcome.lines());

				RunOutcome::Completed { status }
			},
			Err(e) => {
				tracing::warn!(error = %e, "Authorized request failed.");
				sink.emit(Line::failure(format!("Failed: {}", clearest_message(&e))));

				RunOutcome::RequestFailed
			},
		}
	}

	async fn acquire(&self, options: &RequestOptions) -> Result<TokenResult, String> {
		let request = TokenRequest::new(
			options.app_id.clone(),
			options.app_secret.clone(),
			options.resource(),
			options.authority.clone(),
		)
		.with_quirks(options.quirks);

		self.acquirer.acquire(&request).await.map_err(|e| {
			tracing::warn!(error = %e, "Token acquisition failed.");

			clearest_message(&e)
		})
	}
}
impl Probe<ReqwestHttpClient> {
	/// Builds a probe with fresh reqwest clients sharing the optional `timeout`.
	pub fn new(timeout: Option<StdDuration>) -> Result<Self> {
		Ok(Self::with_parts(TokenAcquirer::new(timeout)?, RequestExecutor::new(timeout)?))
	}
}
impl<C> Debug for Probe<C>
where
	C: ?Sized + TokenHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Probe")
			.field("acquirer", &self.acquirer)
			.field("executor", &self.executor)
			.finish()
	}
}
