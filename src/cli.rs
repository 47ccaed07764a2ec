//! Command-line surface of the `oauth2-probe` binary.

// std
use std::{
	io::{self, IsTerminal},
	time::Duration as StdDuration,
};
// crates.io
use clap::{ArgAction, Parser};
use reqwest::Method;
// self
use crate::{
	auth::Secret,
	authority::{
		AuthorityQuirks, ClientAuthMethod, DEFAULT_AUTHORITY, EndpointConvention, ResourceParameter,
	},
	options::{RequestOptions, TargetUri, parse_method},
};

/// Acquire an app-only OAuth 2.0 token and send one authorized request with it.
#[derive(Debug, Parser)]
#[command(name = "oauth2-probe", version, about)]
pub struct Cli {
	/// Application (client) id.
	#[arg(short = 'i', long = "appid")]
	pub app_id: String,
	/// Application secret.
	#[arg(short = 's', long = "secret")]
	pub secret: Secret,
	/// Target URI of the authorized request.
	#[arg(short = 'u', long = "uri")]
	pub uri: TargetUri,
	/// HTTP method, case-insensitive.
	#[arg(short = 'm', long, default_value = "GET", value_parser = parse_method)]
	pub method: Method,
	/// JSON body, sent only with POST.
	#[arg(short = 'b', long)]
	pub body: Option<String>,
	/// Resource the token is requested for; defaults to the target URI authority.
	#[arg(short = 't', long = "target-resource", alias = "targetResource")]
	pub target_resource: Option<String>,
	/// Authority URL.
	#[arg(short = 'a', long, default_value = DEFAULT_AUTHORITY)]
	pub authority: String,
	/// How the token endpoint is derived from the authority.
	#[arg(long, value_enum, default_value_t = EndpointConvention::Aad)]
	pub endpoint_convention: EndpointConvention,
	/// Token request field naming the target resource.
	#[arg(long, value_enum, default_value_t = ResourceParameter::Resource)]
	pub resource_parameter: ResourceParameter,
	/// How the application authenticates at the token endpoint.
	#[arg(long, value_enum, default_value_t = ClientAuthMethod::ClientSecretPost)]
	pub client_auth: ClientAuthMethod,
	/// Timeout in seconds applied to each HTTP call.
	#[arg(long, value_name = "SECS")]
	pub timeout: Option<u64>,
	/// Exit non-zero on token or request failure and on non-2xx statuses.
	#[arg(long)]
	pub fail: bool,
	/// Disable ANSI colors.
	#[arg(long)]
	pub no_color: bool,
	/// Increase diagnostic verbosity on stderr (repeatable).
	#[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
	pub verbose: u8,
}
impl Cli {
	/// Converts the parsed arguments into run options.
	pub fn to_options(&self) -> RequestOptions {
		let mut options =
			RequestOptions::new(self.app_id.clone(), self.secret.clone(), self.uri.url.clone())
				.with_target(self.uri.clone())
				.with_method(self.method.clone())
				.with_authority(self.authority.clone())
				.with_quirks(self.quirks());

		if let Some(body) = &self.body {
			options = options.with_body(body.clone());
		}
		if let Some(resource) = &self.target_resource {
			options = options.with_target_resource(resource.clone());
		}
		if let Some(timeout) = self.timeout() {
			options = options.with_timeout(timeout);
		}

		options
	}

	/// Authority quirks selected on the command line.
	pub fn quirks(&self) -> AuthorityQuirks {
		AuthorityQuirks {
			endpoint_convention: self.endpoint_convention,
			client_auth: self.client_auth,
			resource_parameter: self.resource_parameter,
		}
	}

	/// Per-call timeout, if any.
	pub fn timeout(&self) -> Option<StdDuration> {
		self.timeout.map(StdDuration::from_secs)
	}

	/// Whether stdout output should be colored.
	pub fn color_enabled(&self) -> bool {
		let no_color_env = std::env::var_os("NO_COLOR").is_some();

		color_allowed(self.no_color, no_color_env, io::stdout().is_terminal())
	}
}

/// Colors are used only on a terminal, and never when disabled by flag or `NO_COLOR`.
pub fn color_allowed(no_color_flag: bool, no_color_env: bool, is_terminal: bool) -> bool {
	!no_color_flag && !no_color_env && is_terminal
}
