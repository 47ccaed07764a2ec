//! Observability helpers: per-stage tracing spans and subscriber setup.
//!
//! Each stage of a run executes inside a span named `oauth2_probe.stage` carrying a `stage`
//! field. Diagnostic events go to stderr so they never interleave with the rendered response on
//! stdout.

mod tracing;

pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Stages of a probe run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Client-credentials exchange with the authority.
	TokenAcquisition,
	/// Authorized request against the target URI.
	AuthorizedRequest,
}
impl Stage {
	/// Returns a stable label suitable for span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::TokenAcquisition => "token_acquisition",
			Stage::AuthorizedRequest => "authorized_request",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
