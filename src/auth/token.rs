//! Token issued by the authority and consumed by the authorized request.

// self
use crate::{_prelude::*, auth::Secret};

/// Access token returned by a successful client-credentials exchange.
///
/// The value lives for a single run: it is produced once by the acquirer, consumed once by the
/// executor, and never cached.
#[derive(Clone)]
pub struct TokenResult {
	/// Access token secret; callers must avoid logging it.
	pub access_token: Secret,
	/// Token type as advertised by the authority (`Bearer` for bearer tokens).
	pub token_type: String,
	/// Expiry instant derived from `expires_in`, when the authority supplied one.
	pub expires_at: Option<OffsetDateTime>,
}
impl TokenResult {
	/// Creates a token result without expiry information.
	pub fn new(token_type: impl Into<String>, access_token: impl Into<String>) -> Self {
		Self {
			access_token: Secret::new(access_token),
			token_type: token_type.into(),
			expires_at: None,
		}
	}

	/// Records the expiry instant.
	pub fn with_expires_at(mut self, instant: OffsetDateTime) -> Self {
		self.expires_at = Some(instant);

		self
	}

	/// Value for the `Authorization` header: `<token type> <access token>`.
	pub fn authorization_value(&self) -> String {
		format!("{} {}", self.token_type, self.access_token.expose())
	}
}
impl Debug for TokenResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenResult")
			.field("access_token", &"<redacted>")
			.field("token_type", &self.token_type)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Maps an OAuth `token_type` onto the scheme name used in `Authorization` headers.
///
/// RFC 6750 names the scheme `Bearer`; authorities commonly answer `bearer`.
pub fn canonical_token_type(raw: &str) -> String {
	if raw.eq_ignore_ascii_case("bearer") {
		"Bearer".into()
	} else if raw.eq_ignore_ascii_case("mac") {
		"MAC".into()
	} else {
		raw.to_owned()
	}
}
