//! Token endpoint response accepted from any supported authority.

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{AccessToken, RefreshToken, Scope, TokenResponse, basic::BasicTokenType};
use serde::{Deserializer, de};
// self
use crate::_prelude::*;

/// Successful token response.
///
/// Azure AD v1 encodes `expires_in` as a JSON string (`"3599"`), so the lifetime is accepted as
/// either a number or a numeric string. Vendor extras such as `ext_expires_in` and `expires_on`
/// are ignored.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorityTokenResponse {
	access_token: AccessToken,
	token_type: BasicTokenType,
	#[serde(default, deserialize_with = "deserialize_seconds")]
	expires_in: Option<u64>,
	#[serde(default)]
	refresh_token: Option<RefreshToken>,
	#[serde(default, deserialize_with = "deserialize_scopes", skip_serializing)]
	scope: Option<Vec<Scope>>,
}
impl TokenResponse for AuthorityTokenResponse {
	type TokenType = BasicTokenType;

	fn access_token(&self) -> &AccessToken {
		&self.access_token
	}

	fn token_type(&self) -> &Self::TokenType {
		&self.token_type
	}

	fn expires_in(&self) -> Option<StdDuration> {
		self.expires_in.map(StdDuration::from_secs)
	}

	fn refresh_token(&self) -> Option<&RefreshToken> {
		self.refresh_token.as_ref()
	}

	fn scopes(&self) -> Option<&Vec<Scope>> {
		self.scope.as_ref()
	}
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Seconds {
	Number(u64),
	Text(String),
}

fn deserialize_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
	D: Deserializer<'de>,
{
	match Option::<Seconds>::deserialize(deserializer)? {
		None => Ok(None),
		Some(Seconds::Number(seconds)) => Ok(Some(seconds)),
		Some(Seconds::Text(raw)) => raw
			.trim()
			.parse()
			.map(Some)
			.map_err(|_| de::Error::custom(format!("`{raw}` is not a number of seconds"))),
	}
}

fn deserialize_scopes<'de, D>(deserializer: D) -> Result<Option<Vec<Scope>>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	Ok(raw.map(|value| value.split_whitespace().map(|scope| Scope::new(scope.to_owned())).collect()))
}
