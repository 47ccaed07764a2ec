//! Header classification and display helpers.

// crates.io
use reqwest::header::HeaderMap;

/// Header names that belong to the response content rather than the response itself.
const CONTENT_HEADERS: &[&str] = &[
	"allow",
	"content-disposition",
	"content-encoding",
	"content-language",
	"content-length",
	"content-location",
	"content-md5",
	"content-range",
	"content-type",
	"expires",
	"last-modified",
];
/// Names whose conventional spelling is not plain title case.
const SPELLING_EXCEPTIONS: &[(&str, &str)] = &[
	("content-md5", "Content-MD5"),
	("dnt", "DNT"),
	("etag", "ETag"),
	("te", "TE"),
	("www-authenticate", "WWW-Authenticate"),
	("x-xss-protection", "X-XSS-Protection"),
];

/// Response headers split the way they are rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SplitHeaders {
	/// Response-level headers as `(name, comma-joined values)`.
	pub response: Vec<(String, String)>,
	/// Content-level headers as `(name, comma-joined values)`.
	pub content: Vec<(String, String)>,
}

/// Returns `true` when `name` describes the payload (`Content-Type`, `Expires`, ...).
pub fn is_content_header(name: &str) -> bool {
	CONTENT_HEADERS.iter().any(|known| known.eq_ignore_ascii_case(name))
}

/// Canonical display spelling of a header name (`x-test` becomes `X-Test`).
pub fn display_name(name: &str) -> String {
	if let Some((_, spelled)) =
		SPELLING_EXCEPTIONS.iter().find(|(lower, _)| lower.eq_ignore_ascii_case(name))
	{
		return (*spelled).to_owned();
	}

	name.split('-')
		.map(|segment| {
			let mut chars = segment.chars();

			match chars.next() {
				Some(first) =>
					first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join("-")
}

/// Groups `headers` by name in first-seen order, joining repeated values with `", "`.
pub fn split_headers(headers: &HeaderMap) -> SplitHeaders {
	let mut split = SplitHeaders::default();

	for name in headers.keys() {
		let value = headers
			.get_all(name)
			.iter()
			.map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
			.collect::<Vec<_>>()
			.join(", ");
		let entry = (display_name(name.as_str()), value);

		if is_content_header(name.as_str()) {
			split.content.push(entry);
		} else {
			split.response.push(entry);
		}
	}

	split
}
