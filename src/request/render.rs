//! Turns an [`HttpOutcome`] into console lines.

// self
use crate::{
	console::{Line, Style},
	request::HttpOutcome,
};

const RULE: &str = "================";

/// Style for lines describing a response with this status.
pub fn status_style(outcome: &HttpOutcome) -> Style {
	if outcome.status.is_success() { Style::Success } else { Style::Failure }
}

/// `Response Code: <code> (<reason>)`.
pub fn status_text(outcome: &HttpOutcome) -> String {
	let status = outcome.status;

	format!(
		"Response Code: {} ({})",
		status.as_u16(),
		status.canonical_reason().unwrap_or(status.as_str())
	)
}

/// Renders the three response blocks: headers, content headers, and body.
pub fn outcome_lines(outcome: &HttpOutcome) -> Vec<Line> {
	let style = status_style(outcome);
	let mut lines = Vec::with_capacity(
		outcome.response_headers.len() + outcome.content_headers.len() + 10,
	);

	push_heading(&mut lines, "Response Headers");
	lines.push(Line::new(status_text(outcome), style));
	lines.extend(header_lines(&outcome.response_headers, style));
	push_heading(&mut lines, "Content Headers");
	lines.extend(header_lines(&outcome.content_headers, style));
	push_heading(&mut lines, "Response Content");
	lines.push(Line::neutral(outcome.body.clone()));

	lines
}

fn push_heading(lines: &mut Vec<Line>, title: &str) {
	lines.push(Line::neutral(""));
	lines.push(Line::neutral(title));
	lines.push(Line::neutral(RULE));
}

fn header_lines(headers: &[(String, String)], style: Style) -> impl Iterator<Item = Line> + '_ {
	headers.iter().map(move |(name, value)| Line::new(format!("{name} = {value}"), style))
}
