//! Console output: styled lines, pure rendering, and output sinks.
//!
//! Components emit [`Line`] values (`text` plus a [`Style`] hint). Rendering is a pure function
//! of a line and a color switch; only [`TerminalSink`] touches the terminal.

// std
use std::io::{self, Write};
// crates.io
use owo_colors::OwoColorize;
// self
use crate::_prelude::*;

/// Presentation hint attached to each line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Style {
	/// Operation succeeded (green).
	Success,
	/// Operation failed (red).
	Failure,
	#[default]
	/// Plain informational text.
	Neutral,
}

/// One line of console output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Line {
	/// Text without a trailing newline.
	pub text: String,
	/// Presentation hint.
	pub style: Style,
}
impl Line {
	/// Creates a line with an explicit style.
	pub fn new(text: impl Into<String>, style: Style) -> Self {
		Self { text: text.into(), style }
	}

	/// Creates a success-styled line.
	pub fn success(text: impl Into<String>) -> Self {
		Self::new(text, Style::Success)
	}

	/// Creates a failure-styled line.
	pub fn failure(text: impl Into<String>) -> Self {
		Self::new(text, Style::Failure)
	}

	/// Creates an unstyled line.
	pub fn neutral(text: impl Into<String>) -> Self {
		Self::new(text, Style::Neutral)
	}
}
impl Display for Line {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.text)
	}
}

/// Renders `line` for output, applying ANSI colors only when `color` is set.
pub fn render(line: &Line, color: bool) -> String {
	if !color {
		return line.text.clone();
	}

	match line.style {
		Style::Success => line.text.green().to_string(),
		Style::Failure => line.text.red().to_string(),
		Style::Neutral => line.text.clone(),
	}
}

/// Destination for console lines.
pub trait ConsoleSink {
	/// Emits a single line.
	fn emit(&mut self, line: Line);

	/// Emits every line in order.
	fn emit_all(&mut self, lines: Vec<Line>) {
		for line in lines {
			self.emit(line);
		}
	}
}

/// Sink writing rendered lines to a terminal stream.
pub struct TerminalSink<W = io::Stdout>
where
	W: Write,
{
	writer: W,
	color: bool,
}
impl TerminalSink<io::Stdout> {
	/// Writes to stdout.
	pub fn stdout(color: bool) -> Self {
		Self::with_writer(io::stdout(), color)
	}
}
impl<W> TerminalSink<W>
where
	W: Write,
{
	/// Writes to an arbitrary stream.
	pub fn with_writer(writer: W, color: bool) -> Self {
		Self { writer, color }
	}

	/// Returns the wrapped stream.
	pub fn into_inner(self) -> W {
		self.writer
	}
}
impl<W> ConsoleSink for TerminalSink<W>
where
	W: Write,
{
	fn emit(&mut self, line: Line) {
		if let Err(e) = writeln!(self.writer, "{}", render(&line, self.color)) {
			tracing::debug!(error = %e, "Failed to write console line.");
		}
	}
}
impl<W> Debug for TerminalSink<W>
where
	W: Write,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TerminalSink").field("color", &self.color).finish_non_exhaustive()
	}
}

/// Sink collecting lines in memory.
#[derive(Clone, Debug, Default)]
pub struct BufferSink {
	lines: Vec<Line>,
}
impl BufferSink {
	/// Lines emitted so far.
	pub fn lines(&self) -> &[Line] {
		&self.lines
	}

	/// Returns `true` when any emitted line contains `needle`.
	pub fn contains(&self, needle: &str) -> bool {
		self.lines.iter().any(|line| line.text.contains(needle))
	}

	/// First line whose text starts with `prefix`.
	pub fn find(&self, prefix: &str) -> Option<&Line> {
		self.lines.iter().find(|line| line.text.starts_with(prefix))
	}

	/// Plain-text transcript, one line per emitted line.
	pub fn transcript(&self) -> String {
		self.lines.iter().map(|line| format!("{}\n", line.text)).collect()
	}
}
impl ConsoleSink for BufferSink {
	fn emit(&mut self, line: Line) {
		self.lines.push(line);
	}
}
