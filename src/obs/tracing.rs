// crates.io
use tracing::{Instrument, Span, instrument::Instrumented};
use tracing_subscriber::EnvFilter;
// self
use crate::{_prelude::*, obs::Stage};

/// A span wrapper used by probe stages.
#[derive(Clone, Debug)]
pub struct StageSpan {
	span: Span,
}
impl StageSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: Stage) -> Self {
		let span = tracing::info_span!("oauth2_probe.stage", stage = stage.as_str());

		Self { span }
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> Instrumented<Fut>
	where
		Fut: Future,
	{
		fut.instrument(self.span.clone())
	}
}

/// Maps `-v` occurrences onto a default filter directive.
pub fn verbosity_directive(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "warn",
		1 => "info",
		2 => "debug",
		_ => "trace",
	}
}

/// Installs the global stderr subscriber.
///
/// `RUST_LOG` takes precedence over `verbosity`. Installing twice is a no-op.
pub fn init_tracing(verbosity: u8) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(verbosity_directive(verbosity)));
	let _ = tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init();
}
