//! `oauth2-probe` binary entry point.

// std
use std::process::ExitCode;
// crates.io
use clap::Parser;
// self
use oauth2_probe::{cli::Cli, console::TerminalSink, obs, probe::Probe};

#[tokio::main(flavor = "current_thread")]
async fn main() -> color_eyre::Result<ExitCode> {
	color_eyre::install()?;

	let cli = Cli::parse();

	obs::init_tracing(cli.verbose);

	let options = cli.to_options();
	let probe = Probe::new(options.timeout)?;
	let mut sink = TerminalSink::stdout(cli.color_enabled());
	let outcome = probe.run(&options, &mut sink).await;

	tracing::debug!(?outcome, "Probe finished.");

	Ok(outcome.exit_code(cli.fail))
}
