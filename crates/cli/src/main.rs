//! CourseQA CLI - Main Entry Point
//!
//! Regenerates one browser spec file per landing page from the topic spec
//! files. Runs with no arguments using the suite's default layout.

use anyhow::Context;
use clap::Parser;

use courseqa_cli::{output, Cli};
use courseqa_e2e::Generator;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.generator_config().context("invalid configuration")?;
    tracing::debug!(?config, "resolved configuration");

    let report = Generator::new(config)
        .run()
        .context("page test generation failed")?;

    output::print_report(&report, cli.format);
    Ok(())
}
