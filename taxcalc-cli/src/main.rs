use anyhow::Context;
use clap::Parser;
use tracing::debug;

use taxcalc_cli::app;
use taxcalc_cli::cli::Cli;
use taxcalc_cli::config::AppConfig;
use taxcalc_cli::logging::init_logging;

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let settings = cli.settings(config);

    init_logging(&settings.log_level, settings.log_file.as_deref())?;
    debug!(?settings, "resolved settings");

    let output = app::run(&cli.command, &settings).await?;
    print!("{output}");

    Ok(())
}
