//! Entry point that resolves settings from the CLI and config file, initialises
//! tracing, and hands off to `run.rs` for either a windowed session or a
//! headless still export.

mod cli;
mod config;
mod frames;
mod run;

use anyhow::Result;
use config::Settings;

fn main() -> Result<()> {
    let cli = cli::parse();
    let settings = Settings::resolve(&cli)?;
    run::initialise_tracing(settings.log_filter.as_deref());
    run::run(settings)
}
