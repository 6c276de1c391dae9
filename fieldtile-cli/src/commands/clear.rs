//! Clear command - remove every offline tile.

use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Confirm};

use super::common::format_bytes;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the clear command.
#[derive(Debug, Args)]
pub struct ClearArgs {
    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

/// Run the clear command.
pub fn run(runner: &CliRunner, args: ClearArgs) -> Result<(), CliError> {
    runner.log_startup("clear");
    let app = runner.start_app()?;

    let stats = runner.block_on(app.stats())?;
    println!("Offline tiles at {}", runner.config().cache.directory.display());
    println!("  {} tiles, {}", stats.entries, format_bytes(stats.bytes));
    println!();

    if !args.yes {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Delete all offline tiles?")
            .default(false)
            .interact()
            .map_err(|e| CliError::Config(format!("Confirm error: {}", e)))?;

        if !confirmed {
            println!("Nothing deleted.");
            return Ok(());
        }
    }

    let result = runner.block_on(app.clear())?;
    println!(
        "{} Deleted {} tiles, freed {}",
        style("✓").green(),
        result.entries_removed,
        format_bytes(result.bytes_freed)
    );

    Ok(())
}
