//! Stats command - show what the offline store holds.

use super::common::format_bytes;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the stats command.
pub fn run(runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("stats");
    let app = runner.start_app()?;
    let stats = runner.block_on(app.stats())?;

    println!("Offline store: {}", runner.config().cache.directory.display());
    println!("  Tiles: {}", stats.entries);
    println!("  Size:  {}", format_bytes(stats.bytes));

    Ok(())
}
