//! FieldTile CLI - Command-line interface
//!
//! Prefetch map tiles for an area, inspect and clear the offline store, and
//! serve cached tiles to a local map view.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};

use commands::clear::ClearArgs;
use commands::config::ConfigCommands;
use commands::download::DownloadArgs;
#[cfg(feature = "server")]
use commands::serve::ServeArgs;
use commands::tile::TileArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "fieldtile")]
#[command(version = fieldtile::VERSION)]
#[command(about = "Offline map tiles: prefetch an area, read it back without a network", long_about = None)]
struct Cli {
    /// Mirror log output to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download every tile of an area for offline use
    Download(DownloadArgs),

    /// Read one tile, from the offline store if present
    Tile(TileArgs),

    /// Delete all offline tiles
    Clear(ClearArgs),

    /// Show offline store size
    Stats,

    /// Serve tiles on a local HTTP endpoint
    #[cfg(feature = "server")]
    Serve(ServeArgs),

    /// View and edit configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let verbose = cli.verbose;

    match cli.command {
        // No logging or runtime needed
        Commands::Config { command } => commands::config::run(command),
        Commands::Download(args) => commands::download::run(&CliRunner::new(verbose)?, args),
        Commands::Tile(args) => commands::tile::run(&CliRunner::new(verbose)?, args),
        Commands::Clear(args) => commands::clear::run(&CliRunner::new(verbose)?, args),
        Commands::Stats => commands::stats::run(&CliRunner::new(verbose)?),
        #[cfg(feature = "server")]
        Commands::Serve(args) => commands::serve::run(&CliRunner::new(verbose)?, args),
    }
}
