//! Tile command - read one tile the way a map view would.

use clap::Args;
use fieldtile::provider::{TileImage, TileSource};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the tile command.
#[derive(Debug, Args)]
pub struct TileArgs {
    /// Zoom level
    pub zoom: u8,

    /// Tile column
    pub x: u32,

    /// Tile row
    pub y: u32,

    /// Write the tile image to this file
    #[arg(long, short)]
    pub output: Option<String>,
}

/// Run the tile command.
pub fn run(runner: &CliRunner, args: TileArgs) -> Result<(), CliError> {
    runner.log_startup("tile");
    let app = runner.start_app()?;
    let provider = app.provider();

    let image = runner.block_on(provider.load_tile(args.zoom, args.x, args.y));
    let key = format!("{}-{}-{}", args.zoom, args.x, args.y);

    let source = match &image {
        TileImage::Cached(_) => "offline cache",
        TileImage::Live(_) => "network (not cached)",
        TileImage::Unavailable { reason, .. } => {
            return Err(CliError::TileUnavailable {
                key,
                reason: reason.clone(),
            });
        }
    };

    let data = image.into_bytes().unwrap_or_default();
    println!("Tile {}: {} bytes from {}", key, data.len(), source);

    if let Some(path) = args.output {
        std::fs::write(&path, &data).map_err(|e| CliError::FileWrite {
            path: path.clone(),
            error: e,
        })?;
        println!("Saved to {}", path);
    }

    Ok(())
}
