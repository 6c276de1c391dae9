//! Download command - prefetch every tile of an area for offline use.

use clap::Args;
use console::style;
use fieldtile::coord::{count_tiles, GeoBounds};
use fieldtile::download::{DownloadError, DownloadPhase, DownloadProgress, DownloadRequest};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use super::common::cancel_on_ctrlc;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the download command.
#[derive(Debug, Args)]
pub struct DownloadArgs {
    /// Northern edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub north: f64,

    /// Southern edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub south: f64,

    /// Eastern edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub east: f64,

    /// Western edge in decimal degrees
    #[arg(long, allow_negative_numbers = true)]
    pub west: f64,

    /// Lowest zoom level (default from config, 13)
    #[arg(long)]
    pub min_zoom: Option<u8>,

    /// Highest zoom level (default from config, 16)
    #[arg(long)]
    pub max_zoom: Option<u8>,

    /// Tiles fetched at once, 1-8 (default from config, 1)
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Only count the tiles, download nothing
    #[arg(long)]
    pub dry_run: bool,
}

impl DownloadArgs {
    fn bounds(&self) -> GeoBounds {
        GeoBounds::new(self.north, self.south, self.east, self.west)
    }
}

/// Run the download command.
pub fn run(runner: &CliRunner, args: DownloadArgs) -> Result<(), CliError> {
    runner.log_startup("download");
    let settings = &runner.config().download;

    let request = DownloadRequest::new(
        args.bounds(),
        args.min_zoom.unwrap_or(settings.min_zoom),
        args.max_zoom.unwrap_or(settings.max_zoom),
    );
    let total = request.tile_count().map_err(DownloadError::from)?;

    println!("Area:  {}", request.bounds);
    println!("Zooms: {}-{}", request.min_zoom, request.max_zoom);
    println!("Tiles: {}", total);
    println!();

    if args.dry_run {
        for zoom in request.zoom_levels() {
            let count = count_tiles(&request.bounds, zoom, zoom).map_err(DownloadError::from)?;
            println!("  zoom {:>2}: {:>8} tiles", zoom, count);
        }
        if settings.max_tiles > 0 && total > settings.max_tiles {
            println!();
            println!(
                "{} {} tiles is above the limit of {}",
                style("!").yellow(),
                total,
                settings.max_tiles
            );
        }
        return Ok(());
    }

    let app = runner.start_app()?;
    let mut downloader = app.downloader();
    if let Some(concurrency) = args.concurrency {
        downloader = downloader.with_concurrency(concurrency);
    }

    let cancel = cancel_on_ctrlc("Stopping after the current tile...")?;

    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> "),
    );

    let sink = |progress: &DownloadProgress| {
        bar.set_position(progress.processed_tiles());
        match progress.phase {
            DownloadPhase::Downloading => {
                if progress.failed_tiles > 0 {
                    bar.set_message(format!("({} failed)", progress.failed_tiles));
                }
            }
            _ => bar.println(progress.to_string()),
        }
    };

    let result = runner.block_on(downloader.download_with_cancel(&request, &sink, &cancel));
    bar.finish_and_clear();
    let report = result?;

    info!(
        completed = report.completed,
        failed = report.failed,
        cancelled = report.cancelled,
        "Download command finished"
    );

    println!();
    println!("Saved:   {} of {} tiles", report.completed, report.total);
    println!("  New:            {}", report.downloaded);
    println!("  Already cached: {}", report.already_cached);
    if report.failed > 0 {
        println!("  {}         {}", style("Failed:").yellow(), report.failed);
    }
    println!("Elapsed: {:.1}s", report.elapsed.as_secs_f64());

    if !report.is_complete() {
        println!();
        println!("Run the same command again to fetch the missing tiles.");
    }

    Ok(())
}
