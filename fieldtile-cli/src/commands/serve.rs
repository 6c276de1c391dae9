//! Serve command - expose the offline cache as a local tile endpoint.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use clap::Args;
use console::style;
use fieldtile::provider::TileSource;

use super::common::cancel_on_ctrlc;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the serve command.
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Port on 127.0.0.1 (default from config, 8765)
    #[arg(long, short)]
    pub port: Option<u16>,
}

/// Run the serve command. Blocks until Ctrl+C.
pub fn run(runner: &CliRunner, args: ServeArgs) -> Result<(), CliError> {
    runner.log_startup("serve");
    let app = runner.start_app()?;

    let port = args.port.unwrap_or(runner.config().server.port);
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let source: Arc<dyn TileSource> = app.provider();

    println!("FieldTile tile endpoint v{}", fieldtile::VERSION);
    println!("==========================");
    println!();
    println!("Cache:    {}", runner.config().cache.directory.display());
    let upstream = &app.config().template;
    println!("Upstream: {}", upstream.template());
    if !upstream.subdomains().is_empty() {
        println!("          subdomains {}", upstream.subdomains().join(", "));
    }
    println!("Log:      {}", runner.log_path().display());
    println!();
    println!(
        "Tile URL: {}",
        style(format!("http://{}/tiles/{{z}}/{{x}}/{{y}}.png", addr)).cyan()
    );
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let shutdown = cancel_on_ctrlc("Received shutdown signal, stopping...")?;
    runner
        .block_on(fieldtile::server::serve(source, addr, shutdown))
        .map_err(CliError::Serve)?;

    println!("Tile endpoint stopped.");
    Ok(())
}
