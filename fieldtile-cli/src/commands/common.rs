//! Common types and utilities shared across CLI commands.

use tokio_util::sync::CancellationToken;

use crate::error::CliError;

/// Format byte counts as human-readable strings using SI prefixes.
pub fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_000_000_000 {
        format!("{:.2} GB", bytes as f64 / 1_000_000_000.0)
    } else if bytes >= 1_000_000 {
        format!("{:.1} MB", bytes as f64 / 1_000_000.0)
    } else if bytes >= 1_000 {
        format!("{:.1} KB", bytes as f64 / 1_000.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Install a Ctrl-C handler that fires the returned token.
///
/// `message` is printed once when the signal arrives.
pub fn cancel_on_ctrlc(message: &'static str) -> Result<CancellationToken, CliError> {
    let token = CancellationToken::new();
    let handler_token = token.clone();

    ctrlc::set_handler(move || {
        if !handler_token.is_cancelled() {
            eprintln!();
            eprintln!("{}", message);
            handler_token.cancel();
        }
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    Ok(token)
}
