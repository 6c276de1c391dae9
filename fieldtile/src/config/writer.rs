//! INI serialization logic for converting `ConfigFile` → INI string.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[tiles]
; Tile server URL. {{s}} is replaced by one of the subdomains, picked at random
; per request; {{z}}, {{x}} and {{y}} by the tile coordinates.
url_template = {}
; Comma-separated values for {{s}}
subdomains = {}
; Sent with every request. Public tile servers require an identifying agent.
user_agent = {}
; Per-request timeout in seconds
timeout_secs = {}
; Retries of a transient failure (network error, HTTP 5xx or 429) during bulk download
max_retries = {}

[cache]
; Directory holding downloaded tiles
directory = {}

[download]
; Zoom range prefetched when none is given on the command line
min_zoom = {}
max_zoom = {}
; Tiles fetched at once (1-8). 1 downloads strictly one tile at a time.
concurrency = {}
; Largest number of tiles a single download may cover (0 = unlimited)
max_tiles = {}

[server]
; Port of the local tile endpoint (bound to 127.0.0.1)
port = {}

[logging]
; Directory for fieldtile.log
directory = {}
"#,
        config.tiles.url_template,
        config.tiles.subdomains.join(","),
        config.tiles.user_agent,
        config.tiles.timeout_secs,
        config.tiles.max_retries,
        path_to_string(&config.cache.directory),
        config.download.min_zoom,
        config.download.max_zoom,
        config.download.concurrency,
        config.download.max_tiles,
        config.server.port,
        path_to_string(&config.logging.directory),
    )
}

/// Render a path, abbreviating the home directory to `~`.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
