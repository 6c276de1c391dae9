//! Loopback HTTP endpoint for map widgets.
//!
//! Exposes any [`TileSource`] as `GET /tiles/{z}/{x}/{y}.png` so a map
//! widget on the same device can point its tile URL at it and get the
//! offline-first behavior for free.
//!
//! | Outcome           | Status | `X-Tile-Source` |
//! |-------------------|--------|-----------------|
//! | Stored tile       | 200    | `cache`         |
//! | Fetched live      | 200    | `network`       |
//! | Unavailable       | 502    | (none)          |
//! | Malformed request | 400    | (none)          |

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::coord::TileKey;
use crate::provider::{TileImage, TileSource};

/// Header telling the client where the tile came from.
pub const TILE_SOURCE_HEADER: HeaderName = HeaderName::from_static("x-tile-source");

/// Build the router.
pub fn router(source: Arc<dyn TileSource>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/tiles/:z/:x/:y", get(tile_handler))
        .with_state(source)
}

/// Serve on `addr` until `shutdown` fires.
pub async fn serve(
    source: Arc<dyn TileSource>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Tile endpoint listening");

    axum::serve(listener, router(source))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Tile endpoint stopped");
    Ok(())
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn tile_handler(
    State(source): State<Arc<dyn TileSource>>,
    Path((z, x, y)): Path<(String, String, String)>,
) -> Response {
    let key = match parse_tile_path(&z, &x, &y) {
        Ok(key) => key,
        Err(reason) => {
            debug!(z = %z, x = %x, y = %y, reason = %reason, "Rejected tile request");
            return (StatusCode::BAD_REQUEST, reason).into_response();
        }
    };

    match source.load_tile(key.zoom, key.x, key.y).await {
        TileImage::Cached(data) => tile_response(data, "cache"),
        TileImage::Live(data) => tile_response(data, "network"),
        TileImage::Unavailable { url, reason } => {
            debug!(key = %key, url = %url, reason = %reason, "Tile unavailable");
            (StatusCode::BAD_GATEWAY, format!("tile unavailable: {}", reason)).into_response()
        }
    }
}

/// Parse `{z}/{x}/{y}` with an optional `.png` suffix on `y`.
fn parse_tile_path(z: &str, x: &str, y: &str) -> Result<TileKey, String> {
    let y = y.strip_suffix(".png").unwrap_or(y);
    let zoom = z.parse::<u8>().map_err(|_| format!("invalid zoom '{}'", z))?;
    let x = x.parse::<u32>().map_err(|_| format!("invalid x '{}'", x))?;
    let y = y.parse::<u32>().map_err(|_| format!("invalid y '{}'", y))?;
    TileKey::new(zoom, x, y).map_err(|e| e.to_string())
}

fn tile_response(data: Vec<u8>, origin: &'static str) -> Response {
    let content_type = image::guess_format(&data)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (TILE_SOURCE_HEADER, HeaderValue::from_static(origin)),
        ],
        data,
    )
        .into_response()
}
