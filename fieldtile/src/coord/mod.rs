//! Coordinate conversion module
//!
//! Maps geographic coordinates (latitude/longitude) onto the Web Mercator
//! slippy-map tile grid used by raster tile servers, and enumerates the tiles
//! covering a bounding box.

mod types;

pub use types::{
    tiles_per_axis, CoordError, GeoBounds, TileKey, TileRange, TileRangeIterator, MAX_LAT,
    MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

use std::f64::consts::PI;

/// Converts a longitude to the tile X index at `zoom`.
///
/// This is the raw `floor(((lon + 180) / 360) * 2^zoom)`; `lon = 180` yields
/// `2^zoom`, one past the last column. Callers that need a valid index clamp.
#[inline]
pub fn lon_to_tile_x(lon: f64, zoom: u8) -> i64 {
    let n = tiles_per_axis(zoom) as f64;
    ((lon + 180.0) / 360.0 * n).floor() as i64
}

/// Converts a latitude to the tile Y index at `zoom` (Web Mercator).
///
/// Y grows southward. Results near ±90° are meaningless; tile enumeration
/// clamps latitudes to [`MIN_LAT`, `MAX_LAT`] before calling this.
#[inline]
pub fn lat_to_tile_y(lat: f64, zoom: u8) -> i64 {
    let n = tiles_per_axis(zoom) as f64;
    let lat_rad = lat.to_radians();
    ((1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n).floor() as i64
}

/// Clamps a raw tile index into `0..2^zoom`.
#[inline]
fn clamp_index(index: i64, zoom: u8) -> u32 {
    let max_index = tiles_per_axis(zoom) as i64 - 1;
    index.clamp(0, max_index) as u32
}

/// Converts a single point to the tile containing it.
///
/// # Arguments
///
/// * `lat` - Latitude in degrees (-85.05112878 to 85.05112878)
/// * `lon` - Longitude in degrees (-180.0 to 180.0)
/// * `zoom` - Zoom level (0 to 22)
pub fn tile_for_point(lat: f64, lon: f64, zoom: u8) -> Result<TileKey, CoordError> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(CoordError::InvalidLatitude(lat));
    }
    if !(MIN_LAT..=MAX_LAT).contains(&lat) {
        return Err(CoordError::LatitudeOutsideProjection(lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&lon) {
        return Err(CoordError::InvalidLongitude(lon));
    }
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    Ok(TileKey {
        zoom,
        x: clamp_index(lon_to_tile_x(lon, zoom), zoom),
        y: clamp_index(lat_to_tile_y(lat, zoom), zoom),
    })
}

/// Returns the latitude/longitude of the tile's north-west corner.
#[inline]
pub fn tile_to_lat_lon(key: &TileKey) -> (f64, f64) {
    let n = tiles_per_axis(key.zoom) as f64;

    let lon = key.x as f64 / n * 360.0 - 180.0;

    // Inverse Web Mercator
    let y = key.y as f64 / n;
    let lat = (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees();

    (lat, lon)
}

/// Computes the inclusive tile rectangle covering `bounds` at `zoom`.
///
/// North maps to the smaller Y. Latitudes are clamped to the Web Mercator
/// limits and indices to the grid, so pole-adjacent bounds enumerate the
/// outermost row instead of overflowing. Bounds with `west > east` or
/// `north < south` produce an empty range.
pub fn tile_range(bounds: &GeoBounds, zoom: u8) -> Result<TileRange, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let north = bounds.north.clamp(MIN_LAT, MAX_LAT);
    let south = bounds.south.clamp(MIN_LAT, MAX_LAT);

    let mut range = TileRange {
        zoom,
        min_x: clamp_index(lon_to_tile_x(bounds.west, zoom), zoom),
        max_x: clamp_index(lon_to_tile_x(bounds.east, zoom), zoom),
        min_y: clamp_index(lat_to_tile_y(north, zoom), zoom),
        max_y: clamp_index(lat_to_tile_y(south, zoom), zoom),
    };

    // Clamping can fold an inverted input back onto a single edge tile.
    if bounds.west > bounds.east {
        range.min_x = range.max_x.saturating_add(1);
    }
    if bounds.north < bounds.south {
        range.min_y = range.max_y.saturating_add(1);
    }

    Ok(range)
}

/// Enumerates every tile covering `bounds` at `zoom`, x ascending then y
/// ascending.
pub fn tiles_covering_bounds(bounds: &GeoBounds, zoom: u8) -> Result<Vec<TileKey>, CoordError> {
    Ok(tile_range(bounds, zoom)?.iter().collect())
}

/// Counts the tiles covering `bounds` across an inclusive zoom range.
pub fn count_tiles(bounds: &GeoBounds, min_zoom: u8, max_zoom: u8) -> Result<u64, CoordError> {
    if min_zoom > max_zoom {
        return Err(CoordError::InvalidZoomRange {
            min: min_zoom,
            max: max_zoom,
        });
    }

    let mut total = 0u64;
    for zoom in min_zoom..=max_zoom {
        total = total.saturating_add(tile_range(bounds, zoom)?.count());
    }
    Ok(total)
}
