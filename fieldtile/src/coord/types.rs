//! Coordinate type definitions

use std::fmt;
use std::str::FromStr;

/// Web Mercator valid latitude range
pub const MIN_LAT: f64 = -85.05112878;
pub const MAX_LAT: f64 = 85.05112878;

/// Valid longitude range
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Zoom levels supported by the slippy-map pyramid.
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 22;

/// Identifies one raster tile in the slippy-map pyramid.
///
/// The string form `"{zoom}-{x}-{y}"` is used as the storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    /// Zoom level (0-22)
    pub zoom: u8,
    /// X coordinate (east-west), 0 at west
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
}

impl TileKey {
    /// Creates a tile key, checking that `x` and `y` lie inside the grid
    /// for `zoom`.
    pub fn new(zoom: u8, x: u32, y: u32) -> Result<Self, CoordError> {
        if zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(zoom));
        }
        let n = tiles_per_axis(zoom);
        if u64::from(x) >= n || u64::from(y) >= n {
            return Err(CoordError::TileOutOfRange { zoom, x, y });
        }
        Ok(Self { zoom, x, y })
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.zoom, self.x, self.y)
    }
}

impl FromStr for TileKey {
    type Err = CoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CoordError::InvalidKey(s.to_string());
        let mut parts = s.split('-');
        let zoom = parts.next().ok_or_else(invalid)?;
        let x = parts.next().ok_or_else(invalid)?;
        let y = parts.next().ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }

        let zoom = zoom.parse::<u8>().map_err(|_| invalid())?;
        let x = x.parse::<u32>().map_err(|_| invalid())?;
        let y = y.parse::<u32>().map_err(|_| invalid())?;
        TileKey::new(zoom, x, y)
    }
}

/// Number of tiles along one axis at the given zoom level.
#[inline]
pub fn tiles_per_axis(zoom: u8) -> u64 {
    1u64 << zoom
}

/// A rectangular region in geographic coordinates (degrees).
///
/// There is no antimeridian wraparound: `west` is expected to be less than
/// or equal to `east`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl GeoBounds {
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
        }
    }

    /// Checks that the bounds describe a non-degenerate, non-wrapping box.
    ///
    /// Latitudes beyond the Web Mercator limits are accepted here; tile
    /// enumeration clamps them to the projection's valid range.
    pub fn validate(&self) -> Result<(), CoordError> {
        for lat in [self.north, self.south] {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(CoordError::InvalidLatitude(lat));
            }
        }
        for lon in [self.east, self.west] {
            if !lon.is_finite() || !(MIN_LON..=MAX_LON).contains(&lon) {
                return Err(CoordError::InvalidLongitude(lon));
            }
        }
        if self.north < self.south {
            return Err(CoordError::InvertedBounds(
                "north edge is south of the south edge".to_string(),
            ));
        }
        if self.west > self.east {
            return Err(CoordError::InvertedBounds(
                "west edge is east of the east edge (antimeridian crossing is not supported)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Returns true if the point lies inside the bounds (edges included).
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat <= self.north && lat >= self.south && lon >= self.west && lon <= self.east
    }
}

impl fmt::Display for GeoBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "N{:.5} S{:.5} E{:.5} W{:.5}",
            self.north, self.south, self.east, self.west
        )
    }
}

/// Inclusive rectangle of tiles at one zoom level.
///
/// An inverted range (`min > max` on either axis) is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub zoom: u8,
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
}

impl TileRange {
    /// Returns true if the range contains no tiles.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Number of tiles in the range.
    pub fn count(&self) -> u64 {
        if self.is_empty() {
            return 0;
        }
        let width = u64::from(self.max_x - self.min_x) + 1;
        let height = u64::from(self.max_y - self.min_y) + 1;
        width * height
    }

    /// Returns true if the tile lies in this range.
    pub fn contains(&self, key: &TileKey) -> bool {
        key.zoom == self.zoom
            && (self.min_x..=self.max_x).contains(&key.x)
            && (self.min_y..=self.max_y).contains(&key.y)
    }

    /// Iterates the range with x ascending, then y ascending.
    #[inline]
    pub fn iter(&self) -> TileRangeIterator {
        TileRangeIterator {
            range: *self,
            x: self.min_x,
            y: self.min_y,
            remaining: self.count(),
        }
    }
}

impl IntoIterator for TileRange {
    type Item = TileKey;
    type IntoIter = TileRangeIterator;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over all tiles in a [`TileRange`].
#[derive(Debug, Clone)]
pub struct TileRangeIterator {
    range: TileRange,
    x: u32,
    y: u32,
    remaining: u64,
}

impl Iterator for TileRangeIterator {
    type Item = TileKey;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let key = TileKey {
            zoom: self.range.zoom,
            x: self.x,
            y: self.y,
        };
        self.remaining -= 1;

        if self.y < self.range.max_y {
            self.y += 1;
        } else {
            self.y = self.range.min_y;
            self.x = self.x.saturating_add(1);
        }

        Some(key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.remaining).unwrap_or(usize::MAX);
        (remaining, Some(remaining))
    }
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordError {
    /// Latitude is not a finite value in -90 to 90
    InvalidLatitude(f64),
    /// Latitude is valid but beyond the Web Mercator limit (±85.05112878)
    LatitudeOutsideProjection(f64),
    /// Longitude is outside valid range (-180.0 to 180.0)
    InvalidLongitude(f64),
    /// Zoom level is outside valid range (0 to 22)
    InvalidZoom(u8),
    /// Zoom range has min above max
    InvalidZoomRange { min: u8, max: u8 },
    /// Tile x/y lies outside the grid for its zoom level
    TileOutOfRange { zoom: u8, x: u32, y: u32 },
    /// Bounds are inverted or cross the antimeridian
    InvertedBounds(String),
    /// Storage key does not have the `{zoom}-{x}-{y}` shape
    InvalidKey(String),
}

impl fmt::Display for CoordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordError::InvalidLatitude(lat) => {
                write!(f, "Invalid latitude: {} (must be between -90 and 90)", lat)
            }
            CoordError::LatitudeOutsideProjection(lat) => {
                write!(
                    f,
                    "Latitude {} is outside the Web Mercator range ({} to {})",
                    lat, MIN_LAT, MAX_LAT
                )
            }
            CoordError::InvalidLongitude(lon) => {
                write!(
                    f,
                    "Invalid longitude: {} (must be between {} and {})",
                    lon, MIN_LON, MAX_LON
                )
            }
            CoordError::InvalidZoom(zoom) => {
                write!(
                    f,
                    "Invalid zoom level: {} (must be between {} and {})",
                    zoom, MIN_ZOOM, MAX_ZOOM
                )
            }
            CoordError::InvalidZoomRange { min, max } => {
                write!(f, "Invalid zoom range: min {} is above max {}", min, max)
            }
            CoordError::TileOutOfRange { zoom, x, y } => {
                write!(
                    f,
                    "Tile {}/{} is outside the grid at zoom {} (max index {})",
                    x,
                    y,
                    zoom,
                    tiles_per_axis(*zoom).saturating_sub(1)
                )
            }
            CoordError::InvertedBounds(reason) => write!(f, "Invalid bounds: {}", reason),
            CoordError::InvalidKey(key) => {
                write!(f, "Invalid tile key '{}' (expected zoom-x-y)", key)
            }
        }
    }
}

impl std::error::Error for CoordError {}
