//! Bulk download requests.

use std::ops::RangeInclusive;

use crate::coord::{self, CoordError, GeoBounds, TileKey, MAX_ZOOM};

/// Default lowest zoom level prefetched for an area.
pub const DEFAULT_MIN_ZOOM: u8 = 13;

/// Default highest zoom level prefetched for an area.
pub const DEFAULT_MAX_ZOOM: u8 = 16;

/// An area and zoom range to prefetch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DownloadRequest {
    pub bounds: GeoBounds,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl DownloadRequest {
    pub fn new(bounds: GeoBounds, min_zoom: u8, max_zoom: u8) -> Self {
        Self {
            bounds,
            min_zoom,
            max_zoom,
        }
    }

    /// Request for the default zoom range (13 to 16).
    pub fn with_default_zooms(bounds: GeoBounds) -> Self {
        Self::new(bounds, DEFAULT_MIN_ZOOM, DEFAULT_MAX_ZOOM)
    }

    /// Rejects inverted zoom ranges, zooms beyond the pyramid, non-finite
    /// coordinates and inverted or antimeridian-crossing bounds.
    pub fn validate(&self) -> Result<(), CoordError> {
        if self.min_zoom > self.max_zoom {
            return Err(CoordError::InvalidZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        if self.max_zoom > MAX_ZOOM {
            return Err(CoordError::InvalidZoom(self.max_zoom));
        }
        self.bounds.validate()
    }

    pub fn zoom_levels(&self) -> RangeInclusive<u8> {
        self.min_zoom..=self.max_zoom
    }

    /// Number of tiles the request covers across all zoom levels.
    pub fn tile_count(&self) -> Result<u64, CoordError> {
        self.validate()?;
        coord::count_tiles(&self.bounds, self.min_zoom, self.max_zoom)
    }

    /// All tiles in download order: zoom ascending, then x, then y.
    ///
    /// Lazy; nothing is allocated per tile.
    pub fn tiles(&self) -> Result<impl Iterator<Item = TileKey>, CoordError> {
        self.validate()?;
        let ranges = self
            .zoom_levels()
            .map(|zoom| coord::tile_range(&self.bounds, zoom))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ranges.into_iter().flatten())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn london() -> GeoBounds {
        GeoBounds::new(51.51, 51.50, -0.09, -0.10)
    }

    #[test]
    fn test_london_default_zooms() {
        let request = DownloadRequest::with_default_zooms(london());
        assert_eq!(request.tile_count().unwrap(), 22);
        assert_eq!(request.tiles().unwrap().count(), 22);
    }

    #[test]
    fn test_single_zoom_london() {
        let request = DownloadRequest::new(london(), 13, 13);
        let tiles: Vec<_> = request.tiles().unwrap().collect();
        assert_eq!(
            tiles,
            vec![
                TileKey::new(13, 4093, 2723).unwrap(),
                TileKey::new(13, 4093, 2724).unwrap(),
            ]
        );
    }

    #[test]
    fn test_tiles_are_ordered_zoom_x_y() {
        let request = DownloadRequest::with_default_zooms(london());
        let tiles: Vec<_> = request.tiles().unwrap().collect();
        let mut sorted = tiles.clone();
        sorted.sort();
        assert_eq!(tiles, sorted);
        assert_eq!(tiles.first().unwrap().zoom, 13);
        assert_eq!(tiles.last().unwrap().zoom, 16);
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let request = DownloadRequest::new(london(), 16, 13);
        assert_eq!(
            request.validate(),
            Err(CoordError::InvalidZoomRange { min: 16, max: 13 })
        );
        assert!(request.tiles().is_err());
    }

    #[test]
    fn test_zoom_beyond_pyramid_rejected() {
        let request = DownloadRequest::new(london(), 13, 23);
        assert_eq!(request.validate(), Err(CoordError::InvalidZoom(23)));
    }

    #[test]
    fn test_non_finite_bounds_rejected() {
        let request = DownloadRequest::new(GeoBounds::new(f64::NAN, 51.5, -0.09, -0.10), 13, 13);
        assert!(matches!(
            request.validate(),
            Err(CoordError::InvalidLatitude(_))
        ));
    }

    #[test]
    fn test_antimeridian_rejected() {
        let request = DownloadRequest::new(GeoBounds::new(10.0, -10.0, -170.0, 170.0), 5, 5);
        assert!(matches!(
            request.validate(),
            Err(CoordError::InvertedBounds(_))
        ));
    }

    #[test]
    fn test_inverted_latitudes_rejected() {
        let request = DownloadRequest::new(GeoBounds::new(51.50, 51.51, -0.09, -0.10), 13, 13);
        assert!(matches!(
            request.validate(),
            Err(CoordError::InvertedBounds(_))
        ));
    }
}
