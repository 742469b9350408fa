//! RasterGeometry, GeoExtent - Spatial registration of rasters
//!
//! A georeferenced raster anchors its pixel grid to a coordinate system
//! through a [`RasterGeometry`]: the map coordinate of the top-left outer
//! corner plus the ground size of one pixel. Rows run south from `north`,
//! columns run east from `west`.
//!
//! [`GeoExtent`] is the axis-aligned footprint of a grid. Scans over
//! several rasters operate on the intersection of their extents, which is
//! only meaningful when the grids share a resolution and their cell
//! boundaries coincide; see [`RasterGeometry::aligns_with`].

use crate::error::{Error, Result};

/// Relative tolerance for comparing grid resolutions
const RES_EPS: f64 = 1e-9;

/// Tolerance, in cells, for deciding that a map coordinate lands on a
/// cell boundary
const CELL_EPS: f64 = 1e-6;

/// Spatial registration of a pixel grid
///
/// Resolutions are positive ground distances per pixel; `north` is the
/// top edge, so row `r` covers map `y` in `[north - (r+1)*y_res, north - r*y_res)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterGeometry {
    /// Map x of the left edge of the first column
    pub west: f64,
    /// Map y of the top edge of the first row
    pub north: f64,
    /// Pixel width in map units (positive)
    pub x_res: f64,
    /// Pixel height in map units (positive)
    pub y_res: f64,
}

impl RasterGeometry {
    /// Create a registration from the top-left corner and pixel size
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if either resolution is not a
    /// positive finite number, or if the origin is not finite.
    pub fn new(west: f64, north: f64, x_res: f64, y_res: f64) -> Result<Self> {
        if !(x_res.is_finite() && y_res.is_finite() && x_res > 0.0 && y_res > 0.0) {
            return Err(Error::InvalidParameter(format!(
                "pixel resolution must be positive and finite: {x_res}x{y_res}"
            )));
        }
        if !(west.is_finite() && north.is_finite()) {
            return Err(Error::InvalidParameter(format!(
                "grid origin must be finite: ({west}, {north})"
            )));
        }
        Ok(Self {
            west,
            north,
            x_res,
            y_res,
        })
    }

    /// Create a square-pixel registration
    pub fn square(west: f64, north: f64, res: f64) -> Result<Self> {
        Self::new(west, north, res, res)
    }

    /// Footprint of a grid of `width` x `height` pixels under this
    /// registration
    pub fn extent(&self, width: usize, height: usize) -> GeoExtent {
        GeoExtent {
            west: self.west,
            east: self.west + width as f64 * self.x_res,
            south: self.north - height as f64 * self.y_res,
            north: self.north,
        }
    }

    /// Whether two registrations share a resolution and their cell
    /// boundaries coincide
    ///
    /// Grids align when the resolutions match (relative tolerance) and
    /// the offset between the two origins is a whole number of cells.
    pub fn aligns_with(&self, other: &RasterGeometry) -> bool {
        same_res(self.x_res, other.x_res)
            && same_res(self.y_res, other.y_res)
            && on_cell_boundary((other.west - self.west) / self.x_res)
            && on_cell_boundary((self.north - other.north) / self.y_res)
    }

    /// Pixel column/row of `extent`'s top-left corner on this grid
    ///
    /// Returns `None` when the corner does not land on a cell boundary
    /// or lies outside the grid origin.
    pub fn cell_offset(&self, extent: &GeoExtent) -> Option<(usize, usize)> {
        let col = (extent.west - self.west) / self.x_res;
        let row = (self.north - extent.north) / self.y_res;
        Some((to_cell_index(col)?, to_cell_index(row)?))
    }

    /// Number of whole cells `extent` spans on this grid
    ///
    /// Returns `None` when the extent does not span a whole number of
    /// cells in either direction.
    pub fn cell_span(&self, extent: &GeoExtent) -> Option<(usize, usize)> {
        let cols = (extent.east - extent.west) / self.x_res;
        let rows = (extent.north - extent.south) / self.y_res;
        Some((to_cell_index(cols)?, to_cell_index(rows)?))
    }
}

/// An axis-aligned rectangle in map coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoExtent {
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
}

impl GeoExtent {
    /// Width in map units
    #[inline]
    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    /// Height in map units
    #[inline]
    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    /// Compute the intersection of two extents
    ///
    /// Returns `None` when the extents do not overlap by a positive
    /// area.
    pub fn intersect(&self, other: &GeoExtent) -> Option<GeoExtent> {
        let west = self.west.max(other.west);
        let east = self.east.min(other.east);
        let south = self.south.max(other.south);
        let north = self.north.min(other.north);

        if west < east && south < north {
            Some(GeoExtent {
                west,
                east,
                south,
                north,
            })
        } else {
            None
        }
    }
}

#[inline]
fn same_res(a: f64, b: f64) -> bool {
    (a - b).abs() <= RES_EPS * a.abs().max(b.abs())
}

/// Snap a fractional cell coordinate to an index, rejecting values that
/// are negative or off a cell boundary
#[inline]
fn to_cell_index(cells: f64) -> Option<usize> {
    let snapped = cells.round();
    if (cells - snapped).abs() > CELL_EPS || snapped < 0.0 {
        return None;
    }
    Some(snapped as usize)
}

#[inline]
fn on_cell_boundary(cells: f64) -> bool {
    (cells - cells.round()).abs() <= CELL_EPS
}
