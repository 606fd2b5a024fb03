#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Two coordinate spaces exist and never mix implicitly:
//!
//! - **Grid space**: 1-indexed cell coordinates ([`GridRect`], [`GridSize`]).
//! - **Pixel space**: floating point pixels ([`PixelRect`], [`PixelSize`]).
//!
//! [`CellSize`] is the only bridge between them.

use std::num::NonZeroU16;

use serde::{Deserialize, Serialize};

/// Pixel edge length of one grid cell (the dashboard "density").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct CellSize(NonZeroU16);

impl CellSize {
    /// One pixel per cell.
    pub const MIN: Self = Self(NonZeroU16::MIN);

    /// Create a cell size, rejecting zero.
    #[must_use]
    pub const fn new(px: u16) -> Option<Self> {
        match NonZeroU16::new(px) {
            Some(value) => Some(Self(value)),
            None => None,
        }
    }

    /// Pixel edge length.
    #[inline]
    #[must_use]
    pub const fn px(self) -> u16 {
        self.0.get()
    }

    /// Convert a pixel length to whole cells, rounding to nearest.
    #[inline]
    #[must_use]
    pub fn cells_for_px(self, px: f64) -> i32 {
        (px / f64::from(self.px())).round() as i32
    }

    /// Cells that fit completely into a pixel length (floor).
    #[inline]
    #[must_use]
    pub fn whole_cells_in(self, px: f64) -> u16 {
        if px <= 0.0 {
            return 0;
        }
        (px / f64::from(self.px())).floor().min(f64::from(u16::MAX)) as u16
    }
}

impl TryFrom<u16> for CellSize {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| "cell size must be at least 1px".to_string())
    }
}

impl From<CellSize> for u16 {
    fn from(value: CellSize) -> Self {
        value.px()
    }
}

/// Grid dimensions in cells. Zero on either axis means "not yet measured".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridSize {
    /// Total columns.
    pub cols: u16,
    /// Total rows.
    pub rows: u16,
}

impl GridSize {
    /// Create a grid size.
    #[inline]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Derive grid dimensions from a viewport and a cell size.
    #[must_use]
    pub fn from_viewport(viewport: PixelSize, cell: CellSize) -> Self {
        Self {
            cols: cell.whole_cells_in(viewport.width),
            rows: cell.whole_cells_in(viewport.height),
        }
    }

    /// Whether either dimension is unknown.
    #[inline]
    pub const fn is_unknown(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    /// The full grid as a rectangle anchored at (1, 1).
    #[inline]
    pub const fn full_rect(&self) -> GridRect {
        GridRect::new(1, 1, self.cols, self.rows)
    }

    /// Check that a rectangle lies within `[1, cols] x [1, rows]`.
    #[inline]
    pub const fn contains_rect(&self, rect: &GridRect) -> bool {
        !self.is_unknown()
            && rect.col >= 1
            && rect.row >= 1
            && rect.col_span >= 1
            && rect.row_span >= 1
            && (rect.col as u32 + rect.col_span as u32 - 1) <= self.cols as u32
            && (rect.row as u32 + rect.row_span as u32 - 1) <= self.rows as u32
    }
}

/// A rectangle in grid cells.
///
/// Uses 1-indexed coordinates with inclusive end edges, matching how
/// widgets are addressed on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRect {
    /// First occupied column (1-indexed).
    pub col: u16,
    /// First occupied row (1-indexed).
    pub row: u16,
    /// Width in cells.
    pub col_span: u16,
    /// Height in cells.
    pub row_span: u16,
}

impl Default for GridRect {
    fn default() -> Self {
        Self::new(1, 1, 1, 1)
    }
}

impl GridRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(col: u16, row: u16, col_span: u16, row_span: u16) -> Self {
        Self {
            col,
            row,
            col_span,
            row_span,
        }
    }

    /// Last occupied column (inclusive).
    #[inline]
    pub const fn col_end(&self) -> u32 {
        (self.col as u32 + self.col_span as u32).saturating_sub(1)
    }

    /// Last occupied row (inclusive).
    #[inline]
    pub const fn row_end(&self) -> u32 {
        (self.row as u32 + self.row_span as u32).saturating_sub(1)
    }

    /// Area in cells.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.col_span as u32 * self.row_span as u32
    }

    /// Same size, different origin.
    #[inline]
    #[must_use]
    pub const fn at(self, col: u16, row: u16) -> Self {
        Self::new(col, row, self.col_span, self.row_span)
    }

    /// Grow the rectangle by `buffer` cells on every side.
    ///
    /// The start edges saturate at zero so a buffered rectangle may reach
    /// past the first column or row; it is only ever used for overlap tests.
    #[must_use]
    pub const fn expanded(self, buffer: u16) -> Self {
        Self {
            col: self.col.saturating_sub(buffer),
            row: self.row.saturating_sub(buffer),
            col_span: self.col_span.saturating_add(buffer.saturating_mul(2)),
            row_span: self.row_span.saturating_add(buffer.saturating_mul(2)),
        }
    }

    /// Axis-aligned overlap test: projections must intersect on both axes.
    #[inline]
    pub const fn intersects(&self, other: &GridRect) -> bool {
        if self.col_span == 0 || self.row_span == 0 || other.col_span == 0 || other.row_span == 0
        {
            return false;
        }
        (self.col as u32) <= other.col_end()
            && self.col_end() >= other.col as u32
            && (self.row as u32) <= other.row_end()
            && self.row_end() >= other.row as u32
    }

    /// Convert pixel geometry into grid units, rounding each edge to nearest.
    ///
    /// Positions are clamped to at least 1 and spans to at least one cell.
    #[must_use]
    pub fn from_pixels(px: PixelRect, cell: CellSize) -> Self {
        let clamp = |value: i32| value.clamp(1, i32::from(u16::MAX)) as u16;
        Self {
            col: clamp(cell.cells_for_px(px.x) + 1),
            row: clamp(cell.cells_for_px(px.y) + 1),
            col_span: clamp(cell.cells_for_px(px.width)),
            row_span: clamp(cell.cells_for_px(px.height)),
        }
    }
}

/// A size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: f64,
    pub height: f64,
}

impl PixelSize {
    /// Create a new pixel size.
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// A rectangle in pixels, origin at the top-left of the grid container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// Create a new pixel rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Pixel footprint of a grid rectangle under the given cell size.
    #[must_use]
    pub fn from_grid(rect: GridRect, cell: CellSize) -> Self {
        let px = f64::from(cell.px());
        Self {
            x: f64::from(rect.col.saturating_sub(1)) * px,
            y: f64::from(rect.row.saturating_sub(1)) * px,
            width: f64::from(rect.col_span) * px,
            height: f64::from(rect.row_span) * px,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CellSize, GridRect, GridSize, PixelRect, PixelSize};

    fn cell(px: u16) -> CellSize {
        CellSize::new(px).expect("non-zero cell size")
    }

    #[test]
    fn cell_size_rejects_zero() {
        assert!(CellSize::new(0).is_none());
        assert_eq!(cell(30).px(), 30);
    }

    #[test]
    fn grid_from_viewport_floors() {
        let grid = GridSize::from_viewport(PixelSize::new(1000.0, 599.0), cell(30));
        assert_eq!(grid, GridSize::new(33, 19));
        let empty = GridSize::from_viewport(PixelSize::new(0.0, 400.0), cell(30));
        assert!(empty.is_unknown());
    }

    #[test]
    fn rect_edges_are_inclusive() {
        let rect = GridRect::new(3, 2, 4, 3);
        assert_eq!(rect.col_end(), 6);
        assert_eq!(rect.row_end(), 4);
        assert_eq!(rect.area(), 12);
    }

    #[test]
    fn touching_rects_do_not_intersect() {
        let a = GridRect::new(1, 1, 4, 4);
        let b = GridRect::new(5, 1, 4, 4);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&GridRect::new(4, 4, 2, 2)));
    }

    #[test]
    fn expanded_rect_reaches_neighbors() {
        let a = GridRect::new(1, 1, 4, 4);
        let b = GridRect::new(5, 1, 2, 2);
        assert!(!a.intersects(&b));
        assert!(a.intersects(&b.expanded(1)));
        let gap = GridRect::new(6, 1, 2, 2);
        assert!(!a.intersects(&gap.expanded(1)));
        assert!(a.intersects(&gap.expanded(2)));
    }

    #[test]
    fn contains_rect_checks_both_axes() {
        let grid = GridSize::new(10, 10);
        assert!(grid.contains_rect(&GridRect::new(7, 7, 4, 4)));
        assert!(!grid.contains_rect(&GridRect::new(8, 1, 4, 4)));
        assert!(!grid.contains_rect(&GridRect::new(0, 1, 4, 4)));
        assert!(!GridSize::default().contains_rect(&GridRect::new(1, 1, 1, 1)));
    }

    #[test]
    fn pixel_round_trip_across_densities() {
        let rect = GridRect::new(3, 2, 4, 3);
        let px = PixelRect::from_grid(rect, cell(30));
        assert_eq!(px, PixelRect::new(60.0, 30.0, 120.0, 90.0));

        let converted = GridRect::from_pixels(px, cell(20));
        assert_eq!(converted, GridRect::new(4, 3, 6, 5));
    }

    mod property {
        use super::super::{CellSize, GridRect, PixelRect};
        use proptest::prelude::*;

        fn rect() -> impl Strategy<Value = GridRect> {
            (1u16..200, 1u16..200, 1u16..50, 1u16..50)
                .prop_map(|(col, row, cols, rows)| GridRect::new(col, row, cols, rows))
        }

        proptest! {
            #[test]
            fn intersects_is_symmetric(a in rect(), b in rect()) {
                prop_assert_eq!(a.intersects(&b), b.intersects(&a));
            }

            #[test]
            fn same_density_pixel_round_trip_is_lossless(r in rect(), px in 1u16..64) {
                let cell = CellSize::new(px).unwrap();
                prop_assert_eq!(GridRect::from_pixels(PixelRect::from_grid(r, cell), cell), r);
            }

            #[test]
            fn expanded_rect_contains_the_original(r in rect(), buffer in 0u16..4) {
                let grown = r.expanded(buffer);
                prop_assert!(grown.col <= r.col && grown.row <= r.row);
                prop_assert!(grown.col_end() >= r.col_end() && grown.row_end() >= r.row_end());
            }
        }
    }
}
