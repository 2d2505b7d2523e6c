//! Two-point radius circle.
//!
//! The center comes from the patch under a mouse-down, the circumference
//! from the patch under the following mouse-up. The circle is first
//! approximated at cell granularity (the "ring"); the pixel-level
//! boundary diagnostics in [`crate::boundary`] are then derived from the
//! rendered ring.

use crate::boundary::BoundaryRadii;
use crate::grid::PatchGrid;
use crate::types::{FitError, FittedShape, PatchIndex, Point};

/// Half-width of the ring band, in cells.
pub const RING_TOLERANCE_CELLS: f64 = 0.5;

/// Patches captured from a mouse-down and the following mouse-up.
///
/// Only the center is held; the mouse-up completes the pair and is
/// consumed by the fit straight away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClickPair {
    down: Option<PatchIndex>,
}

impl ClickPair {
    /// An empty pair.
    #[must_use]
    pub const fn new() -> Self {
        Self { down: None }
    }

    /// Patch captured on mouse-down.
    #[must_use]
    pub const fn down(&self) -> Option<PatchIndex> {
        self.down
    }

    /// Record the center. A later press before any release moves it.
    pub const fn press(&mut self, index: PatchIndex) {
        self.down = Some(index);
    }

    /// Complete the pair with the circumference patch, `(center, edge)`,
    /// or `None` when no center has been pressed.
    #[must_use]
    pub const fn release(&self, index: PatchIndex) -> Option<(PatchIndex, PatchIndex)> {
        match self.down {
            Some(down) => Some((down, index)),
            None => None,
        }
    }

    /// Forget the center.
    pub const fn clear(&mut self) {
        self.down = None;
    }
}

/// A two-point circle at cell granularity.
#[derive(Debug, Clone, PartialEq)]
pub struct TwoPointFit {
    /// Patch picked as the center.
    pub center_patch: PatchIndex,
    /// Reference pixel of `center_patch`.
    pub center: Point,
    /// Pixel distance between the two reference pixels.
    pub radius: f64,
    /// Cells within half a cell of the radius, row-major.
    pub ring: Vec<PatchIndex>,
}

impl TwoPointFit {
    /// Fit the circle through `edge` centered on `center`.
    ///
    /// Ring cells off the grid are skipped. `center == edge` gives a zero
    /// radius whose ring is the center cell.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::OutOfBounds`] if either patch is off the grid.
    pub fn fit(grid: &PatchGrid, center: PatchIndex, edge: PatchIndex) -> Result<Self, FitError> {
        let center = grid.check(center)?;
        let edge = grid.check(edge)?;
        let center_px = grid.center(center);
        let radius = center_px.distance(grid.center(edge));

        let radius_cells = radius / f64::from(grid.cell_size());
        let reach = radius_cells.ceil();
        let ring = grid
            .indices()
            .filter(|idx| {
                let dr = f64::from(idx.row) - f64::from(center.row);
                let dc = f64::from(idx.col) - f64::from(center.col);
                dr.abs() <= reach
                    && dc.abs() <= reach
                    && (dr.hypot(dc) - radius_cells).abs() < RING_TOLERANCE_CELLS
            })
            .collect();

        Ok(Self {
            center_patch: center,
            center: center_px,
            radius,
            ring,
        })
    }

    /// The fitted shape, carrying the boundary diagnostics measured from
    /// the rendered ring. Without a measurement all three boundary radii
    /// fall back to the click radius.
    #[must_use]
    pub fn into_shape(self, boundary: Option<BoundaryRadii>) -> FittedShape {
        let BoundaryRadii { min, max, target } = boundary.unwrap_or(BoundaryRadii {
            min: self.radius,
            max: self.radius,
            target: self.radius,
        });
        FittedShape::TwoPointCircle {
            center_patch: self.center_patch,
            center: self.center,
            radius: self.radius,
            ring: self.ring,
            target_radius: target,
            min_radius: min,
            max_radius: max,
        }
    }
}
