//! Shape fitters.
//!
//! The multi-point fitters implement [`ShapeFitter`], a strategy over the
//! selected reference pixels. The two-point circle works from a click
//! pair instead and lives in [`two_point`].
//!
//! # Strategy pattern
//!
//! [`fitter_for`] maps a [`FitMode`] to the strategy a session runs on
//! Generate, so sessions hold one code path for every multi-point mode.

pub mod centroid;
pub mod ellipse;
pub mod two_point;

pub use centroid::CentroidCircle;
pub use ellipse::LeastSquaresEllipse;
pub use two_point::{ClickPair, TwoPointFit};

use crate::grid::PatchGrid;
use crate::selection::SelectionState;
use crate::types::{FitError, FitMode, FittedShape, Point};

/// A fitter that consumes a set of points.
pub trait ShapeFitter {
    /// Fewest points the fitter accepts.
    fn min_points(&self) -> usize;

    /// Fit a shape to `points`.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InsufficientPoints`] below
    /// [`min_points`](Self::min_points), or [`FitError::DegenerateFit`]
    /// when the points do not determine a shape.
    fn fit(&self, points: &[Point]) -> Result<FittedShape, FitError>;

    /// Fit a shape to the reference pixels of a selection.
    ///
    /// Fitters that can use the selection's running aggregates override
    /// this; the default fits [`SelectionState::points`].
    ///
    /// # Errors
    ///
    /// Same as [`fit`](Self::fit).
    fn fit_selection(
        &self,
        selection: &SelectionState,
        grid: &PatchGrid,
    ) -> Result<FittedShape, FitError> {
        self.fit(&selection.points(grid))
    }

    /// Reject point sets below [`min_points`](Self::min_points).
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InsufficientPoints`].
    fn check_count(&self, points: &[Point]) -> Result<(), FitError> {
        if points.len() < self.min_points() {
            return Err(FitError::InsufficientPoints {
                required: self.min_points(),
                selected: points.len(),
            });
        }
        Ok(())
    }
}

/// The multi-point fitter for `mode`, `None` for the click-pair mode.
#[must_use]
pub fn fitter_for(mode: FitMode, snap_center_to_pixel: bool) -> Option<Box<dyn ShapeFitter>> {
    match mode {
        FitMode::TwoPointCircle => None,
        FitMode::CentroidCircle => Some(Box::new(CentroidCircle {
            snap_center_to_pixel,
        })),
        FitMode::Ellipse => Some(Box::new(LeastSquaresEllipse)),
    }
}
