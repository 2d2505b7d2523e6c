//! Fit diagnostics: how well a fitted shape explains its input.
//!
//! A [`FitReport`] is built once per successful fit. The residual is the
//! RMS radial deviation for circles (the ring cells' reference pixels
//! for the two-point circle) and the RMS Sampson distance for ellipses.

use serde::{Deserialize, Serialize};

use crate::fit::ellipse::ellipse_of;
use crate::grid::PatchGrid;
use crate::types::{FitMode, FittedShape, Point};

/// Summary of one fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    /// Fitter that produced the shape.
    pub mode: FitMode,
    /// Points the fitter consumed.
    pub input_points: usize,
    /// RMS residual in pixels.
    pub rms_residual: f64,
    /// The fitted shape.
    pub shape: FittedShape,
}

impl FitReport {
    /// Measure `shape` against the points it was fitted to.
    ///
    /// For the two-point circle `points` is ignored: the input is the
    /// click pair and the residual is measured over the ring.
    #[must_use]
    pub fn new(mode: FitMode, shape: &FittedShape, points: &[Point], grid: &PatchGrid) -> Self {
        let (input_points, rms_residual) = match shape {
            FittedShape::Circle { center, radius } => (
                points.len(),
                rms(points.iter().map(|p| p.distance(*center) - radius)),
            ),
            FittedShape::Ellipse { .. } => (
                points.len(),
                ellipse_of(shape).map_or(0.0, |e| e.rms_sampson_distance(points)),
            ),
            FittedShape::TwoPointCircle {
                center,
                radius,
                ring,
                ..
            } => (
                2,
                rms(ring.iter().map(|idx| grid.center(*idx).distance(*center) - radius)),
            ),
        };
        Self {
            mode,
            input_points,
            rms_residual,
            shape: shape.clone(),
        }
    }

    /// Human-readable multi-line report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();
        lines.push(format!("Fit Report\n{}", "=".repeat(60)));
        lines.push(format!("Mode: {}", self.mode));
        lines.push(format!("Input points: {}", self.input_points));

        match &self.shape {
            FittedShape::Circle { center, radius } => {
                lines.push(format!("Center: ({:.3}, {:.3})", center.x, center.y));
                lines.push(format!("Radius: {radius:.3}px"));
            }
            FittedShape::Ellipse {
                center,
                semi_axes,
                rotation,
            } => {
                lines.push(format!("Center: ({:.3}, {:.3})", center.x, center.y));
                lines.push(format!(
                    "Semi-axes: {:.3}px x {:.3}px",
                    semi_axes[0], semi_axes[1],
                ));
                lines.push(format!(
                    "Rotation: {:.4} rad ({:.2} deg)",
                    rotation,
                    rotation.to_degrees(),
                ));
            }
            FittedShape::TwoPointCircle {
                center_patch,
                center,
                radius,
                ring,
                target_radius,
                min_radius,
                max_radius,
            } => {
                lines.push(format!(
                    "Center: patch {center_patch} at ({:.0}, {:.0})",
                    center.x, center.y,
                ));
                lines.push(format!("Radius: {radius:.3}px  |  Ring cells: {}", ring.len()));
                lines.push(format!(
                    "Boundary: min {min_radius:.3}px  target {target_radius:.3}px  max {max_radius:.3}px",
                ));
            }
        }

        lines.push(format!("RMS residual: {:.4}px", self.rms_residual));
        lines.join("\n")
    }
}

#[allow(clippy::cast_precision_loss)]
fn rms(deviations: impl Iterator<Item = f64>) -> f64 {
    let (sum_sq, n) = deviations.fold((0.0, 0_usize), |(s, n), d| (d.mul_add(d, s), n + 1));
    if n == 0 {
        return 0.0;
    }
    (sum_sq / n as f64).sqrt()
}
