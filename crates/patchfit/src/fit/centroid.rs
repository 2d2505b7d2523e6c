//! Centroid mean-radius circle.
//!
//! Over a selection the center is the selection's running centroid
//! (`sum / count`), integer-divided when snapping.

use super::ShapeFitter;
use crate::grid::PatchGrid;
use crate::selection::SelectionState;
use crate::types::{FitError, FittedShape, Point};

/// Circle centered on the mean of the points, with the mean distance
/// from that center as radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CentroidCircle {
    /// Truncate the center to whole pixels before measuring distances.
    pub snap_center_to_pixel: bool,
}

impl CentroidCircle {
    /// Mean distance of `points` from `center`.
    ///
    /// # Errors
    ///
    /// Returns [`FitError::InsufficientPoints`] for an empty slice.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit_about(center: Point, points: &[Point]) -> Result<FittedShape, FitError> {
        if points.is_empty() {
            return Err(FitError::InsufficientPoints {
                required: 1,
                selected: 0,
            });
        }
        let radius =
            points.iter().map(|p| p.distance(center)).sum::<f64>() / points.len() as f64;
        Ok(FittedShape::Circle { center, radius })
    }
}

impl ShapeFitter for CentroidCircle {
    fn min_points(&self) -> usize {
        1
    }

    #[allow(clippy::cast_precision_loss)]
    fn fit(&self, points: &[Point]) -> Result<FittedShape, FitError> {
        self.check_count(points)?;
        let n = points.len() as f64;
        let mut center = Point::new(
            points.iter().map(|p| p.x).sum::<f64>() / n,
            points.iter().map(|p| p.y).sum::<f64>() / n,
        );
        if self.snap_center_to_pixel {
            center = Point::new(center.x.floor(), center.y.floor());
        }
        Self::fit_about(center, points)
    }

    fn fit_selection(
        &self,
        selection: &SelectionState,
        grid: &PatchGrid,
    ) -> Result<FittedShape, FitError> {
        let center = if self.snap_center_to_pixel {
            selection.snapped_centroid()
        } else {
            selection.centroid()
        };
        let center = center.ok_or(FitError::InsufficientPoints {
            required: self.min_points(),
            selected: 0,
        })?;
        Self::fit_about(center, &selection.points(grid))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle_parts(shape: &FittedShape) -> (Point, f64) {
        match shape {
            FittedShape::Circle { center, radius } => (*center, *radius),
            other => unreachable!("expected a circle, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_insufficient() {
        let result = CentroidCircle::default().fit(&[]);
        assert_eq!(
            result,
            Err(FitError::InsufficientPoints {
                required: 1,
                selected: 0
            }),
        );
    }

    #[test]
    fn single_point_has_zero_radius() {
        let shape = CentroidCircle::default()
            .fit(&[Point::new(32.0, 59.0)])
            .unwrap();
        let (center, radius) = circle_parts(&shape);
        assert_eq!(center, Point::new(32.0, 59.0));
        assert!(radius.abs() < f64::EPSILON);
    }

    #[test]
    fn symmetric_points_give_exact_radius() {
        // Reference pixels of patches three cells from (10, 10).
        let points = [
            Point::new(275.0, 356.0),
            Point::new(275.0, 194.0),
            Point::new(356.0, 275.0),
            Point::new(194.0, 275.0),
        ];
        let (center, radius) = circle_parts(&CentroidCircle::default().fit(&points).unwrap());
        assert_relative_eq!(center.x, 275.0, epsilon = 1e-12);
        assert_relative_eq!(center.y, 275.0, epsilon = 1e-12);
        assert_relative_eq!(radius, 81.0, epsilon = 1e-12);
    }

    #[test]
    fn mean_radius_converges_to_circumradius() {
        // Right triangle (0,0), (60,0), (0,80): circumcenter (30,40), R = 50.
        // Adding samples of the circumcircle pulls the centroid onto the
        // circumcenter and the mean radius onto R.
        let vertices = [
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(0.0, 80.0),
        ];
        let errors: Vec<f64> = [0_u32, 6, 48, 384]
            .iter()
            .map(|&n| {
                let mut points = vertices.to_vec();
                points.extend((0..n).map(|i| {
                    let t = std::f64::consts::TAU * f64::from(i) / f64::from(n);
                    Point::new(30.0 + 50.0 * t.cos(), 40.0 + 50.0 * t.sin())
                }));
                let (_, radius) = circle_parts(&CentroidCircle::default().fit(&points).unwrap());
                (radius - 50.0).abs()
            })
            .collect();
        assert!(errors[0] > 3.0, "{errors:?}");
        assert!(errors[3] < 0.1, "{errors:?}");
        assert!(errors[3] < errors[1], "{errors:?}");
    }

    #[test]
    fn triangle_vertices_are_equidistant_from_circumcenter() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(60.0, 0.0),
            Point::new(0.0, 80.0),
        ];
        let (_, radius) =
            circle_parts(&CentroidCircle::fit_about(Point::new(30.0, 40.0), &points).unwrap());
        assert_relative_eq!(radius, 50.0, epsilon = 1e-12);
    }

    #[test]
    fn snapping_truncates_center() {
        let points = [Point::new(5.0, 5.0), Point::new(32.0, 5.0)];
        let snapped = CentroidCircle {
            snap_center_to_pixel: true,
        };
        let (center, radius) = circle_parts(&snapped.fit(&points).unwrap());
        assert_eq!(center, Point::new(18.0, 5.0));
        assert_relative_eq!(radius, 13.5, epsilon = 1e-12);

        let (center, _) = circle_parts(&CentroidCircle::default().fit(&points).unwrap());
        assert_eq!(center, Point::new(18.5, 5.0));
    }

    // --- Selection tests ---

    fn two_patch_selection(grid: &PatchGrid) -> SelectionState {
        let mut sel = SelectionState::new();
        sel.toggle(grid, crate::types::PatchIndex::new(0, 0)).unwrap();
        sel.toggle(grid, crate::types::PatchIndex::new(0, 1)).unwrap();
        sel
    }

    #[test]
    fn selection_fit_centers_on_running_centroid() {
        let grid = PatchGrid::new(9, 20).unwrap();
        let sel = two_patch_selection(&grid);
        let shape = CentroidCircle::default().fit_selection(&sel, &grid).unwrap();
        let (center, radius) = circle_parts(&shape);
        assert_eq!(Some(center), sel.centroid());
        assert_relative_eq!(radius, 13.5, epsilon = 1e-12);
    }

    #[test]
    fn snapped_selection_fit_uses_integer_centroid() {
        let grid = PatchGrid::new(9, 20).unwrap();
        let sel = two_patch_selection(&grid);
        let snapped = CentroidCircle {
            snap_center_to_pixel: true,
        };
        let (center, _) = circle_parts(&snapped.fit_selection(&sel, &grid).unwrap());
        assert_eq!(Some(center), sel.snapped_centroid());
        assert_eq!(center, Point::new(18.0, 5.0));
    }

    #[test]
    fn empty_selection_is_insufficient() {
        let grid = PatchGrid::new(9, 20).unwrap();
        let result = CentroidCircle::default().fit_selection(&SelectionState::new(), &grid);
        assert_eq!(
            result,
            Err(FitError::InsufficientPoints {
                required: 1,
                selected: 0
            }),
        );
    }
}
