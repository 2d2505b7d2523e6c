//! Least-squares ellipse over the selected points.

use super::ShapeFitter;
use crate::conic::{self, Ellipse};
use crate::types::{FitError, FittedShape, Point};

/// Direct least-squares ellipse fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeastSquaresEllipse;

impl ShapeFitter for LeastSquaresEllipse {
    fn min_points(&self) -> usize {
        conic::MIN_POINTS
    }

    fn fit(&self, points: &[Point]) -> Result<FittedShape, FitError> {
        self.check_count(points)?;
        let ellipse = conic::fit_ellipse(points).ok_or(FitError::DegenerateFit)?;
        Ok(shape_from(&ellipse))
    }
}

/// The [`FittedShape`] form of a geometric ellipse.
#[must_use]
pub const fn shape_from(ellipse: &Ellipse) -> FittedShape {
    FittedShape::Ellipse {
        center: ellipse.center,
        semi_axes: [ellipse.semi_major, ellipse.semi_minor],
        rotation: ellipse.angle,
    }
}

/// The geometric ellipse behind an [`FittedShape::Ellipse`].
#[must_use]
pub const fn ellipse_of(shape: &FittedShape) -> Option<Ellipse> {
    match *shape {
        FittedShape::Ellipse {
            center,
            semi_axes: [semi_major, semi_minor],
            rotation,
        } => Some(Ellipse {
            center,
            semi_major,
            semi_minor,
            angle: rotation,
        }),
        _ => None,
    }
}
