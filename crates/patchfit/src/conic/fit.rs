//! Direct least-squares ellipse fit (Fitzgibbon et al., 1999).

use nalgebra::{DMatrix, Matrix3, Vector6};

use super::eigen::constrained_eigenvector;
use super::{Conic, Ellipse, MIN_POINTS};
use crate::types::Point;

/// Fit an ellipse to `points`.
///
/// Solves the constrained eigenproblem that forces `4AC − B² > 0`, on
/// coordinates shifted to the centroid and scaled to a mean radius of
/// √2 for conditioning. Returns `None` with fewer than six points or
/// when the points do not determine a real ellipse (collinear,
/// coincident, ...).
#[must_use]
pub fn fit_ellipse(points: &[Point]) -> Option<Ellipse> {
    fit_conic(points)?.to_ellipse()
}

fn fit_conic(points: &[Point]) -> Option<Conic> {
    let n = points.len();
    if n < MIN_POINTS {
        return None;
    }

    let (mean, scale) = normalization(points);

    // Design matrix rows [x², xy, y², x, y, 1].
    let mut design = DMatrix::<f64>::zeros(n, 6);
    for (i, p) in points.iter().enumerate() {
        let x = (p.x - mean.x) * scale;
        let y = (p.y - mean.y) * scale;
        design[(i, 0)] = x * x;
        design[(i, 1)] = x * y;
        design[(i, 2)] = y * y;
        design[(i, 3)] = x;
        design[(i, 4)] = y;
        design[(i, 5)] = 1.0;
    }

    let scatter = design.transpose() * &design;
    let s11 = scatter.fixed_view::<3, 3>(0, 0).into_owned();
    let s12 = scatter.fixed_view::<3, 3>(0, 3).into_owned();
    let s22 = scatter.fixed_view::<3, 3>(3, 3).into_owned();

    // Ellipse constraint 4AC − B² = 1 on the quadratic block.
    let c1 = Matrix3::new(0.0, 0.0, 2.0, 0.0, -1.0, 0.0, 2.0, 0.0, 0.0);

    let s22_inv = s22.try_inverse()?;
    let reduced = s11 - s12 * s22_inv * s12.transpose();
    let system = c1.try_inverse()? * reduced;

    let quadratic = constrained_eigenvector(&system)?;
    let linear = -s22_inv * s12.transpose() * quadratic;

    let normalized = Vector6::new(
        quadratic[0],
        quadratic[1],
        quadratic[2],
        linear[0],
        linear[1],
        linear[2],
    );
    let conic = denormalize(&normalized, mean, scale);
    conic.is_ellipse().then_some(conic)
}

/// Centroid of `points` and the scale that maps their mean distance
/// from it to √2.
#[allow(clippy::cast_precision_loss)]
fn normalization(points: &[Point]) -> (Point, f64) {
    let n = points.len() as f64;
    let mean = Point::new(
        points.iter().map(|p| p.x).sum::<f64>() / n,
        points.iter().map(|p| p.y).sum::<f64>() / n,
    );
    let mean_dist = points.iter().map(|p| p.distance(mean)).sum::<f64>() / n;
    let scale = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };
    (mean, scale)
}

/// Map coefficients fitted on `x' = s(x − mx), y' = s(y − my)` back to
/// pixel coordinates.
fn denormalize(c: &Vector6<f64>, mean: Point, s: f64) -> Conic {
    let [a_, b_, c_, d_, e_, f_] = [c[0], c[1], c[2], c[3], c[4], c[5]];
    let Point { x: mx, y: my } = mean;
    let s2 = s * s;

    let a = a_ * s2;
    let b = b_ * s2;
    let cc = c_ * s2;
    let d = -2.0 * a_ * s2 * mx - b_ * s2 * my + d_ * s;
    let e = -b_ * s2 * mx - 2.0 * c_ * s2 * my + e_ * s;
    let f =
        a_ * s2 * mx * mx + b_ * s2 * mx * my + c_ * s2 * my * my - d_ * s * mx - e_ * s * my + f_;

    Conic([a, b, cc, d, e, f])
}
