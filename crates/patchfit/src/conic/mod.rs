//! Least-squares ellipse fitting.
//!
//! Implements the direct constrained fit of Fitzgibbon, Pilu and Fisher
//! ("Direct Least Square Fitting of Ellipses", 1999) together with the
//! conversions between general conic coefficients
//! `A x² + B xy + C y² + D x + E y + F = 0` and geometric parameters.

mod eigen;
mod fit;

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

pub use fit::fit_ellipse;

use crate::types::Point;

/// Minimum number of points that determine a conic.
pub const MIN_POINTS: usize = 6;

/// General conic coefficients `[A, B, C, D, E, F]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conic(pub [f64; 6]);

impl Conic {
    /// Value of the conic polynomial at `p`.
    #[must_use]
    pub fn algebraic_distance(&self, p: Point) -> f64 {
        let [a, b, c, d, e, f] = self.0;
        a * p.x * p.x + b * p.x * p.y + c * p.y * p.y + d * p.x + e * p.y + f
    }

    /// Whether the quadratic part is elliptic (B² − 4AC < 0).
    #[must_use]
    pub fn is_ellipse(&self) -> bool {
        let [a, b, c, ..] = self.0;
        b * b - 4.0 * a * c < 0.0
    }

    /// Geometric parameters, `None` for anything but a real ellipse.
    #[must_use]
    pub fn to_ellipse(&self) -> Option<Ellipse> {
        let [a, b, c, d, e, f] = self.0;
        let denom = 4.0 * a * c - b * b;
        if denom <= 0.0 {
            return None;
        }

        let cx = (b * e - 2.0 * c * d) / denom;
        let cy = (b * d - 2.0 * a * e) / denom;

        let angle = if (a - c).abs() < 1e-15 {
            if b > 0.0 {
                FRAC_PI_4
            } else if b < 0.0 {
                -FRAC_PI_4
            } else {
                0.0
            }
        } else {
            0.5 * b.atan2(a - c)
        };

        // Eigenvalues of the quadratic part.
        let sum = a + c;
        let diff = (a - c).hypot(b);
        let lambda1 = (sum + diff) / 2.0;
        let lambda2 = (sum - diff) / 2.0;

        // Conic value at the center.
        let f_center = a * cx * cx + b * cx * cy + c * cy * cy + d * cx + e * cy + f;
        if f_center.abs() < 1e-15 {
            return None;
        }

        let axis1_sq = -f_center / lambda1;
        let axis2_sq = -f_center / lambda2;
        if axis1_sq <= 0.0 || axis2_sq <= 0.0 {
            return None;
        }

        let (axis1, axis2) = (axis1_sq.sqrt(), axis2_sq.sqrt());
        let (semi_major, semi_minor, angle) = if axis1 >= axis2 {
            (axis1, axis2, angle)
        } else {
            (axis2, axis1, angle + FRAC_PI_2)
        };

        let ellipse = Ellipse {
            center: Point::new(cx, cy),
            semi_major,
            semi_minor,
            angle: normalize_angle(angle),
        };
        ellipse.is_valid().then_some(ellipse)
    }
}

/// Geometric ellipse parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    /// Center in pixels.
    pub center: Point,
    /// Semi-major axis length.
    pub semi_major: f64,
    /// Semi-minor axis length.
    pub semi_minor: f64,
    /// Rotation of the major axis from +x, in radians (−π/2, π/2].
    pub angle: f64,
}

impl Ellipse {
    /// Positive, finite axes and finite placement.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.semi_major > 0.0
            && self.semi_minor > 0.0
            && self.semi_major.is_finite()
            && self.semi_minor.is_finite()
            && self.center.x.is_finite()
            && self.center.y.is_finite()
            && self.angle.is_finite()
    }

    /// General conic coefficients of this ellipse, scaled so that `F`
    /// equals `−1` at the origin-centered form.
    #[must_use]
    pub fn to_conic(&self) -> Conic {
        let (sin_a, cos_a) = self.angle.sin_cos();
        let a2 = self.semi_major * self.semi_major;
        let b2 = self.semi_minor * self.semi_minor;
        let Point { x: cx, y: cy } = self.center;

        let ca = cos_a * cos_a / a2 + sin_a * sin_a / b2;
        let cb = 2.0 * cos_a * sin_a * (1.0 / a2 - 1.0 / b2);
        let cc = sin_a * sin_a / a2 + cos_a * cos_a / b2;
        let cd = -2.0 * ca * cx - cb * cy;
        let ce = -cb * cx - 2.0 * cc * cy;
        let cf = ca * cx * cx + cb * cx * cy + cc * cy * cy - 1.0;

        Conic([ca, cb, cc, cd, ce, cf])
    }

    /// `n` points evenly spaced in parameter angle around the boundary.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample_points(&self, n: usize) -> Vec<Point> {
        let (sin_a, cos_a) = self.angle.sin_cos();
        (0..n)
            .map(|i| {
                let t = TAU * (i as f64) / (n as f64);
                let px = self.semi_major * t.cos();
                let py = self.semi_minor * t.sin();
                Point::new(
                    self.center.x + cos_a * px - sin_a * py,
                    self.center.y + sin_a * px + cos_a * py,
                )
            })
            .collect()
    }

    /// First-order geometric distance from `p` to the boundary.
    #[must_use]
    pub fn sampson_distance(&self, p: Point) -> f64 {
        let conic = self.to_conic();
        let [a, b, c, d, e, _] = conic.0;
        let alg = conic.algebraic_distance(p);
        let gx = 2.0 * a * p.x + b * p.y + d;
        let gy = b * p.x + 2.0 * c * p.y + e;
        let grad_sq = gx * gx + gy * gy;
        if grad_sq < 1e-30 {
            return alg.abs();
        }
        alg.abs() / grad_sq.sqrt()
    }

    /// Root-mean-square Sampson distance of `points`, zero when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rms_sampson_distance(&self, points: &[Point]) -> f64 {
        if points.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = points
            .iter()
            .map(|&p| {
                let d = self.sampson_distance(p);
                d * d
            })
            .sum();
        (sum_sq / points.len() as f64).sqrt()
    }
}

/// Wrap an angle into (−π/2, π/2].
fn normalize_angle(mut angle: f64) -> f64 {
    while angle > FRAC_PI_2 {
        angle -= PI;
    }
    while angle <= -FRAC_PI_2 {
        angle += PI;
    }
    angle
}
