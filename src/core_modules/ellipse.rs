// THEORY:
// Least-squares ellipse fitting for heading estimation. The contour points of
// a blob are fitted with a general conic A x² + B xy + C y² + D x + E y + F = 0
// in the algebraic least-squares sense: the coefficient vector is the
// eigenvector of the 6x6 scatter matrix S = DᵀD belonging to its smallest
// eigenvalue, where D stacks one design row [x², xy, y², x, y, 1] per point.
// Points are normalized first (shifted to their centroid and scaled so the
// mean distance from it is √2); the fit is numerically fragile without it.
// Because the normalization is a similarity transform, the geometric ellipse
// parameters denormalize directly: the center shifts back, the axes rescale,
// the angle is unchanged.
//
// The conversion from conic coefficients to center / axes / angle goes through
// the eigenvalues of the quadratic part; a non-ellipse conic (discriminant
// B² − 4AC ≥ 0, e.g. the degenerate line pair a collinear contour produces)
// yields `None` rather than nonsense parameters.

use nalgebra::{Matrix6, SymmetricEigen, Vector6};

/// Fewest contour points the fit accepts: a conic has five independent
/// coefficients.
pub const MIN_FIT_POINTS: usize = 5;

/// Geometric parameters of a fitted ellipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipse {
    pub cx: f64,
    pub cy: f64,
    /// Semi-major axis length.
    pub semi_major: f64,
    /// Semi-minor axis length.
    pub semi_minor: f64,
    /// Rotation of the major axis from +x, in radians, within (−π/2, π/2].
    pub angle: f64,
}

/// Fits an ellipse to `points` in the least-squares sense.
///
/// Returns `None` when fewer than `MIN_FIT_POINTS` are supplied, when the
/// best-fit conic is not an ellipse, or on numerical failure.
pub fn fit_ellipse(points: &[(f64, f64)]) -> Option<Ellipse> {
    let n = points.len();
    if n < MIN_FIT_POINTS {
        return None;
    }

    // Normalization: shift to the centroid, scale mean distance to √2.
    let inv_n = 1.0 / n as f64;
    let mean_x: f64 = points.iter().map(|p| p.0).sum::<f64>() * inv_n;
    let mean_y: f64 = points.iter().map(|p| p.1).sum::<f64>() * inv_n;
    let mean_dist: f64 = points
        .iter()
        .map(|p| (p.0 - mean_x).hypot(p.1 - mean_y))
        .sum::<f64>()
        * inv_n;
    if mean_dist <= 1e-12 {
        return None;
    }
    let scale = std::f64::consts::SQRT_2 / mean_dist;

    // Scatter matrix over design rows [x², xy, y², x, y, 1] in normalized
    // coordinates.
    let mut scatter = Matrix6::<f64>::zeros();
    for &(px, py) in points {
        let x = (px - mean_x) * scale;
        let y = (py - mean_y) * scale;
        let row = Vector6::new(x * x, x * y, y * y, x, y, 1.0);
        scatter += row * row.transpose();
    }

    // The algebraic least-squares solution is the eigenvector belonging to
    // the smallest eigenvalue of the scatter matrix.
    let eigen = SymmetricEigen::new(scatter);
    let mut min_idx = 0;
    for i in 1..6 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_idx] {
            min_idx = i;
        }
    }
    let v = eigen.eigenvectors.column(min_idx);
    let coeffs = [v[0], v[1], v[2], v[3], v[4], v[5]];

    let fitted = conic_to_ellipse(coeffs)?;

    // Denormalize: similarity transform, so only center and axes change.
    Some(Ellipse {
        cx: mean_x + fitted.cx / scale,
        cy: mean_y + fitted.cy / scale,
        semi_major: fitted.semi_major / scale,
        semi_minor: fitted.semi_minor / scale,
        angle: fitted.angle,
    })
}

/// Converts general conic coefficients [A, B, C, D, E, F] to geometric
/// ellipse parameters. `None` when the conic is not a real, finite ellipse.
fn conic_to_ellipse(coeffs: [f64; 6]) -> Option<Ellipse> {
    let [a, b, c, d, e, f] = coeffs;

    // Discriminant check: must be an ellipse. The coefficient vector is unit
    // norm, so a small absolute margin keeps degenerate line pairs (whose
    // discriminant is zero up to rounding) out.
    let disc = b * b - 4.0 * a * c;
    if disc >= -1e-12 {
        return None;
    }

    // Center from the stationarity conditions of the quadratic form.
    let denom = -disc; // 4AC − B² > 0
    let cx = (b * e - 2.0 * c * d) / denom;
    let cy = (b * d - 2.0 * a * e) / denom;

    // Eigenvalues of the 2x2 quadratic part. `phi` is the eigendirection of
    // the larger eigenvalue; the other axis is perpendicular. Neither
    // eigenvalue can be zero once the discriminant check passed.
    let sum = a + c;
    let diff = ((a - c).powi(2) + b * b).sqrt();
    let lambda1 = (sum + diff) / 2.0;
    let lambda2 = (sum - diff) / 2.0;
    let phi = 0.5 * b.atan2(a - c);

    // Conic value at the center.
    let f_center = a * cx * cx + b * cx * cy + c * cy * cy + d * cx + e * cy + f;
    if f_center.abs() < 1e-15 {
        return None;
    }

    let r1_sq = -f_center / lambda1;
    let r2_sq = -f_center / lambda2;
    if !(r1_sq > 0.0 && r2_sq > 0.0 && r1_sq.is_finite() && r2_sq.is_finite()) {
        return None;
    }

    // The overall sign of the coefficient vector is arbitrary, so neither
    // eigenvalue is inherently "the major one": canonicalize by comparing
    // the radii and carry the matching axis direction.
    let (major_sq, minor_sq, mut angle) = if r1_sq >= r2_sq {
        (r1_sq, r2_sq, phi)
    } else {
        (r2_sq, r1_sq, phi + std::f64::consts::FRAC_PI_2)
    };
    while angle > std::f64::consts::FRAC_PI_2 {
        angle -= std::f64::consts::PI;
    }
    while angle <= -std::f64::consts::FRAC_PI_2 {
        angle += std::f64::consts::PI;
    }

    Some(Ellipse {
        cx,
        cy,
        semi_major: major_sq.sqrt(),
        semi_minor: minor_sq.sqrt(),
        angle,
    })
}
