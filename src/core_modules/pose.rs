// THEORY:
// The `pose` module derives the per-frame output of the engine from the blob
// the associator selected: the body centroid and a heading-projected "nose"
// point. The centroid comes straight from the blob's cached moments; the nose
// is the centroid displaced along the fitted ellipse's major axis by the
// semi-major length.
//
// Known limitation: an ellipse orientation is ambiguous by 180°, so the nose
// estimate may point at the tail instead of the head. That ambiguity is
// inherited from the heading model and deliberately left unresolved here;
// downstream analysis that needs a true head position must disambiguate with
// information this engine does not have.

use crate::core_modules::blob::Blob;
use crate::core_modules::ellipse::{self, MIN_FIT_POINTS};

/// Relative axis difference below which a fitted ellipse is treated as
/// circular. A near-circular fit has no meaningful orientation, so the nose
/// collapses onto the centroid instead of picking up a noise-driven heading.
const NEAR_CIRCULAR_RATIO: f64 = 0.05;

/// Estimated position pair for one sampled frame. Both points are always
/// produced together; the nose falls back to the centroid when no usable
/// heading exists.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// Area-weighted centroid of the selected blob.
    pub center: (f64, f64),
    /// Heading-projected nose estimate (180°-ambiguous).
    pub nose: (f64, f64),
}

/// Derives the pose of a selected blob. `center` is the centroid the
/// associator already computed for this blob; it is reused, not recomputed.
///
/// The nose is estimated from a least-squares ellipse fit when the contour
/// has at least `MIN_FIT_POINTS` points and the fit has a usable orientation;
/// otherwise it coincides with the centroid.
pub fn estimate(blob: &Blob, center: (f64, f64)) -> Pose {
    if blob.contour.len() >= MIN_FIT_POINTS {
        let points: Vec<(f64, f64)> = blob
            .contour
            .iter()
            .map(|p| (p.x as f64, p.y as f64))
            .collect();
        if let Some(fitted) = ellipse::fit_ellipse(&points) {
            let elongation = fitted.semi_major - fitted.semi_minor;
            if elongation > NEAR_CIRCULAR_RATIO * fitted.semi_major {
                let (sin_t, cos_t) = fitted.angle.sin_cos();
                let nose = (
                    center.0 + cos_t * fitted.semi_major,
                    center.1 + sin_t * fitted.semi_major,
                );
                return Pose { center, nose };
            }
        }
    }
    Pose {
        center,
        nose: center,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::blob::Point;
    use approx::assert_relative_eq;

    fn blob_from_points(points: &[(u32, u32)]) -> Blob {
        Blob::from_contour(points.iter().map(|&(x, y)| Point { x, y }).collect())
    }

    fn dense_rect_contour(x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<(u32, u32)> {
        let mut pts = Vec::new();
        for x in x0..x1 {
            pts.push((x, y0));
        }
        for y in y0..y1 {
            pts.push((x1, y));
        }
        for x in (x0 + 1..=x1).rev() {
            pts.push((x, y1));
        }
        for y in (y0 + 1..=y1).rev() {
            pts.push((x0, y));
        }
        pts
    }

    #[test]
    fn elongated_blob_noses_along_the_major_axis() {
        let blob = blob_from_points(&dense_rect_contour(10, 20, 50, 30));
        let center = blob.centroid().unwrap();
        let pose = estimate(&blob, center);

        assert_eq!(pose.center, center);
        assert_ne!(pose.nose, pose.center);
        // Major axis of a wide rectangle is horizontal; either heading sign
        // is acceptable.
        assert_relative_eq!(pose.nose.1, center.1, epsilon = 1e-6);
        assert!((pose.nose.0 - center.0).abs() > 15.0);
    }

    #[test]
    fn circular_blob_noses_at_its_own_centroid() {
        // Digitized circle: the fit is near-circular, so no heading exists.
        let pts: Vec<(u32, u32)> = (0..64)
            .map(|i| {
                let t = 2.0 * std::f64::consts::PI * i as f64 / 64.0;
                (
                    (30.0 + 10.0 * t.cos()).round() as u32,
                    (30.0 + 10.0 * t.sin()).round() as u32,
                )
            })
            .collect();
        let blob = blob_from_points(&pts);
        let center = blob.centroid().unwrap();
        let pose = estimate(&blob, center);

        assert_relative_eq!(pose.nose.0, center.0);
        assert_relative_eq!(pose.nose.1, center.1);
    }

    #[test]
    fn short_contour_falls_back_to_the_centroid() {
        let blob = blob_from_points(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let center = blob.centroid().unwrap();
        let pose = estimate(&blob, center);
        assert_eq!(pose.nose, center);
    }
}
