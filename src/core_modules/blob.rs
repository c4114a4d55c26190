// THEORY:
// A `Blob` is a connected foreground region extracted from a single masked,
// thresholded frame, the unit of candidacy for "the animal." Like the rest of
// the per-frame data in this engine it is a stateless snapshot: it exists only
// within the processing of one frame and carries no memory of earlier frames.
//
// Key architectural principles:
// 1.  **Contour as the primary representation**: a blob is described by its
//     ordered outer boundary, not by its pixel set. Area and centroid are
//     derived from the boundary polygon (Green's theorem), so a boundary that
//     folds back on itself (a one-pixel-thick streak) naturally yields zero
//     area and no centroid, the degenerate case the associator must skip.
// 2.  **Moments computed once**: the polygon moments are evaluated at
//     construction and cached on the struct. The associator consumes the
//     centroid to advance the anchor and the pose estimator reuses the same
//     value; neither recomputes it.
// 3.  **Proximity, not containment**: `distance_to` reports the unsigned
//     distance from a point to the nearest contour edge. Whether the point is
//     inside or outside the blob is irrelevant to association.

/// A 2D pixel coordinate on the frame raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

/// A connected foreground region traced from a thresholded, masked frame.
#[derive(Debug, Clone)]
pub struct Blob {
    /// Ordered outer-boundary contour. Interior holes are not represented.
    pub contour: Vec<Point>,
    /// Area enclosed by the contour polygon, in px².
    pub area: f64,
    centroid: Option<(f64, f64)>,
}

impl Blob {
    /// Builds a blob from its traced outer boundary, evaluating the polygon
    /// moments m00/m10/m01 in the same pass.
    pub fn from_contour(contour: Vec<Point>) -> Self {
        let n = contour.len();
        let mut m00 = 0.0;
        let mut m10 = 0.0;
        let mut m01 = 0.0;
        for i in 0..n {
            let (ax, ay) = (contour[i].x as f64, contour[i].y as f64);
            let j = (i + 1) % n;
            let (bx, by) = (contour[j].x as f64, contour[j].y as f64);
            let cross = ax * by - bx * ay;
            m00 += cross;
            m10 += (ax + bx) * cross;
            m01 += (ay + by) * cross;
        }
        m00 /= 2.0;
        m10 /= 6.0;
        m01 /= 6.0;

        let centroid = if m00 != 0.0 {
            Some((m10 / m00, m01 / m00))
        } else {
            None
        };

        Self {
            contour,
            area: m00.abs(),
            centroid,
        }
    }

    /// Area-weighted centroid of the contour, or `None` for a degenerate
    /// contour that encloses no area.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        self.centroid
    }

    /// Unsigned distance from `point` to the nearest contour edge.
    pub fn distance_to(&self, point: (f64, f64)) -> f64 {
        let n = self.contour.len();
        if n == 1 {
            let p = self.contour[0];
            return (point.0 - p.x as f64).hypot(point.1 - p.y as f64);
        }
        let mut best = f64::INFINITY;
        for i in 0..n {
            let a = self.contour[i];
            let b = self.contour[(i + 1) % n];
            let d = segment_distance(
                (a.x as f64, a.y as f64),
                (b.x as f64, b.y as f64),
                point,
            );
            if d < best {
                best = d;
            }
        }
        best
    }

    /// Axis-aligned bounding box as (top-left, bottom-right) corners.
    pub fn bounding_box(&self) -> (Point, Point) {
        let mut min_x = u32::MAX;
        let mut min_y = u32::MAX;
        let mut max_x = 0;
        let mut max_y = 0;
        for p in &self.contour {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (Point { x: min_x, y: min_y }, Point { x: max_x, y: max_y })
    }
}

fn segment_distance(a: (f64, f64), b: (f64, f64), p: (f64, f64)) -> f64 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return (p.0 - a.0).hypot(p.1 - a.1);
    }
    let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0);
    (p.0 - (a.0 + t * dx)).hypot(p.1 - (a.1 + t * dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_contour(x0: u32, y0: u32, x1: u32, y1: u32) -> Vec<Point> {
        vec![
            Point { x: x0, y: y0 },
            Point { x: x1, y: y0 },
            Point { x: x1, y: y1 },
            Point { x: x0, y: y1 },
        ]
    }

    #[test]
    fn rectangle_area_and_centroid() {
        let blob = Blob::from_contour(rect_contour(10, 20, 30, 40));
        assert_relative_eq!(blob.area, 400.0);
        let (cx, cy) = blob.centroid().unwrap();
        assert_relative_eq!(cx, 20.0);
        assert_relative_eq!(cy, 30.0);
    }

    #[test]
    fn collinear_contour_is_degenerate() {
        let blob = Blob::from_contour(vec![
            Point { x: 5, y: 5 },
            Point { x: 6, y: 5 },
            Point { x: 7, y: 5 },
            Point { x: 6, y: 5 },
        ]);
        assert_eq!(blob.area, 0.0);
        assert!(blob.centroid().is_none());
    }

    #[test]
    fn distance_is_unsigned_and_edge_based() {
        let blob = Blob::from_contour(rect_contour(10, 10, 20, 20));
        // Outside, 5 px left of the left edge.
        assert_relative_eq!(blob.distance_to((5.0, 15.0)), 5.0);
        // Inside: distance to the nearest edge, not zero and not negative.
        assert_relative_eq!(blob.distance_to((14.0, 15.0)), 4.0);
        // On an edge.
        assert_relative_eq!(blob.distance_to((10.0, 15.0)), 0.0);
    }

    #[test]
    fn bounding_box_spans_the_contour() {
        let blob = Blob::from_contour(rect_contour(3, 4, 9, 11));
        let (tl, br) = blob.bounding_box();
        assert_eq!((tl.x, tl.y), (3, 4));
        assert_eq!((br.x, br.y), (9, 11));
    }
}
