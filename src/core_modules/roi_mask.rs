// THEORY:
// The `roi_mask` module turns the user-selected region of interest (an ordered
// polygon in frame pixel coordinates) into a binary raster the segmenter can
// consult once per pixel. The calibration collaborator supplies the polygon
// exactly once, before the frame loop starts; the mask is built from it in a
// single pass and never touched again.
//
// Key architectural principles:
// 1.  **Immutability**: a `RoiMask` is built once per session and shared
//     read-only by every frame's segmentation step. There is no API to edit it.
// 2.  **Boundary inclusion**: pixels lying exactly on a polygon edge count as
//     inside, matching the closed-polygon contract of the ROI collaborator.
// 3.  **Pure construction**: the raster is a deterministic function of the
//     vertices and the target dimensions, with no hidden state.
//
// Known limitation: the polygon is assumed simple (non-self-intersecting).
// The even-odd rule still produces *a* raster for self-intersecting input,
// but which pixels it marks is unspecified and not validated.

use image::GrayImage;

use crate::error::TrackerError;

/// Raster value for pixels inside (or on) the ROI polygon.
pub const MASK_FOREGROUND: u8 = 255;

/// Binary raster over the frame: `MASK_FOREGROUND` inside the closed ROI
/// polygon, 0 outside. Same dimensions as the frames it will be applied to.
#[derive(Debug, Clone)]
pub struct RoiMask {
    raster: GrayImage,
}

impl RoiMask {
    /// Rasterizes the closed polygon over a `width` x `height` frame.
    ///
    /// Fails with `DegenerateRoi` when fewer than 3 vertices are supplied;
    /// anything else the ROI collaborator hands over is accepted as-is.
    pub fn from_polygon(
        vertices: &[(i32, i32)],
        width: u32,
        height: u32,
    ) -> Result<Self, TrackerError> {
        if vertices.len() < 3 {
            return Err(TrackerError::DegenerateRoi(vertices.len()));
        }

        let mut raster = GrayImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if polygon_contains(vertices, x as f64, y as f64) {
                    raster.put_pixel(x, y, image::Luma([MASK_FOREGROUND]));
                }
            }
        }
        Ok(Self { raster })
    }

    /// Whether the pixel at `(x, y)` lies inside the ROI. Out-of-bounds
    /// coordinates are outside by definition.
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.raster.width()
            && y < self.raster.height()
            && self.raster.get_pixel(x, y).0[0] == MASK_FOREGROUND
    }

    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Read-only view of the underlying raster, for preview rendering.
    pub fn raster(&self) -> &GrayImage {
        &self.raster
    }
}

/// Even-odd point-in-polygon test with boundary pixels counted as inside.
fn polygon_contains(vertices: &[(i32, i32)], px: f64, py: f64) -> bool {
    let n = vertices.len();

    // Edge pixels are part of the closed polygon.
    for i in 0..n {
        let (ax, ay) = vertices[i];
        let (bx, by) = vertices[(i + 1) % n];
        if on_segment(ax as f64, ay as f64, bx as f64, by as f64, px, py) {
            return true;
        }
    }

    // Even-odd ray cast along +x.
    let mut inside = false;
    for i in 0..n {
        let (ax, ay) = (vertices[i].0 as f64, vertices[i].1 as f64);
        let j = (i + 1) % n;
        let (bx, by) = (vertices[j].0 as f64, vertices[j].1 as f64);
        if (ay > py) != (by > py) {
            let x_cross = ax + (py - ay) / (by - ay) * (bx - ax);
            if px < x_cross {
                inside = !inside;
            }
        }
    }
    inside
}

fn on_segment(ax: f64, ay: f64, bx: f64, by: f64, px: f64, py: f64) -> bool {
    let cross = (bx - ax) * (py - ay) - (by - ay) * (px - ax);
    if cross.abs() > 1e-9 {
        return false;
    }
    px >= ax.min(bx) && px <= ax.max(bx) && py >= ay.min(by) && py <= ay.max(by)
}
