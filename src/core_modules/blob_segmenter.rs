// THEORY:
// The `BlobSegmenter` is the engine of the per-frame detection layer. It turns
// a grayscale frame plus the session mask and threshold into an ordered list
// of candidate `Blob`s for the associator to choose from.
//
// Key architectural principles & algorithm steps:
// 1.  **Binarization**: a pixel is foreground iff it lies inside the ROI mask
//     AND its intensity is strictly below the session threshold. The tracked
//     animal is assumed darker than the background; that polarity is a fixed
//     property of the segmenter, never auto-detected. Masked-out pixels are
//     never foreground, whatever their intensity.
// 2.  **Connected components**: foreground pixels are grouped 8-connected. A
//     row-major scan discovers each component at its topmost-leftmost pixel,
//     which fixes the output order ("ordered by discovery").
// 3.  **Outer boundary tracing**: each component contributes only its outer
//     boundary, traced clockwise with Moore-neighbor tracing and Jacob's
//     stopping criterion. Interior holes are not tracked separately.
// 4.  **Area filter**: candidates whose contour-enclosed area does not exceed
//     the minimum-area constant are dropped as noise.
// 5.  **Stateless utility**: `find_blobs` has no memory between frames. An
//     empty result is the normal outcome of a gap frame, not an error.

use image::GrayImage;

use crate::core_modules::blob::{Blob, Point};
use crate::core_modules::roi_mask::RoiMask;

pub mod blob_segmenter {
    use super::*;

    /// Clockwise 8-neighborhood in image coordinates (y grows downward):
    /// E, SE, S, SW, W, NW, N, NE.
    const NEIGHBORS: [(i32, i32); 8] = [
        (1, 0),
        (1, 1),
        (0, 1),
        (-1, 1),
        (-1, 0),
        (-1, -1),
        (0, -1),
        (1, -1),
    ];

    /// Extracts all candidate blobs from one frame.
    ///
    /// Candidates are returned in discovery order (row-major over the frame).
    /// Returns an empty vector when nothing above `min_area` is present.
    pub fn find_blobs(
        gray: &GrayImage,
        mask: &RoiMask,
        threshold: u8,
        min_area: f64,
    ) -> Vec<Blob> {
        let (width, height) = gray.dimensions();

        // --- 1. Binarization ---
        let mut foreground = vec![false; (width * height) as usize];
        for y in 0..height {
            for x in 0..width {
                if mask.contains(x, y) && gray.get_pixel(x, y).0[0] < threshold {
                    foreground[(y * width + x) as usize] = true;
                }
            }
        }

        // --- 2. Component discovery + boundary tracing ---
        let mut visited = vec![false; (width * height) as usize];
        let mut blobs = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let idx = (y * width + x) as usize;
                if !foreground[idx] || visited[idx] {
                    continue;
                }
                // Topmost-leftmost pixel of an undiscovered component.
                let contour = trace_outer_boundary(&foreground, width, height, x, y);
                mark_component(&foreground, &mut visited, width, height, x, y);

                // --- 3. Area filter ---
                let blob = Blob::from_contour(contour);
                if blob.area > min_area {
                    blobs.push(blob);
                }
            }
        }
        blobs
    }

    /// Moore-neighbor tracing, clockwise, starting at the component's
    /// topmost-leftmost pixel. Terminates when the walk is about to repeat
    /// its first transition (Jacob's stopping criterion), so boundaries that
    /// pass through the start pixel more than once are handled.
    fn trace_outer_boundary(
        foreground: &[bool],
        width: u32,
        height: u32,
        start_x: u32,
        start_y: u32,
    ) -> Vec<Point> {
        let is_fg = |x: i32, y: i32| -> bool {
            x >= 0
                && y >= 0
                && (x as u32) < width
                && (y as u32) < height
                && foreground[(y as u32 * width + x as u32) as usize]
        };

        // Scan the neighbors of `(x, y)` clockwise, starting just past the
        // backtrack direction implied by the arrival direction `dir`.
        // Returns the first foreground neighbor and the direction taken.
        let next_boundary_pixel = |x: u32, y: u32, dir: usize| -> Option<(Point, usize)> {
            for i in 0..8 {
                let d = (dir + 6 + i) % 8;
                let (dx, dy) = NEIGHBORS[d];
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if is_fg(nx, ny) {
                    return Some((
                        Point {
                            x: nx as u32,
                            y: ny as u32,
                        },
                        d,
                    ));
                }
            }
            None
        };

        let start = Point {
            x: start_x,
            y: start_y,
        };
        let mut contour = vec![start];

        // The start pixel was discovered scanning row-major, so its west and
        // all northern neighbors are background: treat it as entered from the
        // west (direction E = 0).
        let Some((second, first_dir)) = next_boundary_pixel(start_x, start_y, 0) else {
            // Isolated single pixel.
            return contour;
        };

        let mut current = second;
        let mut dir = first_dir;
        // Upper bound on boundary states; bail out rather than spin if the
        // walk ever degenerates.
        let max_steps = 4 * (width as usize) * (height as usize);
        for _ in 0..max_steps {
            if current == start {
                if let Some((next, next_dir)) = next_boundary_pixel(current.x, current.y, dir) {
                    if next == second && next_dir == first_dir {
                        break;
                    }
                }
            }
            contour.push(current);
            match next_boundary_pixel(current.x, current.y, dir) {
                Some((next, next_dir)) => {
                    current = next;
                    dir = next_dir;
                }
                None => break,
            }
        }
        contour
    }

    /// Flood-fills the 8-connected component containing `(x, y)` into
    /// `visited`, so later scan positions do not rediscover it.
    fn mark_component(
        foreground: &[bool],
        visited: &mut [bool],
        width: u32,
        height: u32,
        x: u32,
        y: u32,
    ) {
        let mut queue = vec![(x, y)];
        visited[(y * width + x) as usize] = true;
        while let Some((cx, cy)) = queue.pop() {
            for (dx, dy) in NEIGHBORS {
                let (nx, ny) = (cx as i32 + dx, cy as i32 + dy);
                if nx < 0 || ny < 0 || nx as u32 >= width || ny as u32 >= height {
                    continue;
                }
                let idx = (ny as u32 * width + nx as u32) as usize;
                if foreground[idx] && !visited[idx] {
                    visited[idx] = true;
                    queue.push((nx as u32, ny as u32));
                }
            }
        }
    }
}
