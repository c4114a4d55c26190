// THEORY:
// The `tracker` module solves the data association problem for exactly one
// animal. Where a multi-object tracker would manage a population of tracks
// with birth and death, this engine carries a single `AnchorPoint`: the spot
// where the animal was last seen. Each frame, the candidate blob nearest that
// anchor is "the animal," and the anchor advances to its centroid.
//
// Key architectural principles:
// 1.  **Explicit state, no globals**: the anchor is an owned field of
//     `BlobTracker`, seeded from the calibration click and mutated only by
//     `select`. Nothing else in the engine can touch it.
// 2.  **Proximity-only matching**: candidates are ranked by the unsigned
//     distance from the anchor to their contour. Whether the anchor sits
//     inside or outside a candidate does not matter.
// 3.  **Gap tolerance**: when no candidate is usable the anchor is left
//     exactly where it was. Dropouts of arbitrary length therefore cost
//     nothing: the moment a blob reappears near the stale anchor, tracking
//     resumes without any reset or reacquisition step.
// 4.  **Degeneracy guard**: a selected contour that encloses no area has no
//     centroid to advance to; it is treated as "no blob" rather than dividing
//     by a zero moment.

use crate::core_modules::blob::Blob;

/// Single-animal associator carrying the anchor point from frame to frame.
#[derive(Debug, Clone)]
pub struct BlobTracker {
    /// Where the animal currently is: the user's calibration click until the
    /// first successful detection, thereafter always the previous frame's
    /// chosen centroid.
    anchor: (f64, f64),
}

impl BlobTracker {
    pub fn new(click_point: (f64, f64)) -> Self {
        Self {
            anchor: click_point,
        }
    }

    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    /// Picks the candidate nearest the anchor and advances the anchor to its
    /// centroid.
    ///
    /// Returns `None` on a gap frame (an empty candidate list, or a nearest
    /// candidate whose contour is a zero-area degenerate), in which case the
    /// anchor is left untouched.
    pub fn select<'a>(&mut self, candidates: &'a [Blob]) -> Option<&'a Blob> {
        let (nearest, _) = candidates
            .iter()
            .map(|blob| (blob, blob.distance_to(self.anchor)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        let center = nearest.centroid()?;
        self.anchor = center;
        Some(nearest)
    }
}
