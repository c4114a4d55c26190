// THEORY:
// The `pipeline` module is the final, top-level API for the tracking engine.
// It encapsulates the full per-frame stack (sampling, segmentation,
// association, pose estimation, recording) behind a single struct the video
// loop feeds grayscale frames into.
//
// Control flow per decoded frame: the sampler admits or skips it; on an
// admitted frame the segmenter extracts candidate blobs, the tracker picks
// one (or none) by anchor proximity, the pose estimator derives the
// centroid/nose pair, and the recorder appends exactly one record. Each
// frame's result depends only on the anchor the previous frame left behind,
// never on deeper history, which is why the loop is strictly sequential.
//
// The two human calibration steps (ROI polygon, threshold + click) happen
// before this module is ever constructed: `SessionConfig` carries their
// results as plain data, so the engine has no dependency on any UI event
// loop. The returned `FrameReport` exposes what a live preview needs; it is
// purely observational and feeds nothing back into tracking.

use image::GrayImage;
use tracing::{debug, warn};

use crate::core_modules::blob_segmenter::blob_segmenter;
use crate::core_modules::frame_sampler::FrameSampler;
use crate::core_modules::pose;
use crate::core_modules::roi_mask::RoiMask;
use crate::core_modules::tracker::BlobTracker;
use crate::error::TrackerError;

// Re-export key data structures for the public API.
pub use crate::core_modules::blob::{Blob, Point};
pub use crate::core_modules::pose::Pose;
pub use crate::core_modules::track_log::{TrackLog, TrackRecord};

/// Default warm-up run of frames skipped at the head of every session.
pub const DEFAULT_START_FRAME: u64 = 10;

/// Contours enclosing no more than this area (px²) are noise, not the animal.
pub const DEFAULT_MIN_BLOB_AREA: f64 = 100.0;

/// Configuration for a tracking session. All values are fixed for the whole
/// session; the two calibration collaborators supply `roi`, `threshold` and
/// `click_point` once, before any frame is processed.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub frame_width: u32,
    pub frame_height: u32,
    /// ROI polygon vertices in frame pixel coordinates, in click order.
    pub roi: Vec<(i32, i32)>,
    /// Intensity cutoff: in-mask pixels strictly darker are foreground.
    pub threshold: u8,
    /// Calibration click marking the animal, the anchor for the first
    /// processed frame.
    pub click_point: (f64, f64),
    /// Source frame rate reported by the video facility.
    pub source_fps: f64,
    /// Desired output sampling rate in frames per second.
    pub sampling_rate: f64,
    /// First frame index to process.
    pub start_frame: u64,
    /// Minimum contour-enclosed area for a candidate blob, in px².
    pub min_blob_area: f64,
}

/// The outcome of feeding one decoded frame to the pipeline.
#[derive(Debug, Clone)]
pub enum FrameReport {
    /// Rejected by the frame sampler; nothing was recorded.
    Skipped,
    /// Admitted, but no usable blob was present: an absent record was
    /// appended and the anchor was preserved.
    Gap,
    /// Tracking succeeded. The selected blob is exposed so an optional
    /// preview collaborator can render its contour and bounding box.
    Tracked { blob: Blob, pose: Pose },
}

/// The main, top-level struct for the tracking engine.
pub struct TrackingPipeline {
    mask: RoiMask,
    sampler: FrameSampler,
    tracker: BlobTracker,
    threshold: u8,
    min_blob_area: f64,
    track: TrackLog,
}

impl TrackingPipeline {
    /// Validates the session configuration and builds the per-session state.
    ///
    /// Fatal conditions (degenerate ROI, unusable frame rates) surface here,
    /// before any frame is processed. A click point outside the ROI mask is
    /// advisory only: it is logged and tracking proceeds.
    pub fn new(config: SessionConfig) -> Result<Self, TrackerError> {
        let mask = RoiMask::from_polygon(&config.roi, config.frame_width, config.frame_height)?;
        let sampler =
            FrameSampler::new(config.source_fps, config.sampling_rate, config.start_frame)?;

        let (cx, cy) = config.click_point;
        let click_inside = cx >= 0.0
            && cy >= 0.0
            && mask.contains(cx.round() as u32, cy.round() as u32);
        if !click_inside {
            warn!(
                click_x = cx,
                click_y = cy,
                "calibration click point lies outside the ROI mask"
            );
        }

        Ok(Self {
            mask,
            sampler,
            tracker: BlobTracker::new(config.click_point),
            threshold: config.threshold,
            min_blob_area: config.min_blob_area,
            track: TrackLog::new(),
        })
    }

    /// Feeds the next decoded frame to the engine. Frames must arrive in
    /// increasing index order; skipped frames are never revisited.
    pub fn process_frame(&mut self, frame_index: u64, gray: &GrayImage) -> FrameReport {
        if !self.sampler.admits(frame_index) {
            return FrameReport::Skipped;
        }

        // --- 1. Segmentation ---
        let candidates =
            blob_segmenter::find_blobs(gray, &self.mask, self.threshold, self.min_blob_area);

        // --- 2. Association ---
        let Some(blob) = self.tracker.select(&candidates) else {
            debug!(frame_index, "detection gap: no usable blob");
            self.track.push(None);
            return FrameReport::Gap;
        };

        // --- 3. Pose estimation ---
        // The anchor was just advanced to the selected blob's centroid.
        let pose = pose::estimate(blob, self.tracker.anchor());

        // --- 4. Recording ---
        self.track.push(Some(pose));
        FrameReport::Tracked {
            blob: blob.clone(),
            pose,
        }
    }

    /// The records accumulated so far.
    pub fn track(&self) -> &TrackLog {
        &self.track
    }

    pub fn sampler(&self) -> &FrameSampler {
        &self.sampler
    }

    /// Current anchor point, for diagnostics and preview overlays.
    pub fn anchor(&self) -> (f64, f64) {
        self.tracker.anchor()
    }

    /// Consumes the pipeline, yielding the finished immutable track.
    pub fn into_track(self) -> TrackLog {
        self.track
    }
}
