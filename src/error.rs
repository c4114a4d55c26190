use thiserror::Error;

/// Fatal session-configuration failures.
///
/// Every variant aborts the session before a single frame is processed.
/// Per-frame detection dropouts are deliberately *not* represented here: a gap
/// frame is recorded as an absent track entry and the loop carries on (see
/// `pipeline`).
#[derive(Debug, Error)]
pub enum TrackerError {
    /// The video facility could not open or read the source at all.
    #[error("could not read video source: {0}")]
    UnreadableVideo(String),

    /// The source frame rate (or the requested sampling rate) is zero,
    /// negative, or undetermined, so no sampling stride can be derived.
    #[error("frame rate is zero or undetermined: {0}")]
    InvalidFrameRate(f64),

    /// The ROI polygon cannot enclose any area.
    #[error("ROI polygon needs at least 3 vertices, got {0}")]
    DegenerateRoi(usize),
}
