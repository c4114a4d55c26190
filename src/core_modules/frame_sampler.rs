// THEORY:
// The `frame_sampler` module reconciles the source video's frame rate with the
// desired output rate. Rather than resampling in time, it admits or skips
// whole decoded frames: an integer stride is derived once from the two rates,
// and a frame is admitted when its index (relative to the session start frame)
// falls on the stride. This yields an approximately uniform temporal subsample
// whose phase is anchored to the start frame, not to the stream's absolute
// beginning.
//
// The sampler is a pure predicate. It holds no per-frame state and never
// suspends; the surrounding decode loop calls `admits` exactly once per
// decoded frame and drops the frame on a `false`.

use crate::error::TrackerError;

/// Decides which decoded frames enter the tracking pipeline.
#[derive(Debug, Clone, Copy)]
pub struct FrameSampler {
    start_frame: u64,
    stride: u64,
}

impl FrameSampler {
    /// Derives the sampling stride from the reported source rate and the
    /// desired output rate.
    ///
    /// `stride = round(source_fps / sampling_rate)` when the output rate is
    /// lower than the source rate; otherwise every frame is processed. A
    /// zero, negative, or non-finite rate on either side is a fatal
    /// configuration error: no fallback is guessed here, the caller must
    /// supply a usable rate.
    pub fn new(source_fps: f64, sampling_rate: f64, start_frame: u64) -> Result<Self, TrackerError> {
        if !source_fps.is_finite() || source_fps <= 0.0 {
            return Err(TrackerError::InvalidFrameRate(source_fps));
        }
        if !sampling_rate.is_finite() || sampling_rate <= 0.0 {
            return Err(TrackerError::InvalidFrameRate(sampling_rate));
        }

        let stride = if sampling_rate < source_fps {
            (source_fps / sampling_rate).round() as u64
        } else {
            1
        };

        Ok(Self {
            start_frame,
            stride: stride.max(1),
        })
    }

    /// Whether the frame at `frame_index` is processed or skipped.
    pub fn admits(&self, frame_index: u64) -> bool {
        frame_index >= self.start_frame && (frame_index - self.start_frame) % self.stride == 0
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_rates_admit_every_frame() {
        let sampler = FrameSampler::new(60.0, 60.0, 10).unwrap();
        assert_eq!(sampler.stride(), 1);
        for i in 10..40 {
            assert!(sampler.admits(i));
        }
    }

    #[test]
    fn output_above_source_admits_every_frame() {
        let sampler = FrameSampler::new(30.0, 120.0, 0).unwrap();
        assert_eq!(sampler.stride(), 1);
    }

    #[test]
    fn one_third_rate_admits_every_third_frame() {
        let sampler = FrameSampler::new(60.0, 20.0, 10).unwrap();
        assert_eq!(sampler.stride(), 3);
        let admitted: Vec<u64> = (10..25).filter(|&i| sampler.admits(i)).collect();
        assert_eq!(admitted, vec![10, 13, 16, 19, 22]);
    }

    #[test]
    fn phase_is_anchored_to_the_start_frame() {
        let sampler = FrameSampler::new(60.0, 30.0, 7).unwrap();
        assert!(sampler.admits(7));
        assert!(!sampler.admits(8));
        assert!(sampler.admits(9));
    }

    #[test]
    fn warm_up_frames_are_never_admitted() {
        let sampler = FrameSampler::new(60.0, 60.0, 10).unwrap();
        for i in 0..10 {
            assert!(!sampler.admits(i));
        }
    }

    #[test]
    fn zero_source_rate_is_fatal() {
        assert!(matches!(
            FrameSampler::new(0.0, 60.0, 0),
            Err(TrackerError::InvalidFrameRate(_))
        ));
        assert!(matches!(
            FrameSampler::new(f64::NAN, 60.0, 0),
            Err(TrackerError::InvalidFrameRate(_))
        ));
    }
}
