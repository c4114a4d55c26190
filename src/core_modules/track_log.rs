// THEORY:
// The `track_log` module owns the only artifact that outlives the frame loop:
// the ordered sequence of per-frame records. Internally the track is a single
// sequence of optional poses, one entry per sampled frame in sampling order,
// with a `None` marking every detection gap. The historical on-disk format
// (two parallel coordinate files with gaps silently omitted, so their lengths
// need not match the frame count) is produced only at the persistence
// boundary; nothing inside the engine ever works with the parallel-list shape.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::core_modules::pose::Pose;

/// Outcome of one sampled frame: a pose when tracking succeeded, `None` on a
/// detection gap. Partial records (center without nose or vice versa) cannot
/// be represented.
pub type TrackRecord = Option<Pose>;

/// Ordered per-sampled-frame records of one tracking session.
#[derive(Debug, Clone, Default)]
pub struct TrackLog {
    records: Vec<TrackRecord>,
}

impl TrackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the next sampled frame's record. Callers append in increasing
    /// frame order; the log preserves exactly that order.
    pub fn push(&mut self, record: TrackRecord) {
        self.records.push(record);
    }

    pub fn records(&self) -> &[TrackRecord] {
        &self.records
    }

    /// Number of sampled frames recorded, gaps included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of frames with a successful detection.
    pub fn detections(&self) -> usize {
        self.records.iter().flatten().count()
    }

    /// Writes the legacy two-file format next to the analysis scripts that
    /// consume it: one line per detected point, five-decimal coordinates,
    /// gaps omitted. Files are named after the source video's base name.
    ///
    /// Consumers must not assume the files are frame-index addressable: with
    /// gaps omitted they are shorter than the sampled frame count.
    pub fn save(
        &self,
        output_dir: &Path,
        video_basename: &str,
    ) -> io::Result<(PathBuf, PathBuf)> {
        let nose_path = output_dir.join(format!("nose_track_{video_basename}.txt"));
        let body_path = output_dir.join(format!("body_track_{video_basename}.txt"));

        let nose_lines: Vec<String> = self
            .records
            .iter()
            .flatten()
            .map(|pose| format!("{:.5} {:.5}", pose.nose.0, pose.nose.1))
            .collect();
        let body_lines: Vec<String> = self
            .records
            .iter()
            .flatten()
            .map(|pose| format!("{:.5} {:.5}", pose.center.0, pose.center.1))
            .collect();

        fs::write(&nose_path, nose_lines.join("\n"))?;
        fs::write(&body_path, body_lines.join("\n"))?;
        Ok((nose_path, body_path))
    }
}
