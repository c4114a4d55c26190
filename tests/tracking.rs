// End-to-end scenarios over synthetic frame sequences: a dark animal-sized
// square over a light background inside a polygonal ROI, driven through the
// full pipeline exactly as the video binary drives real footage.

use image::GrayImage;
use rodent_vision::pipeline::{
    FrameReport, SessionConfig, TrackingPipeline, DEFAULT_MIN_BLOB_AREA,
};

const WIDTH: u32 = 100;
const HEIGHT: u32 = 80;
const BACKGROUND: u8 = 200;
const ANIMAL: u8 = 30;

fn blank_frame() -> GrayImage {
    GrayImage::from_pixel(WIDTH, HEIGHT, image::Luma([BACKGROUND]))
}

fn frame_with_square(x0: u32, y0: u32, side: u32) -> GrayImage {
    let mut img = blank_frame();
    for y in y0..y0 + side {
        for x in x0..x0 + side {
            img.put_pixel(x, y, image::Luma([ANIMAL]));
        }
    }
    img
}

fn session(click: (f64, f64), start_frame: u64) -> SessionConfig {
    SessionConfig {
        frame_width: WIDTH,
        frame_height: HEIGHT,
        roi: vec![(2, 2), (97, 2), (97, 77), (2, 77)],
        threshold: 90,
        click_point: click,
        source_fps: 60.0,
        sampling_rate: 60.0,
        start_frame,
        min_blob_area: DEFAULT_MIN_BLOB_AREA,
    }
}

/// Ten frames of a square moving linearly: every record present, centroids on
/// the known path, noses within the heading-ambiguity allowance.
#[test]
fn tracks_a_linearly_moving_square() {
    let mut pipeline = TrackingPipeline::new(session((17.0, 36.0), 10)).unwrap();

    for i in 0u64..20 {
        let report = if i < 10 {
            // Warm-up frames: content is irrelevant, they must be skipped.
            pipeline.process_frame(i, &blank_frame())
        } else {
            let step = (i - 10) as u32;
            pipeline.process_frame(i, &frame_with_square(10 + 6 * step, 30, 14))
        };
        if i < 10 {
            assert!(matches!(report, FrameReport::Skipped));
        } else {
            assert!(matches!(report, FrameReport::Tracked { .. }));
        }
    }

    let track = pipeline.into_track();
    assert_eq!(track.len(), 10);
    assert_eq!(track.detections(), 10);

    for (k, record) in track.records().iter().enumerate() {
        let pose = record.expect("every frame has a detection");
        let expected = (10.0 + 6.0 * k as f64 + 6.5, 36.5);
        assert!(
            (pose.center.0 - expected.0).abs() <= 1.0
                && (pose.center.1 - expected.1).abs() <= 1.0,
            "frame {k}: centroid {:?} off the expected path {expected:?}",
            pose.center
        );
        // The nose may sit anywhere the 180°-ambiguous heading allows, but
        // never further from the body than the blob itself extends.
        let nose_offset =
            (pose.nose.0 - pose.center.0).hypot(pose.nose.1 - pose.center.1);
        assert!(nose_offset <= 10.0, "frame {k}: nose offset {nose_offset}");
    }
}

/// A dropout of three frames neither resets the anchor nor aborts the run:
/// the gap is recorded as three absences and tracking reacquires by itself.
#[test]
fn survives_detection_gaps_and_reacquires() {
    let mut pipeline = TrackingPipeline::new(session((25.0, 25.0), 0)).unwrap();

    assert!(matches!(
        pipeline.process_frame(0, &frame_with_square(20, 20, 14)),
        FrameReport::Tracked { .. }
    ));
    for i in 1..4 {
        assert!(matches!(
            pipeline.process_frame(i, &blank_frame()),
            FrameReport::Gap
        ));
    }

    // The animal reappears near where it vanished, with a decoy far away:
    // the stale anchor must pick the near blob without any reset.
    let mut reappearance = frame_with_square(24, 22, 14);
    for y in 55..69 {
        for x in 70..84 {
            reappearance.put_pixel(x, y, image::Luma([ANIMAL]));
        }
    }
    let report = pipeline.process_frame(4, &reappearance);
    let FrameReport::Tracked { pose, .. } = report else {
        panic!("expected reacquisition on frame 4");
    };
    assert!((pose.center.0 - (24.0 + 6.5)).abs() <= 1.0);
    assert!((pose.center.1 - (22.0 + 6.5)).abs() <= 1.0);

    let track = pipeline.into_track();
    assert_eq!(track.len(), 5);
    assert_eq!(track.detections(), 2);
    let gaps: Vec<bool> = track.records().iter().map(|r| r.is_none()).collect();
    assert_eq!(gaps, vec![false, true, true, true, false]);
}

/// Re-running the pipeline on identical inputs produces byte-identical
/// output track files.
#[test]
fn identical_sessions_write_identical_files() {
    let run = |tag: &str| -> (Vec<u8>, Vec<u8>) {
        let mut pipeline = TrackingPipeline::new(session((17.0, 36.0), 10)).unwrap();
        for i in 10u64..20 {
            let step = (i - 10) as u32;
            pipeline.process_frame(i, &frame_with_square(10 + 6 * step, 30, 14));
        }
        let dir = std::env::temp_dir().join(format!("rodent_vision_idempotence_{tag}"));
        std::fs::create_dir_all(&dir).unwrap();
        let (nose_path, body_path) = pipeline.into_track().save(&dir, "synthetic").unwrap();
        let nose = std::fs::read(&nose_path).unwrap();
        let body = std::fs::read(&body_path).unwrap();
        std::fs::remove_file(nose_path).ok();
        std::fs::remove_file(body_path).ok();
        std::fs::remove_dir(dir).ok();
        (nose, body)
    };

    let (nose_a, body_a) = run("a");
    let (nose_b, body_b) = run("b");
    assert!(!body_a.is_empty());
    assert_eq!(nose_a, nose_b);
    assert_eq!(body_a, body_b);
}
