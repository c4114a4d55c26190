// Drives the `rodent_vision` engine over a real video file.
//
// This binary owns everything the library deliberately does not: OpenCV video
// decoding, BGR→grayscale conversion, and the optional best-effort live
// preview window. The two interactive calibration steps (ROI corners,
// threshold + click point) are modeled as plain data handed over on the
// command line: whoever ran the calibration UI passes its results here, and
// the engine never sees an event loop.

use anyhow::{Context, Result};
use clap::Parser;
use image::GrayImage;
use opencv::{
    core::{self, Mat, Scalar, Vector},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use rodent_vision::error::TrackerError;
use rodent_vision::pipeline::{
    Blob, FrameReport, Pose, SessionConfig, TrackingPipeline, DEFAULT_MIN_BLOB_AREA,
    DEFAULT_START_FRAME,
};
use std::path::PathBuf;
use tracing::{info, warn};

const PREVIEW_WINDOW: &str = "Live Tracking";
const ESC_KEY: i32 = 27;

/// Tracks a single dark animal through an open-field video and writes the
/// nose/body track files next to the analysis scripts that consume them.
#[derive(Parser, Debug)]
#[command(name = "video_tracker", version, about)]
struct Args {
    /// Input video file.
    video: PathBuf,

    /// Directory for the output track files.
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// ROI corner as x,y; pass four times, in click order.
    #[arg(long = "roi", value_parser = parse_point, num_args = 4, value_name = "X,Y")]
    roi: Vec<(i32, i32)>,

    /// Binarization threshold (0-255) from the calibration step.
    #[arg(short, long)]
    threshold: u8,

    /// Calibration click on the animal, as x,y.
    #[arg(long, value_parser = parse_point, value_name = "X,Y")]
    click: (i32, i32),

    /// Desired output sampling rate in frames per second.
    #[arg(short = 'r', long, default_value_t = 60.0)]
    sampling_rate: f64,

    /// First frame index to process.
    #[arg(long, default_value_t = DEFAULT_START_FRAME)]
    start_frame: u64,

    /// Show a best-effort live preview window (Esc aborts, keeping the
    /// track recorded so far).
    #[arg(long)]
    preview: bool,
}

fn parse_point(s: &str) -> Result<(i32, i32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{s}`"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    Ok((x, y))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let video_path = args.video.display().to_string();

    // --- 1. Video source ---
    let mut cap = VideoCapture::from_file(&video_path, videoio::CAP_ANY)?;
    if !cap.is_opened()? {
        return Err(TrackerError::UnreadableVideo(video_path).into());
    }
    let source_fps = cap.get(videoio::CAP_PROP_FPS)?;
    let total_frames = cap.get(videoio::CAP_PROP_FRAME_COUNT)? as u64;
    let frame_width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
    let frame_height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;
    info!(source_fps, total_frames, frame_width, frame_height, "opened video");

    // --- 2. Session configuration ---
    let config = SessionConfig {
        frame_width,
        frame_height,
        roi: args.roi.clone(),
        threshold: args.threshold,
        click_point: (args.click.0 as f64, args.click.1 as f64),
        source_fps,
        sampling_rate: args.sampling_rate,
        start_frame: args.start_frame,
        min_blob_area: DEFAULT_MIN_BLOB_AREA,
    };
    let mut pipeline = TrackingPipeline::new(config)?;
    info!(
        stride = pipeline.sampler().stride(),
        start_frame = args.start_frame,
        "tracking session ready"
    );

    if args.preview {
        highgui::named_window(PREVIEW_WINDOW, highgui::WINDOW_AUTOSIZE)?;
    }

    // --- 3. Frame loop ---
    cap.set(videoio::CAP_PROP_POS_FRAMES, args.start_frame as f64)?;
    let mut frame = Mat::default();
    let mut frame_index = args.start_frame;
    'frames: while total_frames == 0 || frame_index < total_frames {
        if !cap.read(&mut frame)? || frame.empty() {
            break;
        }

        let gray = to_gray_image(&frame)?;
        let report = pipeline.process_frame(frame_index, &gray);

        if args.preview {
            if let FrameReport::Tracked { blob, pose } = &report {
                show_preview(&frame, blob, pose)?;
                if highgui::wait_key(1)? == ESC_KEY {
                    info!(frame_index, "preview aborted; keeping recorded track");
                    break 'frames;
                }
            }
        }

        frame_index += 1;
    }
    if args.preview {
        highgui::destroy_window(PREVIEW_WINDOW).ok();
    }

    // --- 4. Persistence ---
    let track = pipeline.into_track();
    let processed = track.len();
    let detections = track.detections();
    info!(
        processed,
        detections,
        gaps = processed - detections,
        "tracking finished"
    );
    if detections == 0 {
        warn!("no frame produced a detection; check threshold and ROI");
    }

    std::fs::create_dir_all(&args.output_dir)?;
    let basename = video_basename(&args.video);
    let (nose_path, body_path) = track
        .save(&args.output_dir, &basename)
        .context("writing track files")?;
    info!(
        nose = %nose_path.display(),
        body = %body_path.display(),
        "track files written"
    );
    Ok(())
}

/// Converts a decoded BGR frame into the grayscale buffer the engine expects.
fn to_gray_image(frame: &Mat) -> Result<GrayImage> {
    let mut gray = Mat::default();
    imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
    let width = gray.cols() as u32;
    let height = gray.rows() as u32;
    let data = gray.data_bytes()?.to_vec();
    GrayImage::from_raw(width, height, data).context("grayscale frame buffer size mismatch")
}

/// Renders the per-frame overlay: contour in white, body centroid in green,
/// nose estimate in red, bounding box in blue.
fn show_preview(frame: &Mat, blob: &Blob, pose: &Pose) -> Result<()> {
    let mut preview = frame.clone();

    let mut polyline = Vector::<core::Point>::new();
    for p in &blob.contour {
        polyline.push(core::Point::new(p.x as i32, p.y as i32));
    }
    let polylines = Vector::<Vector<core::Point>>::from_iter([polyline]);
    imgproc::polylines(
        &mut preview,
        &polylines,
        true,
        Scalar::new(255.0, 255.0, 255.0, 0.0),
        1,
        imgproc::LINE_8,
        0,
    )?;

    imgproc::circle(
        &mut preview,
        core::Point::new(pose.center.0.round() as i32, pose.center.1.round() as i32),
        4,
        Scalar::new(0.0, 255.0, 0.0, 0.0),
        -1,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::circle(
        &mut preview,
        core::Point::new(pose.nose.0.round() as i32, pose.nose.1.round() as i32),
        3,
        Scalar::new(0.0, 0.0, 255.0, 0.0),
        -1,
        imgproc::LINE_8,
        0,
    )?;

    let (top_left, bottom_right) = blob.bounding_box();
    let rect = core::Rect::new(
        top_left.x as i32,
        top_left.y as i32,
        (bottom_right.x - top_left.x + 1) as i32,
        (bottom_right.y - top_left.y + 1) as i32,
    );
    imgproc::rectangle(
        &mut preview,
        rect,
        Scalar::new(255.0, 0.0, 0.0, 0.0),
        2,
        imgproc::LINE_8,
        0,
    )?;

    highgui::imshow(PREVIEW_WINDOW, &preview)?;
    Ok(())
}

fn video_basename(path: &std::path::Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string())
}
