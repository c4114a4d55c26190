// THEORY:
// This file is the main entry point for the `rodent_vision` library crate.
// It follows the standard Rust convention of using `lib.rs` to define the public
// API that will be exposed to external consumers (like the `video_tracker`
// binary).
//
// The primary goal is to export the `TrackingPipeline` and its associated data
// structures (`SessionConfig`, `FrameReport`, `TrackLog`, etc.) as the clean,
// high-level interface for the entire tracking engine. The internal modules
// (`core_modules`) stay encapsulated behind it, so a consumer only ever feeds
// grayscale frames in and reads track records out.

pub mod core_modules;
pub mod error;
pub mod pipeline;
