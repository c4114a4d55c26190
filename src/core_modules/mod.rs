pub mod blob;
pub mod blob_segmenter;
pub mod ellipse;
pub mod frame_sampler;
pub mod pose;
pub mod roi_mask;
pub mod track_log;
pub mod tracker;
