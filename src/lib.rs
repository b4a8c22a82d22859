//! Single-ball tracking for video streams
//!
//! Each frame runs through a motion model and a color filter, the
//! overlapping region with the largest area is taken as the ball, and the
//! recent positions are drawn as a tapering trail on the output video.

pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod pipeline;
pub mod segmentation;
pub mod sink;
pub mod source;
pub mod tracking;

pub use config::{HsvRange, TrackerConfig, DEFAULT_OUTPUT_PATH};
pub use pipeline::{
    passthrough_video, run_pipeline, track_video, BallTracker, FrameReport, PipelineSummary,
    RunStats,
};
