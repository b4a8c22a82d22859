mod image_sequence;
mod video;

pub use image_sequence::ImageSequenceSource;
pub use video::VideoFileSource;

use anyhow::{Context, Result};
use opencv::core::{Mat, Size};
use std::path::Path;

/// Frame rate assumed when a source reports none
pub const FALLBACK_FRAME_RATE: f64 = 30.0;

/// Trait for decoded video sources
pub trait FrameSource {
    /// Read the next BGR frame in stream order
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    fn read_frame(&mut self) -> Result<Option<Mat>>;

    /// Frames per second of the stream
    fn frame_rate(&self) -> f64;

    /// Get the size of decoded frames
    fn frame_size(&self) -> Size;
}

/// Open a directory as an image sequence, anything else as a video file
///
/// `fps` is only used for image sequences, which carry no timing.
pub fn open_source(path: &Path, fps: f64) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        let source = ImageSequenceSource::open(path, fps)
            .with_context(|| format!("Failed to open image sequence at {}", path.display()))?;
        Ok(Box::new(source))
    } else {
        let source = VideoFileSource::open(path)
            .with_context(|| format!("Failed to open video at {}", path.display()))?;
        Ok(Box::new(source))
    }
}

pub(crate) fn sanitize_frame_rate(fps: f64) -> f64 {
    if fps.is_finite() && fps > 0.0 {
        fps
    } else {
        FALLBACK_FRAME_RATE
    }
}
