mod image_sequence;
mod video;

pub use image_sequence::ImageSequenceSink;
pub use video::VideoFileSink;

use anyhow::Result;
use opencv::core::Mat;

/// Trait for output destinations
pub trait FrameSink {
    /// Write a BGR frame to the output
    fn write_frame(&mut self, frame: &Mat) -> Result<()>;

    /// Flush everything written so far
    fn release(&mut self) -> Result<()>;

    /// Number of frames accepted by `write_frame`
    fn frames_written(&self) -> u64;
}

/// Fans every frame out to several sinks
pub struct MultiSink {
    sinks: Vec<Box<dyn FrameSink>>,
}

impl MultiSink {
    pub fn new(sinks: Vec<Box<dyn FrameSink>>) -> Self {
        Self { sinks }
    }
}

impl FrameSink for MultiSink {
    fn write_frame(&mut self, frame: &Mat) -> Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.write_frame(frame)?;
        }
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        for sink in self.sinks.iter_mut() {
            sink.release()?;
        }
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.sinks.first().map(|s| s.frames_written()).unwrap_or(0)
    }
}
