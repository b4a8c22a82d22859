use super::FrameSink;
use crate::error::VideoError;
use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{VideoWriter, VideoWriterTrait},
};
use std::path::{Path, PathBuf};

/// Four-character code for the container named by the file extension
///
/// MPEG-4 Part 2 for `.mp4` and anything unknown, Motion JPEG for `.avi`.
fn fourcc_for(path: &Path) -> opencv::Result<i32> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("avi") => VideoWriter::fourcc('M', 'J', 'P', 'G'),
        _ => VideoWriter::fourcc('m', 'p', '4', 'v'),
    }
}

/// Encodes frames into a video file through the OpenCV video backend
pub struct VideoFileSink {
    writer: VideoWriter,
    path: PathBuf,
    frames_written: u64,
    released: bool,
}

impl VideoFileSink {
    /// Create the file (and its parent directory) for frames of `size` at `fps`
    pub fn create<P: AsRef<Path>>(path: P, size: Size, fps: f64) -> Result<Self, VideoError> {
        let path = path.as_ref();
        tracing::info!(
            "Creating video {} at {}x{} @ {:.3} fps",
            path.display(),
            size.width,
            size.height,
            fps
        );

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let name = path
            .to_str()
            .ok_or_else(|| VideoError::NonUtf8Path(path.to_path_buf()))?;
        let writer = VideoWriter::new(name, fourcc_for(path)?, fps, size, true)?;
        if !writer.is_opened()? {
            return Err(VideoError::Writer(path.to_path_buf()));
        }

        Ok(Self {
            writer,
            path: path.to_path_buf(),
            frames_written: 0,
            released: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSink for VideoFileSink {
    fn write_frame(&mut self, frame: &Mat) -> Result<()> {
        self.writer
            .write(frame)
            .with_context(|| format!("Failed to encode frame into {}", self.path.display()))?;
        self.frames_written += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        if !self.released {
            self.writer
                .release()
                .with_context(|| format!("Failed to finalize {}", self.path.display()))?;
            self.released = true;
            tracing::info!(
                "Wrote {} frames to {}",
                self.frames_written,
                self.path.display()
            );
        }
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }
}
