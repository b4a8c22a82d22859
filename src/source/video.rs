use super::{sanitize_frame_rate, FrameSource};
use crate::error::VideoError;
use crate::frame::frame_size;
use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture},
};
use std::path::Path;

/// Any container and codec the OpenCV video backend can decode
pub struct VideoFileSource {
    capture: VideoCapture,
    fps: f64,
    size: Size,
}

impl VideoFileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, VideoError> {
        let path = path.as_ref();
        tracing::info!("Opening video {}", path.display());

        let name = path
            .to_str()
            .ok_or_else(|| VideoError::NonUtf8Path(path.to_path_buf()))?;
        let capture = VideoCapture::from_file(name, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(VideoError::Open(path.to_path_buf()));
        }

        let fps = sanitize_frame_rate(capture.get(videoio::CAP_PROP_FPS)?);
        let size = Size::new(
            capture.get(videoio::CAP_PROP_FRAME_WIDTH)? as i32,
            capture.get(videoio::CAP_PROP_FRAME_HEIGHT)? as i32,
        );

        tracing::info!(
            "Video opened: {}x{} @ {:.3} fps",
            size.width,
            size.height,
            fps
        );

        Ok(Self { capture, fps, size })
    }
}

impl FrameSource for VideoFileSource {
    fn read_frame(&mut self) -> Result<Option<Mat>> {
        let mut frame = Mat::default();
        let grabbed = self
            .capture
            .read(&mut frame)
            .context("Failed to decode frame")?;

        if !grabbed || frame.rows() == 0 {
            return Ok(None);
        }

        let size = frame_size(&frame);
        if size != self.size {
            return Err(VideoError::SizeMismatch {
                expected: (self.size.width, self.size.height),
                actual: (size.width, size.height),
            }
            .into());
        }

        Ok(Some(frame))
    }

    fn frame_rate(&self) -> f64 {
        self.fps
    }

    fn frame_size(&self) -> Size {
        self.size
    }
}
