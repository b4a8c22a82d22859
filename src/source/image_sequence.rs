use super::{sanitize_frame_rate, FrameSource};
use crate::error::VideoError;
use crate::frame::{frame_size, mat_from_rgb};
use anyhow::{Context, Result};
use opencv::core::{Mat, Size};
use std::path::{Path, PathBuf};

const EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Directory of still images played back as a video, ordered by file name
pub struct ImageSequenceSource {
    files: Vec<PathBuf>,
    next: usize,
    fps: f64,
    size: Size,
    // First frame, decoded up front to learn the dimensions
    pending: Option<Mat>,
}

impl ImageSequenceSource {
    pub fn open<P: AsRef<Path>>(dir: P, fps: f64) -> Result<Self, VideoError> {
        let dir = dir.as_ref();
        tracing::info!("Opening image sequence in {}", dir.display());

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_image = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false);
            if is_image && path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let first = files
            .first()
            .ok_or_else(|| VideoError::EmptySequence(dir.to_path_buf()))?;
        let first = mat_from_rgb(&image::open(first)?.to_rgb8())?;
        let size = frame_size(&first);

        tracing::info!(
            "Image sequence of {} frames at {}x{}",
            files.len(),
            size.width,
            size.height
        );

        Ok(Self {
            files,
            next: 1,
            fps: sanitize_frame_rate(fps),
            size,
            pending: Some(first),
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn read_frame(&mut self) -> Result<Option<Mat>> {
        if let Some(frame) = self.pending.take() {
            return Ok(Some(frame));
        }

        let Some(path) = self.files.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;

        let image = image::open(path)
            .with_context(|| format!("Failed to decode {}", path.display()))?
            .to_rgb8();
        let frame = mat_from_rgb(&image)?;

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
