use super::FrameSink;
use crate::frame::rgb_from_mat;
use anyhow::{Context, Result};
use opencv::core::Mat;
use std::path::{Path, PathBuf};

/// Writes each frame as `frame_000000.png`, `frame_000001.png`, ...
pub struct ImageSequenceSink {
    dir: PathBuf,
    frames_written: u64,
}

impl ImageSequenceSink {
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create frame directory {}", dir.display()))?;
        tracing::info!("Writing annotated frames to {}", dir.display());

        Ok(Self {
            dir: dir.to_path_buf(),
            frames_written: 0,
        })
    }
}

impl FrameSink for ImageSequenceSink {
    fn write_frame(&mut self, frame: &Mat) -> Result<()> {
        let path = self.dir.join(format!("frame_{:06}.png", self.frames_written));
        rgb_from_mat(frame)?
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        self.frames_written += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        Ok(())
    }

    fn frames_written(&self) -> u64 {
        self.frames_written
    }
}
