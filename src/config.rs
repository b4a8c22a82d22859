use crate::error::ConfigError;
use std::path::PathBuf;
use std::str::FromStr;

/// Fixed output location used when the caller does not choose one
pub const DEFAULT_OUTPUT_PATH: &str = "result/tracked_video.mp4";

/// Inclusive lower/upper bounds in OpenCV-style 8-bit HSV
/// (hue 0-179, saturation and value 0-255)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HsvRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl HsvRange {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (0..3).all(|c| hsv[c] >= self.lower[c] && hsv[c] <= self.upper[c])
    }
}

impl Default for HsvRange {
    fn default() -> Self {
        Self {
            lower: [29, 86, 6],
            upper: [64, 255, 255],
        }
    }
}

/// Parse a `h,s,v` triple such as `29,86,6`
pub fn parse_hsv_triple(value: &str) -> Result<[u8; 3], ConfigError> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(ConfigError::HsvTriple(value.to_string()));
    }

    let mut triple = [0u8; 3];
    for (slot, part) in triple.iter_mut().zip(parts) {
        *slot = u8::from_str(part).map_err(|_| ConfigError::HsvTriple(value.to_string()))?;
    }
    Ok(triple)
}

/// Tunables consumed by the tracking pipeline
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Target color range
    pub hsv: HsvRange,

    /// Detections with an enclosing radius at or below this are not drawn
    pub min_radius: f32,

    /// Number of recent positions kept for the trail
    pub history_capacity: usize,

    /// Squared Mahalanobis distance for a pixel to match the background model
    pub var_threshold: f32,

    /// Classify shadows separately (value 127) instead of as background
    pub detect_shadows: bool,

    /// Number of frames that influence the background model
    pub bg_history: u32,

    /// Side of the square blur kernel applied before color thresholding
    pub blur_kernel: u32,

    /// Erosion and dilation passes of the color mask opening
    pub morph_iterations: u32,

    /// Where the annotated video is written
    pub output_path: PathBuf,

    /// Playback rate assigned to image-sequence input, which carries no timing
    pub sequence_fps: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            hsv: HsvRange::default(),
            min_radius: 10.0,
            history_capacity: 32,
            var_threshold: 50.0,
            detect_shadows: false,
            bg_history: 500,
            blur_kernel: 11,
            morph_iterations: 2,
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            sequence_fps: 30.0,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.blur_kernel == 0 || self.blur_kernel % 2 == 0 {
            return Err(ConfigError::BlurKernel(self.blur_kernel));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::HistoryCapacity);
        }
        if self.bg_history == 0 {
            return Err(ConfigError::BackgroundHistory);
        }
        if !(self.var_threshold > 0.0) {
            return Err(ConfigError::VarThreshold(self.var_threshold));
        }
        if (0..3).any(|c| self.hsv.lower[c] > self.hsv.upper[c]) {
            return Err(ConfigError::HsvBounds {
                lower: self.hsv.lower,
                upper: self.hsv.upper,
            });
        }
        Ok(())
    }
}
