use std::path::PathBuf;

/// Errors raised while opening, decoding or encoding video and image sequences
#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OpenCV error: {0}")]
    OpenCv(#[from] opencv::Error),

    #[error("Could not open video {0}")]
    Open(PathBuf),

    #[error("Could not open video writer for {0}")]
    Writer(PathBuf),

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    #[error("Unsupported frame layout: expected 8-bit {expected} channels, got type {actual}")]
    FrameLayout { expected: i32, actual: i32 },

    #[error("Frame size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: (i32, i32),
        actual: (i32, i32),
    },

    #[error("Frame dimensions {width}x{height} exceed the supported range")]
    Oversized { width: u32, height: u32 },

    #[error("No frames found in {0}")]
    EmptySequence(PathBuf),
}

/// Rejected tracker configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Blur kernel size must be odd and non-zero, got {0}")]
    BlurKernel(u32),

    #[error("History capacity must be at least 1")]
    HistoryCapacity,

    #[error("Background history must be at least 1")]
    BackgroundHistory,

    #[error("Variance threshold must be positive, got {0}")]
    VarThreshold(f32),

    #[error("HSV lower bound {lower:?} exceeds upper bound {upper:?}")]
    HsvBounds { lower: [u8; 3], upper: [u8; 3] },

    #[error("Invalid HSV triple '{0}': expected three comma-separated values 0-255")]
    HsvTriple(String),
}

/// Errors raised by the segmentation stages
#[derive(Debug, thiserror::Error)]
pub enum SegmentationError {
    #[error("Frame size {actual:?} does not match background model size {expected:?}")]
    DimensionMismatch {
        expected: (i32, i32),
        actual: (i32, i32),
    },
}
