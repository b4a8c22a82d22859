use anyhow::Result;
use opencv::core::Mat;

/// Single-channel 8-bit mask: 0 = unset, any non-zero value = set (255 for
/// foreground/match, 127 for shadows when shadow detection is enabled)
/// Dimensions match the frame it was computed from
pub type Mask = Mat;

/// Value written for set pixels
pub const MASK_ON: u8 = 255;

/// Value written for shadow pixels when shadow detection is enabled
pub const MASK_SHADOW: u8 = 127;

/// Trait for adaptive background models
/// Allows swapping between different motion segmentation backends
pub trait ForegroundModel {
    /// Classify every pixel of the BGR `frame` against the learned background
    /// and then update the background statistics with it
    ///
    /// Calls are stateful and strictly sequential: the model must see each
    /// frame of the stream exactly once, in stream order. Feeding frames out
    /// of order is not detected and silently corrupts the background estimate.
    /// State is initialized lazily from the first frame.
    fn apply(&mut self, frame: &Mat) -> Result<Mask>;

    /// Number of frames the model has learned from
    fn frames_seen(&self) -> u64;
}
