mod color;
mod mog2;
pub mod types;

pub use color::{to_hsv, ColorSegmenter};
pub use mog2::Mog2Subtractor;
pub use types::{ForegroundModel, Mask, MASK_ON, MASK_SHADOW};

use crate::config::TrackerConfig;
use anyhow::Result;

/// Create the default motion model (MOG2) from the tracker configuration
pub fn create_default_model(config: &TrackerConfig) -> Result<Box<dyn ForegroundModel>> {
    let model = Mog2Subtractor::new(
        config.var_threshold,
        config.detect_shadows,
        config.bg_history,
    )?;
    Ok(Box::new(model))
}
