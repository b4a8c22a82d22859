use super::types::Mask;
use crate::config::HsvRange;
use anyhow::{Context, Result};
use opencv::{
    core::{self, Mat, Point, Scalar, Size},
    imgproc,
    prelude::*,
};

/// Stateless color filter isolating pixels inside an HSV range
///
/// Steps:
/// 1. Gaussian blur to suppress sensor noise
/// 2. Convert to 8-bit HSV (hue 0-179)
/// 3. Inclusive per-channel range check
/// 4. Morphological opening (erode then dilate, same pass count)
#[derive(Debug, Clone)]
pub struct ColorSegmenter {
    blur_kernel: u32,
    morph_iterations: u32,
}

impl ColorSegmenter {
    pub fn new(blur_kernel: u32, morph_iterations: u32) -> Self {
        Self {
            blur_kernel,
            morph_iterations,
        }
    }

    /// Mask of the pixels of the BGR `frame` whose color falls inside `range`
    pub fn extract(&self, frame: &Mat, range: &HsvRange) -> Result<Mask> {
        let _span = tracing::debug_span!("color_extract").entered();

        let ksize = self.blur_kernel as i32;
        let mut blurred = Mat::default();
        imgproc::gaussian_blur(
            frame,
            &mut blurred,
            Size::new(ksize, ksize),
            0.0,
            0.0,
            core::BORDER_DEFAULT,
        )
        .context("Gaussian blur failed")?;

        let hsv = to_hsv(&blurred)?;

        let mut mask = Mat::default();
        core::in_range(&hsv, &bound(range.lower), &bound(range.upper), &mut mask)
            .context("HSV range check failed")?;

        morph_open(&mask, self.morph_iterations)
    }
}

impl Default for ColorSegmenter {
    fn default() -> Self {
        Self::new(11, 2)
    }
}

fn bound(hsv: [u8; 3]) -> Scalar {
    Scalar::new(f64::from(hsv[0]), f64::from(hsv[1]), f64::from(hsv[2]), 0.0)
}

/// Convert a BGR frame to 8-bit HSV with hue halved into 0-179
pub fn to_hsv(frame: &Mat) -> Result<Mat> {
    let mut hsv = Mat::default();
    imgproc::cvt_color(frame, &mut hsv, imgproc::COLOR_BGR2HSV, 0)
        .context("HSV conversion failed")?;
    Ok(hsv)
}

/// Erode then dilate `iterations` times with a 3x3 square
///
/// Pixels outside the image never erode the border.
pub fn morph_open(mask: &Mask, iterations: u32) -> Result<Mask> {
    if iterations == 0 {
        return Ok(mask.try_clone()?);
    }

    // An empty kernel selects the 3x3 default
    let kernel = Mat::default();
    let anchor = Point::new(-1, -1);
    let iterations = iterations as i32;
    let border_value = imgproc::morphology_default_border_value()?;

    let mut eroded = Mat::default();
    imgproc::erode(
        mask,
        &mut eroded,
        &kernel,
        anchor,
        iterations,
        core::BORDER_CONSTANT,
        border_value,
    )
    .context("Erosion failed")?;

    let mut opened = Mat::default();
    imgproc::dilate(
        &eroded,
        &mut opened,
        &kernel,
        anchor,
        iterations,
        core::BORDER_CONSTANT,
        border_value,
    )
    .context("Dilation failed")?;

    Ok(opened)
}
