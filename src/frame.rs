//! Conversions between OpenCV matrices and `image` buffers
//!
//! Frames travel through the pipeline as 8-bit BGR `Mat`s, the layout
//! `VideoCapture` decodes to. Image-sequence I/O goes through `image`, so it
//! needs to cross over in both directions.

use crate::error::VideoError;
use image::RgbImage;
use opencv::{
    core::{self, Mat, Scalar, Size},
    imgproc,
    prelude::*,
};

/// Width and height of a frame
pub fn frame_size(frame: &Mat) -> Size {
    Size::new(frame.cols(), frame.rows())
}

/// Copy an RGB buffer into a new BGR `Mat`
pub fn mat_from_rgb(image: &RgbImage) -> Result<Mat, VideoError> {
    let (width, height) = image.dimensions();
    let oversized = || VideoError::Oversized { width, height };
    let rows = i32::try_from(height).map_err(|_| oversized())?;
    let cols = i32::try_from(width).map_err(|_| oversized())?;
    // Mat stores the byte count per row as i32
    cols.checked_mul(3).ok_or_else(oversized)?;

    let mut rgb = Mat::new_rows_cols_with_default(
        rows,
        cols,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(image.as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

/// Copy a BGR `Mat` into a new RGB buffer
pub fn rgb_from_mat(frame: &Mat) -> Result<RgbImage, VideoError> {
    if frame.typ() != core::CV_8UC3 {
        return Err(VideoError::FrameLayout {
            expected: 3,
            actual: frame.typ(),
        });
    }

    let mut rgb = Mat::default();
    imgproc::cvt_color(frame, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let bytes = rgb.data_bytes()?.to_vec();

    let size = frame_size(frame);
    RgbImage::from_raw(size.width as u32, size.height as u32, bytes).ok_or(
        VideoError::FrameLayout {
            expected: 3,
            actual: frame.typ(),
        },
    )
}
