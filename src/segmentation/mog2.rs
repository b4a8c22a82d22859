use super::types::{ForegroundModel, Mask};
use crate::error::SegmentationError;
use crate::frame::frame_size;
use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Ptr, Size},
    prelude::*,
    video::{self, BackgroundSubtractorMOG2},
};

/// Let OpenCV derive the learning rate from the frame count and history
const AUTO_LEARNING_RATE: f64 = -1.0;

/// Adaptive Gaussian-mixture background subtractor (OpenCV MOG2)
///
/// The model is updated in place on every call, so the subtractor must be fed
/// the stream frame by frame, in order. The first frame is reported as all
/// foreground since nothing has been learned yet.
pub struct Mog2Subtractor {
    model: Ptr<BackgroundSubtractorMOG2>,
    // Fixed by the first frame
    frame_size: Option<Size>,
    frames_seen: u64,
}

impl Mog2Subtractor {
    /// Create a subtractor
    ///
    /// # Arguments
    /// * `var_threshold` - Squared Mahalanobis distance below which a pixel matches the background
    /// * `detect_shadows` - Mark shadows as 127 instead of classifying them as background
    /// * `history` - Number of frames that influence the learning rate
    pub fn new(var_threshold: f32, detect_shadows: bool, history: u32) -> Result<Self> {
        let history = i32::try_from(history.max(1)).unwrap_or(i32::MAX);
        let model = video::create_background_subtractor_mog2(
            history,
            f64::from(var_threshold),
            detect_shadows,
        )
        .context("Failed to create MOG2 background subtractor")?;

        Ok(Self {
            model,
            frame_size: None,
            frames_seen: 0,
        })
    }
}

impl ForegroundModel for Mog2Subtractor {
    fn apply(&mut self, frame: &Mat) -> Result<Mask> {
        let _span = tracing::debug_span!("mog2_apply").entered();

        let size = frame_size(frame);
        match self.frame_size {
            None => {
                tracing::debug!(
                    "Initializing background model at {}x{}",
                    size.width,
                    size.height
                );
                self.frame_size = Some(size);
            }
            Some(expected) if expected != size => {
                return Err(SegmentationError::DimensionMismatch {
                    expected: (expected.width, expected.height),
                    actual: (size.width, size.height),
                }
                .into());
            }
            Some(_) => {}
        }

        let mut mask = Mat::default();
        self.model
            .apply(frame, &mut mask, AUTO_LEARNING_RATE)
            .context("MOG2 update failed")?;
        self.frames_seen += 1;

        Ok(mask)
    }

    fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{MASK_ON, MASK_SHADOW};
    use opencv::core::{self, Rect, Scalar};
    use opencv::imgproc;

    fn solid(width: i32, height: i32, bgr: [f64; 3]) -> Mat {
        Mat::new_rows_cols_with_default(
            height,
            width,
            core::CV_8UC3,
            Scalar::new(bgr[0], bgr[1], bgr[2], 0.0),
        )
        .unwrap()
    }

    fn all_equal(mask: &Mat, value: u8) -> bool {
        mask.data_bytes().unwrap().iter().all(|&v| v == value)
    }

    #[test]
    fn test_first_frame_is_all_foreground() {
        let mut model = Mog2Subtractor::new(50.0, false, 500).unwrap();
        let mask = model.apply(&solid(8, 6, [60.0; 3])).unwrap();
        assert_eq!(frame_size(&mask), Size::new(8, 6));
        assert!(all_equal(&mask, MASK_ON));
        assert_eq!(model.frames_seen(), 1);
    }

    #[test]
    fn test_static_scene_becomes_background() {
        let mut model = Mog2Subtractor::new(50.0, false, 500).unwrap();
        let frame = solid(8, 6, [60.0; 3]);
        model.apply(&frame).unwrap();
        for _ in 0..5 {
            let mask = model.apply(&frame).unwrap();
            assert!(all_equal(&mask, 0));
        }
    }

    #[test]
    fn test_new_object_is_foreground() {
        let mut model = Mog2Subtractor::new(50.0, false, 500).unwrap();
        let background = solid(10, 10, [60.0; 3]);
        for _ in 0..10 {
            model.apply(&background).unwrap();
        }

        let mut frame = background.try_clone().unwrap();
        imgproc::rectangle(
            &mut frame,
            Rect::new(3, 3, 3, 3),
            Scalar::new(0.0, 200.0, 0.0, 0.0),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )
        .unwrap();

        let mask = model.apply(&frame).unwrap();
        assert_eq!(*mask.at_2d::<u8>(4, 4).unwrap(), MASK_ON);
        assert_eq!(*mask.at_2d::<u8>(0, 0).unwrap(), 0);
        assert_eq!(core::count_non_zero(&mask).unwrap(), 9);
    }

    #[test]
    fn test_dimension_change_is_rejected() {
        let mut model = Mog2Subtractor::new(50.0, false, 500).unwrap();
        model.apply(&solid(8, 6, [0.0; 3])).unwrap();
        let err = model.apply(&solid(6, 8, [0.0; 3])).unwrap_err();
        assert!(err.downcast_ref::<SegmentationError>().is_some());
    }

    #[test]
    fn test_shadows_are_foreground_unless_detected() {
        let background = solid(4, 4, [100.0; 3]);
        let darkened = solid(4, 4, [70.0; 3]);

        let mut plain = Mog2Subtractor::new(50.0, false, 500).unwrap();
        let mut shadowed = Mog2Subtractor::new(50.0, true, 500).unwrap();
        for _ in 0..10 {
            plain.apply(&background).unwrap();
            shadowed.apply(&background).unwrap();
        }

        let mask = plain.apply(&darkened).unwrap();
        assert!(all_equal(&mask, MASK_ON));

        let mask = shadowed.apply(&darkened).unwrap();
        assert!(all_equal(&mask, MASK_SHADOW));
    }
}
