use crate::segmentation::Mask;
use anyhow::{Context, Result};
use opencv::{
    core::{self, Point, Point2f, Vector},
    imgproc,
    prelude::*,
};

/// Minimum enclosing circle of a region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Outcome of candidate selection for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// Position to record in the trail history
    /// Falls back to the previous position when no usable region exists
    pub position: Option<Point>,

    /// Enclosing circle of the largest region, if any region was found
    pub circle: Option<Circle>,

    /// Area of the largest region (0 when none)
    pub area: f64,

    /// The enclosing circle is larger than the minimum radius and should be drawn
    pub accepted: bool,
}

/// Picks the single region most likely to be the ball
#[derive(Debug, Clone)]
pub struct CandidateSelector {
    min_radius: f32,
}

impl CandidateSelector {
    pub fn new(min_radius: f32) -> Self {
        Self { min_radius }
    }

    /// Select the ball from the motion and color masks
    ///
    /// The region with the largest enclosed area wins. Equal areas keep the
    /// region whose topmost-leftmost border pixel comes first in raster order.
    /// The radius check only decides `accepted`; the centroid is reported
    /// either way.
    ///
    /// # Arguments
    /// * `foreground` - Motion mask from the background model
    /// * `color` - Color mask from the color segmenter
    /// * `previous` - Position recorded for the previous frame
    pub fn select(
        &self,
        foreground: &Mask,
        color: &Mask,
        previous: Option<Point>,
    ) -> Result<Detection> {
        let _span = tracing::debug_span!("select").entered();

        let combined = combine_masks(foreground, color)?;

        let mut contours = Vector::<Vector<Point>>::new();
        imgproc::find_contours(
            &combined,
            &mut contours,
            imgproc::RETR_LIST,
            imgproc::CHAIN_APPROX_SIMPLE,
            Point::new(0, 0),
        )
        .context("Contour search failed")?;

        let mut best: Option<(f64, (i32, i32), Vector<Point>)> = None;
        for contour in contours {
            let area = imgproc::contour_area(&contour, false)?;
            let origin = raster_origin(&contour);
            let better = match &best {
                None => true,
                Some((best_area, best_origin, _)) => {
                    area > *best_area || (area == *best_area && origin < *best_origin)
                }
            };
            if better {
                best = Some((area, origin, contour));
            }
        }

        let Some((area, _, contour)) = best else {
            return Ok(Detection {
                position: previous,
                circle: None,
                area: 0.0,
                accepted: false,
            });
        };

        let mut center = Point2f::default();
        let mut radius = 0.0f32;
        imgproc::min_enclosing_circle(&contour, &mut center, &mut radius)
            .context("Enclosing circle failed")?;

        // Degenerate (zero-area) regions carry the previous position forward
        let moments = imgproc::moments(&contour, false)?;
        let position = if moments.m00 != 0.0 {
            Some(Point::new(
                (moments.m10 / moments.m00) as i32,
                (moments.m01 / moments.m00) as i32,
            ))
        } else {
            previous
        };

        Ok(Detection {
            position,
            circle: Some(Circle {
                x: center.x,
                y: center.y,
                radius,
            }),
            area,
            accepted: radius > self.min_radius,
        })
    }
}

/// `(y, x)` of the topmost, then leftmost, point of a contour
fn raster_origin(contour: &Vector<Point>) -> (i32, i32) {
    contour
        .iter()
        .map(|p| (p.y, p.x))
        .min()
        .unwrap_or((i32::MAX, i32::MAX))
}

/// Pixel-wise AND of two masks of the same size
pub fn combine_masks(foreground: &Mask, color: &Mask) -> Result<Mask> {
    let mut combined = Mask::default();
    core::bitwise_and(foreground, color, &mut combined, &core::no_array())
        .context("Mask combination failed")?;
    Ok(combined)
}
