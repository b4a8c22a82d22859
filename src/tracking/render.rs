use super::history::TrajectoryHistory;
use crate::detection::Detection;
use anyhow::Result;
use opencv::{
    core::{Mat, Point, Scalar, VecN},
    imgproc,
};

/// Trail and centroid color (BGR red)
pub const TRAIL_COLOR: Scalar = VecN([0.0, 0.0, 255.0, 0.0]);

/// Enclosing circle color (BGR yellow)
pub const CIRCLE_COLOR: Scalar = VecN([0.0, 255.0, 255.0, 0.0]);

const CIRCLE_THICKNESS: i32 = 2;
const CENTROID_RADIUS: i32 = 5;
const THICKNESS_SCALE: f64 = 2.5;

/// Line thickness for the trail segment ending at recency `index`
///
/// `round(sqrt(capacity / (index + 1)) * 2.5)`, so the newest segments are
/// the thickest and the trail tapers as entries age.
pub fn trail_thickness(capacity: usize, index: usize) -> i32 {
    ((capacity as f64 / (index + 1) as f64).sqrt() * THICKNESS_SCALE).round() as i32
}

/// Draw the enclosing circle and the centroid marker of an accepted detection
///
/// Returns whether anything was drawn.
pub fn draw_detection(frame: &mut Mat, detection: &Detection) -> Result<bool> {
    if !detection.accepted {
        return Ok(false);
    }
    let Some(circle) = detection.circle else {
        return Ok(false);
    };

    imgproc::circle(
        frame,
        Point::new(circle.x as i32, circle.y as i32),
        circle.radius as i32,
        CIRCLE_COLOR,
        CIRCLE_THICKNESS,
        imgproc::LINE_8,
        0,
    )?;
    if let Some(center) = detection.position {
        imgproc::circle(
            frame,
            center,
            CENTROID_RADIUS,
            TRAIL_COLOR,
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;
    }
    Ok(true)
}

/// Connect adjacent present entries with tapering lines; gaps break the trail
///
/// Returns the number of segments drawn.
pub fn render_trail(frame: &mut Mat, history: &TrajectoryHistory) -> Result<usize> {
    let _span = tracing::debug_span!("render_trail").entered();

    let mut drawn = 0;
    for (index, newer, older) in history.segments() {
        let thickness = trail_thickness(history.capacity(), index);
        imgproc::line(
            frame,
            newer,
            older,
            TRAIL_COLOR,
            thickness,
            imgproc::LINE_8,
            0,
        )?;
        drawn += 1;
    }
    Ok(drawn)
}
