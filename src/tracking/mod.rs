mod history;
mod render;

pub use history::TrajectoryHistory;
pub use render::{draw_detection, render_trail, trail_thickness, CIRCLE_COLOR, TRAIL_COLOR};
