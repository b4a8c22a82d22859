use anyhow::{Context, Result};
use ball_trail::config::parse_hsv_triple;
use ball_trail::pipeline::{run_pipeline, BallTracker};
use ball_trail::sink::{FrameSink, ImageSequenceSink, MultiSink, VideoFileSink};
use ball_trail::source::open_source;
use ball_trail::{HsvRange, TrackerConfig, DEFAULT_OUTPUT_PATH};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input video file or directory of image frames
    input: PathBuf,

    /// Output video path
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Lower HSV bound as h,s,v (hue 0-179)
    #[arg(long, default_value = "29,86,6", value_parser = parse_hsv_triple)]
    hsv_lower: [u8; 3],

    /// Upper HSV bound as h,s,v (hue 0-179)
    #[arg(long, default_value = "64,255,255", value_parser = parse_hsv_triple)]
    hsv_upper: [u8; 3],

    /// Minimum enclosing radius (pixels) for a detection to be drawn
    #[arg(long, default_value_t = 10.0)]
    min_radius: f32,

    /// Number of past positions kept in the trail
    #[arg(long, default_value_t = 32)]
    history: usize,

    /// Background subtraction variance threshold
    #[arg(long, default_value_t = 50.0)]
    var_threshold: f32,

    /// Mark shadows separately instead of treating them as background
    #[arg(long)]
    detect_shadows: bool,

    /// Number of frames that influence the background model
    #[arg(long, default_value_t = 500)]
    bg_history: u32,

    /// Blur kernel size (odd) applied before color thresholding
    #[arg(long, default_value_t = 11)]
    blur_kernel: u32,

    /// Erosion/dilation passes used to clean the color mask
    #[arg(long, default_value_t = 2)]
    morph_iterations: u32,

    /// Frame rate assigned to image-sequence input
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Also write every annotated frame as PNG into this directory
    #[arg(long)]
    frames_out: Option<PathBuf>,

    /// Copy frames through without tracking
    #[arg(long)]
    passthrough: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Args {
    fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            hsv: HsvRange::new(self.hsv_lower, self.hsv_upper),
            min_radius: self.min_radius,
            history_capacity: self.history,
            var_threshold: self.var_threshold,
            detect_shadows: self.detect_shadows,
            bg_history: self.bg_history,
            blur_kernel: self.blur_kernel,
            morph_iterations: self.morph_iterations,
            output_path: self.output.clone(),
            sequence_fps: self.fps,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    tracing::info!("Ball trail starting");

    let config = args.tracker_config();
    tracing::info!(
        "HSV range: {:?} - {:?}",
        config.hsv.lower,
        config.hsv.upper
    );
    tracing::info!(
        "Min radius: {}, history: {}, var threshold: {}, shadows: {}",
        config.min_radius,
        config.history_capacity,
        config.var_threshold,
        config.detect_shadows
    );

    // Initialize tracker first so a bad configuration fails fast
    let mut tracker = if args.passthrough {
        None
    } else {
        Some(BallTracker::new(config.clone())?)
    };

    // Initialize source
    let mut source =
        open_source(&args.input, config.sequence_fps).context("Failed to initialize video source")?;
    let size = source.frame_size();
    let fps = source.frame_rate();
    tracing::info!("Input: {}x{} @ {:.3} fps", size.width, size.height, fps);

    // Initialize output
    let video = VideoFileSink::create(&config.output_path, size, fps)
        .context("Failed to initialize video output")?;
    let mut sinks: Vec<Box<dyn FrameSink>> = vec![Box::new(video)];
    if let Some(dir) = &args.frames_out {
        let frames =
            ImageSequenceSink::create(dir).context("Failed to initialize frame output")?;
        sinks.push(Box::new(frames));
    }
    let mut output = MultiSink::new(sinks);

    // Main loop
    let stats = run_pipeline(source.as_mut(), &mut output, tracker.as_mut())?;

    tracing::info!(
        "Processed {} frames ({} with a drawn detection)",
        stats.frames_read,
        stats.detections
    );
    println!("{}", config.output_path.display());

    Ok(())
}
