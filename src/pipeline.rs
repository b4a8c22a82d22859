use crate::config::TrackerConfig;
use crate::detection::{CandidateSelector, Circle};
use crate::segmentation::{create_default_model, ColorSegmenter, ForegroundModel};
use crate::sink::{FrameSink, VideoFileSink};
use crate::source::{open_source, FrameSource};
use crate::tracking::{draw_detection, render_trail, TrajectoryHistory};
use anyhow::{Context, Result};
use opencv::{
    core::{Mat, Point},
    prelude::*,
};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// What the tracker concluded for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Zero-based frame index
    pub index: u64,
    /// Position pushed into the history
    pub position: Option<Point>,
    /// Enclosing circle of the selected region
    pub circle: Option<Circle>,
    /// Circle and centroid were drawn (radius above the minimum)
    pub drawn: bool,
}

/// Per-frame detection and trail rendering
///
/// Owns the background model and the position history; both persist across
/// frames, so one tracker must be fed one stream, frame by frame, in order.
pub struct BallTracker {
    config: TrackerConfig,
    background: Box<dyn ForegroundModel>,
    color: ColorSegmenter,
    selector: CandidateSelector,
    history: TrajectoryHistory,
    frames_processed: u64,
}

impl BallTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let background = create_default_model(&config)?;
        Self::with_model(config, background)
    }

    /// Build a tracker around a specific motion model
    pub fn with_model(config: TrackerConfig, background: Box<dyn ForegroundModel>) -> Result<Self> {
        config.validate().context("Invalid tracker configuration")?;

        Ok(Self {
            color: ColorSegmenter::new(config.blur_kernel, config.morph_iterations),
            selector: CandidateSelector::new(config.min_radius),
            history: TrajectoryHistory::new(config.history_capacity),
            background,
            config,
            frames_processed: 0,
        })
    }

    /// Segment, select, record and annotate one frame
    ///
    /// Returns the annotated copy of `frame` and what was detected.
    pub fn process_frame(&mut self, frame: &Mat) -> Result<(Mat, FrameReport)> {
        let foreground = self
            .background
            .apply(frame)
            .context("Failed to segment motion")?;
        let color = self
            .color
            .extract(frame, &self.config.hsv)
            .context("Failed to segment color")?;

        let detection = self
            .selector
            .select(&foreground, &color, self.history.latest())
            .context("Failed to select candidate")?;
        self.history.push(detection.position);

        let mut annotated = frame.try_clone()?;
        let drawn = draw_detection(&mut annotated, &detection)?;
        render_trail(&mut annotated, &self.history)?;

        let report = FrameReport {
            index: self.frames_processed,
            position: detection.position,
            circle: detection.circle,
            drawn,
        };
        self.frames_processed += 1;

        tracing::debug!(
            "Frame {}: position={:?}, area={:.1}, radius={:?}, drawn={}",
            report.index,
            report.position,
            detection.area,
            report.circle.map(|c| c.radius),
            report.drawn
        );

        Ok((annotated, report))
    }

    pub fn history(&self) -> &TrajectoryHistory {
        &self.history
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PipelineState {
    Running,
    Stopped,
}

/// Counters and per-frame results of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub frames_read: u64,
    pub frames_written: u64,
    pub detections: u64,
    pub reports: Vec<FrameReport>,
}

/// Result of a complete run over a video file
#[derive(Debug, Clone)]
pub struct PipelineSummary {
    /// Path of the finished video
    pub output: PathBuf,
    pub stats: RunStats,
}

/// Pull frames from `source` until it is exhausted, writing one frame to
/// `sink` per frame read
///
/// With a tracker the written frames are annotated; without one they are
/// copied through unchanged. The sink is released once the source reports
/// end of stream. On error the sink is left to its `Drop` handling.
pub fn run_pipeline<S, O>(
    source: &mut S,
    sink: &mut O,
    mut tracker: Option<&mut BallTracker>,
) -> Result<RunStats>
where
    S: FrameSource + ?Sized,
    O: FrameSink + ?Sized,
{
    let mut stats = RunStats::default();
    let mut total_read_time = Duration::ZERO;
    let mut total_track_time = Duration::ZERO;
    let mut total_write_time = Duration::ZERO;

    tracing::info!("Starting tracking now");
    if tracker.is_none() {
        tracing::info!("Running in passthrough mode (no tracking)");
    }

    let mut state = PipelineState::Running;
    while state == PipelineState::Running {
        // Read frame
        let read_start = Instant::now();
        tracing::debug!("Reading frame {}", stats.frames_read + 1);
        let frame = source.read_frame().context("Failed to read frame")?;
        total_read_time += read_start.elapsed();

        let Some(frame) = frame else {
            state = PipelineState::Stopped;
            continue;
        };
        stats.frames_read += 1;

        // Track (if a tracker is attached)
        let track_start = Instant::now();
        let output_frame = if let Some(tracker) = tracker.as_deref_mut() {
            let (annotated, report) = tracker.process_frame(&frame)?;
            if report.drawn {
                stats.detections += 1;
            }
            stats.reports.push(report);
            annotated
        } else {
            frame
        };
        total_track_time += track_start.elapsed();

        // Write frame
        let write_start = Instant::now();
        sink.write_frame(&output_frame)
            .context("Failed to write frame")?;
        total_write_time += write_start.elapsed();
        stats.frames_written += 1;

        // Log stats every 30 frames
        if stats.frames_read % 30 == 0 {
            let n = stats.frames_read as f64;
            let avg_read_ms = total_read_time.as_secs_f64() * 1000.0 / n;
            let avg_track_ms = total_track_time.as_secs_f64() * 1000.0 / n;
            let avg_write_ms = total_write_time.as_secs_f64() * 1000.0 / n;
            let total_ms = avg_read_ms + avg_track_ms + avg_write_ms;

            tracing::info!(
                "Frame {}: read={:.1}ms, track={:.1}ms, write={:.1}ms, total={:.1}ms, fps={:.1}",
                stats.frames_read,
                avg_read_ms,
                avg_track_ms,
                avg_write_ms,
                total_ms,
                1000.0 / total_ms.max(f64::EPSILON)
            );
        }
    }

    sink.release().context("Failed to release output")?;
    tracing::info!(
        "Video writing completed: {} frames, {} drawn detections",
        stats.frames_written,
        stats.detections
    );

    Ok(stats)
}

fn run_file(input: &Path, config: &TrackerConfig, track: bool) -> Result<PipelineSummary> {
    // Surface a bad configuration before touching any file
    let mut tracker = if track {
        Some(BallTracker::new(config.clone())?)
    } else {
        None
    };

    let mut source = open_source(input, config.sequence_fps)?;

    // The source's frame rate is handed to the encoder unchanged
    let mut sink = VideoFileSink::create(&config.output_path, source.frame_size(), source.frame_rate())
        .context("Failed to initialize video output")?;

    let stats = run_pipeline(source.as_mut(), &mut sink, tracker.as_mut())?;

    Ok(PipelineSummary {
        output: sink.path().to_path_buf(),
        stats,
    })
}

/// Track the ball through the video at `input` and write the annotated
/// video to `config.output_path` at the source's frame rate and size
///
/// Fails before processing any frame if the input cannot be opened.
pub fn track_video(input: &Path, config: &TrackerConfig) -> Result<PipelineSummary> {
    run_file(input, config, true)
}

/// Copy the video at `input` to `config.output_path` without tracking
pub fn passthrough_video(input: &Path, config: &TrackerConfig) -> Result<PipelineSummary> {
    run_file(input, config, false)
}
