use ball_trail::detection::combine_masks;
use ball_trail::pipeline::run_pipeline;
use ball_trail::segmentation::{ColorSegmenter, ForegroundModel, Mog2Subtractor};
use ball_trail::sink::{FrameSink, ImageSequenceSink, VideoFileSink};
use ball_trail::source::{open_source, FrameSource, ImageSequenceSource, VideoFileSource};
use ball_trail::{passthrough_video, track_video, BallTracker, HsvRange, TrackerConfig};
use opencv::core::{self, Mat, Point, Scalar, Size, Vec3b};
use opencv::imgproc;
use opencv::prelude::*;
use std::path::{Path, PathBuf};

const WIDTH: i32 = 320;
const HEIGHT: i32 = 100;
const RADIUS: i32 = 12;
const FRAMES: usize = 8;

const GREEN: [f64; 3] = [0.0, 200.0, 0.0];
const BLUE: [f64; 3] = [200.0, 20.0, 20.0];

fn work_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("ball_trail_it_{}_{}", std::process::id(), name));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn ball_center(i: usize) -> (i32, i32) {
    (30 + 30 * i as i32, 50)
}

fn frame_with_ball(center: (i32, i32), bgr: [f64; 3]) -> Mat {
    let mut frame =
        Mat::new_rows_cols_with_default(HEIGHT, WIDTH, core::CV_8UC3, Scalar::all(60.0)).unwrap();
    imgproc::circle(
        &mut frame,
        Point::new(center.0, center.1),
        RADIUS,
        Scalar::new(bgr[0], bgr[1], bgr[2], 0.0),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )
    .unwrap();
    frame
}

fn write_frames(sink: &mut dyn FrameSink, bgr: [f64; 3]) {
    for i in 0..FRAMES {
        sink.write_frame(&frame_with_ball(ball_center(i), bgr)).unwrap();
    }
    sink.release().unwrap();
}

/// Lossless input: one PNG per frame
fn write_sequence(dir: &Path, bgr: [f64; 3]) {
    let mut sink = ImageSequenceSink::create(dir).unwrap();
    write_frames(&mut sink, bgr);
}

fn write_video(path: &Path, bgr: [f64; 3], fps: f64) {
    let mut sink = VideoFileSink::create(path, Size::new(WIDTH, HEIGHT), fps).unwrap();
    write_frames(&mut sink, bgr);
}

fn inspect_video(path: &Path) -> (usize, f64, Size) {
    let mut source = VideoFileSource::open(path).unwrap();
    let mut count = 0;
    while source.read_frame().unwrap().is_some() {
        count += 1;
    }
    (count, source.frame_rate(), source.frame_size())
}

fn assert_follows_ball(reports: &[ball_trail::FrameReport], tolerance: i32) {
    assert_eq!(reports.len(), FRAMES);
    for (i, report) in reports.iter().enumerate() {
        let (cx, cy) = ball_center(i);
        let position = report
            .position
            .unwrap_or_else(|| panic!("no position for frame {}", i));
        assert!(
            (position.x - cx).abs() <= tolerance && (position.y - cy).abs() <= tolerance,
            "frame {}: expected ({}, {}), got {:?}",
            i,
            cx,
            cy,
            position
        );
        assert!(report.drawn, "frame {} should be drawn", i);
    }
}

#[test]
fn test_tracks_linearly_moving_ball() {
    let dir = work_dir("linear");
    let input = dir.join("input");
    write_sequence(&input, GREEN);

    let config = TrackerConfig {
        output_path: dir.join("result").join("tracked_video.mp4"),
        sequence_fps: 25.0,
        ..TrackerConfig::default()
    };
    let summary = track_video(&input, &config).unwrap();

    assert_eq!(summary.output, config.output_path);
    assert_eq!(summary.stats.frames_read, FRAMES as u64);
    assert_eq!(summary.stats.frames_written, FRAMES as u64);
    assert_follows_ball(&summary.stats.reports, 2);

    let (count, fps, size) = inspect_video(&summary.output);
    assert_eq!(count, FRAMES);
    assert!((fps - 25.0).abs() < 1e-6, "output reports {} fps", fps);
    assert_eq!(size, Size::new(WIDTH, HEIGHT));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_tracks_ball_in_encoded_video() {
    let dir = work_dir("encoded");
    let input = dir.join("input.mp4");
    write_video(&input, GREEN, 25.0);

    let config = TrackerConfig {
        output_path: dir.join("out.mp4"),
        ..TrackerConfig::default()
    };
    let summary = track_video(&input, &config).unwrap();
    assert_follows_ball(&summary.stats.reports, 3);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_annotated_output_contains_trail() {
    let dir = work_dir("trail");
    let input = dir.join("input");
    write_sequence(&input, GREEN);

    let mut source = ImageSequenceSource::open(&input, 25.0).unwrap();
    let output = dir.join("annotated");
    let mut sink = ImageSequenceSink::create(&output).unwrap();
    let mut tracker = BallTracker::new(TrackerConfig::default()).unwrap();
    let stats = run_pipeline(&mut source, &mut sink, Some(&mut tracker)).unwrap();
    assert_eq!(stats.frames_written, FRAMES as u64);

    let mut annotated = ImageSequenceSource::open(&output, 25.0).unwrap();
    let mut last = None;
    while let Some(frame) = annotated.read_frame().unwrap() {
        last = Some(frame);
    }
    let last = last.unwrap();

    // Midway between the last two centers lies on the thickest trail segment
    let (x0, y0) = ball_center(FRAMES - 1);
    let (x1, _) = ball_center(FRAMES - 2);
    let mid = *last.at_2d::<Vec3b>(y0, (x0 + x1) / 2).unwrap();
    assert_eq!([mid[0], mid[1], mid[2]], [0, 0, 255]);

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_unmatched_color_yields_no_position() {
    let dir = work_dir("unmatched");
    let input = dir.join("input");
    write_sequence(&input, BLUE);

    let config = TrackerConfig {
        output_path: dir.join("out.mp4"),
        ..TrackerConfig::default()
    };
    let summary = track_video(&input, &config).unwrap();

    assert_eq!(summary.stats.frames_written, FRAMES as u64);
    assert_eq!(summary.stats.detections, 0);
    assert!(summary
        .stats
        .reports
        .iter()
        .all(|r| r.position.is_none() && !r.drawn));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_unmatched_color_leaves_combined_mask_empty() {
    let mut model = Mog2Subtractor::new(50.0, false, 500).unwrap();
    let segmenter = ColorSegmenter::new(11, 2);
    let range = HsvRange::default();

    for i in 0..3 {
        let frame = frame_with_ball(ball_center(i), BLUE);
        let foreground = model.apply(&frame).unwrap();
        let color = segmenter.extract(&frame, &range).unwrap();
        let combined = combine_masks(&foreground, &color).unwrap();
        assert_eq!(core::count_non_zero(&combined).unwrap(), 0);
    }
}

#[test]
fn test_passthrough_round_trip() {
    let dir = work_dir("passthrough");
    let input = dir.join("input.mp4");
    write_video(&input, GREEN, 12.5);

    let config = TrackerConfig {
        output_path: dir.join("copy.mp4"),
        ..TrackerConfig::default()
    };
    let summary = passthrough_video(&input, &config).unwrap();
    assert!(summary.stats.reports.is_empty());

    let (count, fps, size) = inspect_video(&summary.output);
    assert_eq!(count, FRAMES);
    assert!((fps - 12.5).abs() < 1e-6, "output reports {} fps", fps);
    assert_eq!(size, Size::new(WIDTH, HEIGHT));

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_directory_and_file_inputs_are_both_accepted() {
    let dir = work_dir("open_kinds");
    let sequence = dir.join("frames");
    write_sequence(&sequence, GREEN);
    let video = dir.join("clip.mp4");
    write_video(&video, GREEN, 25.0);

    for path in [&sequence, &video] {
        let source = open_source(path, 25.0).unwrap();
        assert_eq!(source.frame_size(), Size::new(WIDTH, HEIGHT));
        assert!((source.frame_rate() - 25.0).abs() < 1e-6);
    }

    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_unopenable_source_is_fatal() {
    let dir = work_dir("missing");
    let config = TrackerConfig {
        output_path: dir.join("out.mp4"),
        ..TrackerConfig::default()
    };

    let result = track_video(&dir.join("nope.mp4"), &config);
    assert!(result.is_err());
    assert!(!config.output_path.exists());

    std::fs::remove_dir_all(dir).ok();
}
