//! End-to-end tests of the frame pipeline: raw bytes in, terminal text out.
//!
//! These run without hardware by feeding scripted frame sources.

use std::collections::VecDeque;

use asciicam::ascii::{RenderConfig, RenderMode};
use asciicam::camera::{
    decode, decode_rgb, decode_yuyv, FrameOutcome, FrameSource, PixelFormat, RawFrame,
    Resolution, SourceError,
};
use asciicam::greenscreen::{Greenscreen, SampleStore, DEFAULT_SAMPLE_INDEX, DEFAULT_THRESHOLD};
use asciicam::resize::Bilinear;
use asciicam::session::{CancelToken, Session};
use asciicam::terminal::{ColorProfile, TerminalOutput};
use image::Rgba;

struct Replay {
    frames: VecDeque<FrameOutcome>,
    resolution: Resolution,
}

impl Replay {
    fn rgb(frames: Vec<Vec<u8>>, width: u32, height: u32) -> Self {
        Self {
            frames: frames
                .into_iter()
                .map(|data| FrameOutcome::Frame(RawFrame::new(data, width, height, PixelFormat::Rgb888)))
                .collect(),
            resolution: Resolution::new(width, height),
        }
    }
}

impl FrameSource for Replay {
    fn next_frame(&mut self) -> Result<FrameOutcome, SourceError> {
        Ok(self.frames.pop_front().unwrap_or(FrameOutcome::EndOfStream))
    }

    fn resolution(&self) -> Resolution {
        self.resolution
    }
}

fn render_config(width: u32, height: u32, profile: ColorProfile) -> RenderConfig {
    RenderConfig {
        override_color: None,
        width,
        height,
        mode: RenderMode::Ascii,
        profile,
    }
}

/// Strip CSI sequences so only glyphs and newlines remain.
fn strip_escapes(s: &str) -> String {
    let mut out = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            for c in chars.by_ref() {
                if c.is_ascii_alphabetic() {
                    break;
                }
            }
        } else {
            out.push(c);
        }
    }
    out
}

fn run_to_end(source: Replay, config: RenderConfig, greenscreen: Greenscreen) -> String {
    let mut session = Session::new(source, Bilinear, greenscreen, config);
    let mut out = TerminalOutput::new(Vec::new());
    session.run(&mut out, &CancelToken::new()).unwrap();
    String::from_utf8(out.into_inner()).unwrap()
}

#[test]
fn test_white_rgb_frame_renders_densest_glyph() {
    let source = Replay::rgb(vec![vec![255; 4 * 4 * 3]], 4, 4);
    let written = run_to_end(source, render_config(4, 4, ColorProfile::Ascii), Greenscreen::disabled());
    assert_eq!(strip_escapes(&written), "@@@@\n@@@@\n@@@@\n@@@@\n");
}

#[test]
fn test_colored_output_has_same_glyphs() {
    let source = Replay::rgb(vec![vec![255; 4 * 4 * 3]], 4, 4);
    let written = run_to_end(
        source,
        render_config(4, 4, ColorProfile::TrueColor),
        Greenscreen::disabled(),
    );
    assert!(written.contains("\x1b[38;2;255;255;255m@\x1b[0m"));
    assert_eq!(strip_escapes(&written), "@@@@\n@@@@\n@@@@\n@@@@\n");
}

#[test]
fn test_capture_is_resized_to_output() {
    let source = Replay::rgb(vec![vec![0; 8 * 6 * 3]], 8, 6);
    let written = run_to_end(source, render_config(3, 2, ColorProfile::Ascii), Greenscreen::disabled());
    assert_eq!(strip_escapes(&written), "   \n   \n");
}

#[test]
fn test_half_block_output_has_requested_rows() {
    let source = Replay::rgb(vec![vec![90; 16 * 16 * 3]], 16, 16);
    let mut config = render_config(5, 3, ColorProfile::TrueColor);
    config.mode = RenderMode::HalfBlock;
    let written = run_to_end(source, config, Greenscreen::disabled());
    assert_eq!(strip_escapes(&written), "▀▀▀▀▀\n▀▀▀▀▀\n▀▀▀▀▀\n");
}

#[test]
fn test_greenscreen_from_recorded_sample() {
    let temp = tempfile::TempDir::new().unwrap();
    let store = SampleStore::new(temp.path());

    // Background is a flat green wall
    let wall = image::RgbaImage::from_pixel(4, 4, Rgba([0, 200, 0, 255]));
    store.write(DEFAULT_SAMPLE_INDEX, &wall).unwrap();
    let greenscreen =
        Greenscreen::load(&store, DEFAULT_SAMPLE_INDEX, 4, 1, DEFAULT_THRESHOLD, &Bilinear).unwrap();

    // Frame: wall on the left, white subject on the right
    let mut frame = Vec::new();
    for x in 0..4 {
        if x < 2 {
            frame.extend_from_slice(&[0, 200, 0]);
        } else {
            frame.extend_from_slice(&[255, 255, 255]);
        }
    }
    let source = Replay::rgb(vec![frame], 4, 1);
    let written = run_to_end(source, render_config(4, 1, ColorProfile::Ascii), greenscreen);
    assert_eq!(strip_escapes(&written), "  @@\n");
}

#[test]
fn test_yuyv_decode_is_deterministic() {
    let data: Vec<u8> = (0..4 * 2 * 2).map(|i| (i * 37 % 256) as u8).collect();
    let a = decode_yuyv(&data, 4, 2).unwrap();
    let b = decode_yuyv(&data, 4, 2).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.dimensions(), (4, 2));
    assert!(a.pixels().all(|p| p[3] == 255));
}

#[test]
fn test_yuyv_red_frame() {
    // BT.601 full-range red is roughly Y=76 Cb=85 Cr=255
    let raw = RawFrame::new([76, 85, 76, 255].repeat(2), 2, 2, PixelFormat::Yuyv422);
    let image = decode(raw).unwrap();
    for p in image.pixels() {
        assert!(p[0] >= 250 && p[1] <= 5 && p[2] <= 5, "pixel {:?}", p);
    }
}

#[test]
fn test_rgb_red_frame() {
    let image = decode_rgb(&[255, 0, 0].repeat(6), 3, 2);
    assert!(image.pixels().all(|p| *p == Rgba([255, 0, 0, 255])));
}

#[test]
fn test_short_rgb_frame_leaves_tail_transparent() {
    let image = decode_rgb(&[10, 20, 30, 40, 50], 2, 1);
    assert_eq!(image.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    assert_eq!(image.get_pixel(1, 0), &Rgba([0, 0, 0, 0]));
}
