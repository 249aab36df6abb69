//! asciicam library crate.
//!
//! Turns a webcam (V4L2) or a GStreamer pipeline into colored text art in
//! the terminal, with an optional Lab-distance greenscreen. The binary in
//! `main.rs` wires these modules together; they are public for
//! integration testing.

pub mod ascii;
pub mod camera;
pub mod cli;
pub mod config;
pub mod fps;
pub mod greenscreen;
pub mod pipeline;
pub mod resize;
pub mod session;
pub mod terminal;
