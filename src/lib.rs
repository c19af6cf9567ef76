//! soundgrid tracks a color marker moving over a grid-partitioned camera
//! frame, accumulates how long the marker dwells in each cell, and, once
//! recording stops, synchronizes the position timeline with a separately
//! captured audio stream to segment the audio by cell and compute a
//! per-cell frequency spectrum.
//!
//! The crate is split along the two phases of a session:
//!
//! - the real-time phase ([`tracker`]), a single loop fed by a
//!   [`capture::FrameSource`] and a [`capture::MarkerDetector`], which
//!   builds the position series and the dwell matrix;
//! - the offline phase ([`pipeline`]), which interpolates the series,
//!   synchronizes it with the audio, run-length-encodes it into per-cell
//!   segments, gathers each cell's audio, and analyzes its spectrum.
//!
//! Capture devices, detection internals, and on-screen rendering are
//! external collaborators; the core only consumes a point-or-none per
//! frame and raw audio samples.

#![warn(missing_docs)]
pub mod args;
pub mod audio_segment;
pub mod capture;
pub mod config;
pub mod dummy_capture;
pub mod dwell;
pub mod error;
pub mod events;
pub mod grid;
pub mod interpolate;
pub mod persist;
pub mod pipeline;
pub mod segment;
pub mod spectrum;
pub mod sync;
pub mod tracker;

pub use error::TrackError;
pub use grid::{CellId, Grid, Point};
