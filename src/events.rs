//! Notifications emitted by the tracker and the analysis pipeline.
//!
//! Listeners receive these over a plain `mpsc` channel supplied at
//! construction, so the core stays decoupled from whatever frontend is
//! displaying progress.

use crate::grid::{CellId, Point};
use log::warn;
use std::sync::mpsc::Sender;

/// Everything a frontend may want to know about a running session.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// Emitted once when the capture stream opens.
    CameraCharacteristics {
        /// Frame height in pixels.
        height: u32,
        /// Frame width in pixels.
        width: u32,
        /// Nominal frame rate of the source.
        fps: f64,
    },

    /// Emitted exactly once, the first time every cell reaches its
    /// target dwell duration.
    AllCellsComplete,

    /// Emitted when the real-time loop exits, carrying the full position
    /// series as recorded (missing detections included).
    RecordingStopped {
        /// One sample per captured frame, in temporal order.
        series: Vec<Option<Point>>,
    },

    /// Emitted per cell while the spectral analyzer works through the
    /// grid.
    AnalysisProgress {
        /// The cell just analyzed.
        cell: CellId,
        /// Zero-based index of that cell in processing order.
        index: usize,
    },
}

/// Sends an event, logging instead of panicking when the listener has
/// hung up. A missing listener must never take down the pipeline.
pub fn emit(events: &Sender<TrackerEvent>, event: TrackerEvent) {
    if let Err(error) = events.send(event) {
        warn!("event listener hung up: {}", error);
    }
}
