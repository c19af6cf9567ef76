//! The seams between the tracking core and its capture collaborators.
//!
//! Frame acquisition and marker detection are external concerns; the core
//! only needs a frame-or-error per tick and a point-or-none per frame.
//! Keeping both behind traits lets the real hardware, the simulator, and
//! the tests plug into the same loop.

use crate::error::TrackError;
use crate::grid::Point;

/// One captured video frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data; the core never inspects it, only the detector does.
    pub pixels: Vec<u8>,
}

/// What the capture stream reports about itself when it opens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraCharacteristics {
    /// Frame height in pixels.
    pub height: u32,
    /// Frame width in pixels.
    pub width: u32,
    /// Nominal frames per second.
    pub fps: f64,
}

/// A source of video frames. The tracker owns its source and drops it on
/// every exit path, which is what releases the underlying capture handle.
pub trait FrameSource {
    /// Stream metadata, available before the first frame.
    fn characteristics(&self) -> CameraCharacteristics;

    /// Blocks until the next frame arrives. An error is a
    /// [`TrackError::CaptureFailure`] and ends the recording loop.
    fn next_frame(&mut self) -> Result<Frame, TrackError>;
}

/// Finds the tracked marker in a frame, if it is visible. Detection
/// internals (color masking, circle fitting) live entirely behind this
/// trait.
pub trait MarkerDetector {
    /// The marker's pixel position in this frame, or `None` when it was
    /// not found.
    fn detect(&mut self, frame: &Frame) -> Option<Point>;
}
