//! A simulated capture source and detector for demos and exercising the
//! full two-phase flow without a camera. The source paces blank frames at
//! its nominal rate; the detector walks the marker through every cell in
//! reading order with a little jitter and the occasional dropout.

use crate::capture::{CameraCharacteristics, Frame, FrameSource, MarkerDetector};
use crate::error::TrackError;
use crate::grid::{Grid, Point};
use rand::prelude::*;
use std::time::Duration;

/// Emits blank frames at a fixed rate, paced with a spin sleeper so the
/// dwell deltas the tracker measures are close to 1/fps.
pub struct DummySource {
    width: u32,
    height: u32,
    fps: f64,
    frames_left: usize,
}

impl DummySource {
    /// A `width x height` source that produces `frames_left` frames at
    /// `fps` before reporting a capture failure, like a camera being
    /// unplugged.
    pub fn new(width: u32, height: u32, fps: f64, frames_left: usize) -> Self {
        Self {
            width,
            height,
            fps,
            frames_left,
        }
    }
}

impl FrameSource for DummySource {
    fn characteristics(&self) -> CameraCharacteristics {
        CameraCharacteristics {
            height: self.height,
            width: self.width,
            fps: self.fps,
        }
    }

    fn next_frame(&mut self) -> Result<Frame, TrackError> {
        if self.frames_left == 0 {
            return Err(TrackError::CaptureFailure("dummy source exhausted".into()));
        }
        self.frames_left -= 1;

        spin_sleep::sleep(Duration::from_secs_f64(1.0 / self.fps));
        Ok(Frame {
            width: self.width,
            height: self.height,
            pixels: Vec::new(),
        })
    }
}

/// Replays a waypoint tour with jitter and dropouts instead of running a
/// real color-mask detector.
pub struct DummyDetector {
    waypoints: Vec<Point>,
    frames_per_waypoint: usize,
    jitter: f64,
    dropout: f64,
    frame: usize,
}

impl DummyDetector {
    /// Holds the marker at each waypoint for `frames_per_waypoint` frames
    /// in turn, staying at the last one afterwards. `jitter` is the
    /// uniform pixel noise per axis; `dropout` the per-frame probability
    /// of a missed detection.
    pub fn new(waypoints: Vec<Point>, frames_per_waypoint: usize, jitter: f64, dropout: f64) -> Self {
        assert!(!waypoints.is_empty());
        assert!(frames_per_waypoint > 0);
        assert!((0.0..1.0).contains(&dropout));

        Self {
            waypoints,
            frames_per_waypoint,
            jitter,
            dropout,
            frame: 0,
        }
    }
}

impl MarkerDetector for DummyDetector {
    fn detect(&mut self, _frame: &Frame) -> Option<Point> {
        let index = (self.frame / self.frames_per_waypoint).min(self.waypoints.len() - 1);
        self.frame += 1;

        let mut rng = thread_rng();
        if self.dropout > 0.0 && rng.gen_bool(self.dropout) {
            return None;
        }

        let waypoint = self.waypoints[index];
        let jitter = self.jitter;
        Some(Point {
            x: waypoint.x + if jitter > 0.0 { rng.gen_range(-jitter..jitter) } else { 0.0 },
            y: waypoint.y + if jitter > 0.0 { rng.gen_range(-jitter..jitter) } else { 0.0 },
        })
    }
}

/// The cell centers of a grid in reading order; a tour that visits every
/// cell exactly once.
pub fn cell_tour(grid: &Grid) -> Vec<Point> {
    (0..grid.rows())
        .flat_map(|row| {
            (0..grid.cols()).map(move |col| {
                let (tl, br) = grid.region((row, col));
                Point {
                    x: (tl.x + br.x) / 2.0,
                    y: (tl.y + br.y) / 2.0,
                }
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn the_tour_hits_every_cell_in_reading_order() {
        let grid = Grid::new(100.0, 100.0, 2, 2, 10.0);
        let tour = cell_tour(&grid);
        assert_eq!(tour.len(), 4);

        let cells: Vec<_> = tour
            .iter()
            .map(|&p| grid.locate_point(p).unwrap())
            .collect();
        assert_eq!(cells, vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
    }

    #[test]
    fn a_jitterless_detector_replays_its_waypoints() {
        let frame = Frame {
            width: 100,
            height: 100,
            pixels: Vec::new(),
        };
        let a = Point { x: 10.0, y: 10.0 };
        let b = Point { x: 90.0, y: 90.0 };
        let mut detector = DummyDetector::new(vec![a, b], 2, 0.0, 0.0);

        assert_eq!(detector.detect(&frame), Some(a));
        assert_eq!(detector.detect(&frame), Some(a));
        assert_eq!(detector.detect(&frame), Some(b));
        assert_eq!(detector.detect(&frame), Some(b));
        // stays at the last waypoint once the tour is over
        assert_eq!(detector.detect(&frame), Some(b));
    }

    #[test]
    fn the_source_fails_once_exhausted() {
        let mut source = DummySource::new(64, 48, 1000.0, 2);
        assert!(source.next_frame().is_ok());
        assert!(source.next_frame().is_ok());
        assert!(matches!(
            source.next_frame(),
            Err(TrackError::CaptureFailure(_))
        ));
    }
}
