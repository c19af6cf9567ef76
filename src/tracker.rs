//! The real-time recording loop: one frame per iteration, detector to
//! grid cell to dwell accumulator, building the position series that the
//! offline pipeline analyzes once the loop stops.

use crate::capture::{FrameSource, MarkerDetector};
use crate::config::TrackingConfig;
use crate::dwell::DwellAccumulator;
use crate::error::TrackError;
use crate::events::{emit, TrackerEvent};
use crate::grid::{Grid, Point};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Instant;

/// Everything a finished recording hands to the offline pipeline. Once
/// this is returned the real-time loop is gone; nothing writes to it
/// again.
#[derive(Debug, Clone)]
pub struct Recording {
    /// One sample per captured frame, in temporal order.
    pub series: Vec<Option<Point>>,
    /// Per-cell dwell times at the moment the loop stopped.
    pub dwell_times: Vec<Vec<f64>>,
    /// The grid the session was recorded against.
    pub grid: Grid,
    /// Frame rate reported by the capture source.
    pub frame_rate: f64,
}

/// Owns the capture source, the detector, and the accumulating state for
/// one recording session.
pub struct Tracker<S: FrameSource, D: MarkerDetector> {
    source: S,
    detector: D,
    grid: Grid,
    dwell: DwellAccumulator,
    target_dwell_secs: f64,
    events: Sender<TrackerEvent>,
    stop: Arc<AtomicBool>,
    recording: bool,
}

impl<S: FrameSource, D: MarkerDetector> Tracker<S, D> {
    /// Builds a tracker over a capture source. The grid is sized from the
    /// source's reported frame dimensions and the session configuration.
    pub fn new(
        source: S,
        detector: D,
        config: &TrackingConfig,
        events: Sender<TrackerEvent>,
    ) -> Self {
        let chars = source.characteristics();
        let grid = Grid::new(
            chars.width as f64,
            chars.height as f64,
            config.rows,
            config.cols,
            config.padding,
        );
        let dwell = DwellAccumulator::new(config.rows, config.cols, config.target_dwell_secs);

        Self {
            source,
            detector,
            grid,
            dwell,
            target_dwell_secs: config.target_dwell_secs,
            events,
            stop: Arc::new(AtomicBool::new(false)),
            recording: false,
        }
    }

    /// A handle the frontend can set to stop the loop cooperatively. The
    /// flag is checked once per iteration; an in-flight frame read is
    /// never interrupted.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Replaces the grid partition. Rejected once the recording loop has
    /// started, since resizing mid-session would scramble the dwell
    /// matrix.
    pub fn reconfigure(&mut self, rows: usize, cols: usize, padding: f64) -> Result<(), TrackError> {
        if self.recording {
            return Err(TrackError::ReconfigureWhileRecording);
        }
        self.grid.reconfigure(rows, cols, padding);
        // the dwell matrix must match the new shape
        self.dwell = DwellAccumulator::new(rows, cols, self.target_dwell_secs);
        Ok(())
    }

    /// Runs the recording loop to completion and returns the session
    /// data. Consuming the tracker drops the capture source (and releases
    /// its handle) on every exit path, including capture failure.
    pub fn run(mut self) -> Recording {
        let chars = self.source.characteristics();
        emit(
            &self.events,
            TrackerEvent::CameraCharacteristics {
                height: chars.height,
                width: chars.width,
                fps: chars.fps,
            },
        );

        info!("recording started");
        self.recording = true;
        self.dwell.reset();
        let mut series: Vec<Option<Point>> = Vec::new();
        let mut last_tick = Instant::now();

        while !self.stop.load(Ordering::Relaxed) {
            let frame = match self.source.next_frame() {
                Ok(frame) => frame,
                Err(error) => {
                    // fatal to the loop only; keep what we recorded
                    warn!("capture failed, stopping: {}", error);
                    break;
                }
            };

            let sample = self.detector.detect(&frame);
            let delta = last_tick.elapsed().as_secs_f64();
            last_tick = Instant::now();

            let cell = sample.and_then(|p| self.grid.locate_point(p));
            if let Some(cell) = cell {
                debug!("marker in cell {:?}", cell);
            }
            self.dwell.update(cell, delta);
            series.push(sample);

            if self.dwell.poll_complete() {
                info!("all cells reached their target dwell time");
                emit(&self.events, TrackerEvent::AllCellsComplete);
            }
        }

        info!("recording stopped after {} frames", series.len());
        emit(
            &self.events,
            TrackerEvent::RecordingStopped {
                series: series.clone(),
            },
        );

        Recording {
            series,
            dwell_times: self.dwell.times().to_vec(),
            grid: self.grid,
            frame_rate: chars.fps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{CameraCharacteristics, Frame};
    use std::sync::mpsc::channel;

    /// Emits blank frames until its script runs out, then fails like a
    /// disconnected camera.
    struct ScriptedSource {
        frames_left: usize,
    }

    impl FrameSource for ScriptedSource {
        fn characteristics(&self) -> CameraCharacteristics {
            CameraCharacteristics {
                height: 100,
                width: 100,
                fps: 30.0,
            }
        }

        fn next_frame(&mut self) -> Result<Frame, TrackError> {
            if self.frames_left == 0 {
                return Err(TrackError::CaptureFailure("device disconnected".into()));
            }
            self.frames_left -= 1;
            Ok(Frame {
                width: 100,
                height: 100,
                pixels: Vec::new(),
            })
        }
    }

    /// Replays a fixed list of detections.
    struct ScriptedDetector {
        samples: std::vec::IntoIter<Option<Point>>,
    }

    impl MarkerDetector for ScriptedDetector {
        fn detect(&mut self, _frame: &Frame) -> Option<Point> {
            self.samples.next().flatten()
        }
    }

    fn config_2x2() -> TrackingConfig {
        TrackingConfig {
            rows: 2,
            cols: 2,
            padding: 0.0,
            target_dwell_secs: 1.0,
            ..TrackingConfig::default()
        }
    }

    #[test]
    fn records_one_sample_per_frame_and_stops_on_capture_failure() {
        let samples = vec![
            Some(Point { x: 10.0, y: 10.0 }),
            None,
            Some(Point { x: 90.0, y: 90.0 }),
        ];
        let tracker = Tracker::new(
            ScriptedSource { frames_left: 3 },
            ScriptedDetector {
                samples: samples.clone().into_iter(),
            },
            &config_2x2(),
            channel().0,
        );

        // the 4th read fails; the loop must keep the 3 recorded samples
        let recording = tracker.run();
        assert_eq!(recording.series, samples);
        assert_eq!(recording.frame_rate, 30.0);
    }

    #[test]
    fn emits_characteristics_then_recording_stopped() {
        let (tx, rx) = channel();
        let tracker = Tracker::new(
            ScriptedSource { frames_left: 2 },
            ScriptedDetector {
                samples: vec![None, None].into_iter(),
            },
            &config_2x2(),
            tx,
        );
        tracker.run();

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events[0],
            TrackerEvent::CameraCharacteristics {
                height: 100,
                width: 100,
                fps: 30.0,
            }
        );
        assert!(matches!(
            events.last(),
            Some(TrackerEvent::RecordingStopped { series }) if series.len() == 2
        ));
    }

    #[test]
    fn the_stop_flag_ends_the_loop_before_the_next_read() {
        let tracker = Tracker::new(
            ScriptedSource { frames_left: 1000 },
            ScriptedDetector {
                samples: Vec::new().into_iter(),
            },
            &config_2x2(),
            channel().0,
        );
        tracker.stop_handle().store(true, Ordering::Relaxed);

        let recording = tracker.run();
        assert!(recording.series.is_empty());
    }

    #[test]
    fn reconfigure_before_running_resizes_the_grid() {
        let mut tracker = Tracker::new(
            ScriptedSource { frames_left: 0 },
            ScriptedDetector {
                samples: Vec::new().into_iter(),
            },
            &config_2x2(),
            channel().0,
        );
        tracker.reconfigure(3, 5, 2.0).unwrap();
        let recording = tracker.run();
        assert_eq!(recording.grid.rows(), 3);
        assert_eq!(recording.grid.cols(), 5);
        assert_eq!(recording.dwell_times.len(), 3);
        assert_eq!(recording.dwell_times[0].len(), 5);
    }
}
