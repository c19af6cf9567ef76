//! The offline analysis pipeline, run once per session after recording
//! stops: interpolate, synchronize, segment the track, segment the audio,
//! analyze the spectra. Strictly sequential; the first failing step
//! aborts the run and nothing downstream executes.

use crate::audio_segment::{segment_audio, CellAudio};
use crate::config::TrackingConfig;
use crate::error::TrackError;
use crate::events::TrackerEvent;
use crate::grid::{Grid, Point};
use crate::interpolate::{interpolate_track, CleanTrack};
use crate::segment::{segment_track, Segmentation};
use crate::spectrum::{SpectralAnalyzer, SpectrumGrid};
use crate::sync::{synchronize, SyncAdjustment};
use log::info;
use std::sync::mpsc::Sender;

/// A recorded session as the pipeline receives it: the raw position
/// series plus the independently captured audio and both rates.
#[derive(Debug, Clone)]
pub struct AnalysisInput {
    /// One sample per captured frame, missing detections included.
    pub series: Vec<Option<Point>>,
    /// Raw mono audio samples.
    pub audio: Vec<f32>,
    /// Audio sample rate, in Hz.
    pub audio_rate: u32,
    /// Video frame rate, in frames per second.
    pub frame_rate: f64,
}

/// Everything a completed pipeline run produces. Persistence happens
/// outside, and only when the whole run succeeded.
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    /// The gap-free, synchronized position series.
    pub track: CleanTrack,
    /// The audio window aligned with `track`.
    pub audio: Vec<f32>,
    /// How the synchronizer reconciled the two timelines.
    pub adjustment: SyncAdjustment,
    /// Per-cell frame runs.
    pub segmentation: Segmentation,
    /// Per-cell concatenated audio.
    pub cell_audio: CellAudio,
    /// Per-cell spectra and the shared frequency axis.
    pub spectrum: SpectrumGrid,
}

/// Runs the whole offline pipeline over one recorded session.
pub fn analyze(
    input: AnalysisInput,
    grid: &Grid,
    config: &TrackingConfig,
    events: &Sender<TrackerEvent>,
) -> Result<AnalysisOutput, TrackError> {
    info!("analysis started: {} frames, {} audio samples", input.series.len(), input.audio.len());

    let mut track = interpolate_track(&input.series)?;
    info!(
        "interpolated track: {} frames ({} leading, {} trailing trimmed)",
        track.len(),
        track.leading_trim,
        track.trailing_trim
    );

    let (audio, adjustment) =
        synchronize(&input.audio, input.audio_rate, &mut track, input.frame_rate)?;

    let segmentation = segment_track(&track.xs, &track.ys, grid);

    let cell_audio = segment_audio(&segmentation, &audio, input.frame_rate, input.audio_rate);

    let mut analyzer = SpectralAnalyzer::new(config.fft_size);
    let spectrum = analyzer.analyze_grid(&cell_audio, input.audio_rate, config.freq_range, events);

    info!("analysis finished");
    Ok(AnalysisOutput {
        track,
        audio,
        adjustment,
        segmentation,
        cell_audio,
        spectrum,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dwell::DwellAccumulator;
    use crate::grid::Point;
    use crate::segment::FrameRun;
    use std::sync::mpsc::channel;

    const AUDIO_RATE: u32 = 4800;
    const FRAME_RATE: f64 = 30.0;

    fn config() -> TrackingConfig {
        TrackingConfig {
            rows: 2,
            cols: 2,
            padding: 0.0,
            target_dwell_secs: 1.0,
            freq_range: (0.0, 2400.0),
            fft_size: 256,
        }
    }

    /// Frames 0-9 in cell (0,0), frames 10-19 in cell (1,1), over a 2x2
    /// grid on a 100x100 frame, audio exactly matching the video span.
    fn session() -> (AnalysisInput, Grid) {
        let grid = Grid::new(100.0, 100.0, 2, 2, 0.0);
        let mut series = Vec::new();
        for _ in 0..10 {
            series.push(Some(Point { x: 10.0, y: 10.0 }));
        }
        for _ in 0..10 {
            series.push(Some(Point { x: 90.0, y: 90.0 }));
        }

        let samples = (20.0 / FRAME_RATE * AUDIO_RATE as f64) as usize;
        let audio: Vec<f32> = (0..samples)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / AUDIO_RATE as f32).sin())
            .collect();

        (
            AnalysisInput {
                series,
                audio,
                audio_rate: AUDIO_RATE,
                frame_rate: FRAME_RATE,
            },
            grid,
        )
    }

    #[test]
    fn end_to_end_dwell_and_completion() {
        // the real-time half of the documented end-to-end scenario:
        // per-frame delta 0.1s against a 1.0s target
        let (input, grid) = session();
        let mut dwell = DwellAccumulator::new(2, 2, 1.0);
        let mut completed_at = None;

        for (frame, sample) in input.series.iter().enumerate() {
            let cell = sample.and_then(|p| grid.locate_point(p));
            dwell.update(cell, 0.1);
            if frame == 9 {
                assert!((dwell.alpha((0, 0)) - 1.0).abs() < 1e-9);
            }
            if dwell.poll_complete() {
                assert!(completed_at.is_none());
                completed_at = Some(frame);
            }
        }

        assert_eq!(completed_at, Some(19));
        assert!((dwell.alpha((1, 1)) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn end_to_end_offline_pipeline() {
        let (input, grid) = session();
        let (tx, rx) = channel();

        let output = analyze(input, &grid, &config(), &tx).unwrap();

        assert_eq!(output.track.len(), 20);
        assert_eq!(
            output.segmentation.runs((0, 0)),
            &[FrameRun { start: 0, end: 9 }]
        );
        assert_eq!(
            output.segmentation.runs((1, 1)),
            &[FrameRun { start: 10, end: 19 }]
        );

        // both visited cells carry audio and a spectrum; the others don't
        assert!(!output.cell_audio[0][0].is_empty());
        assert!(!output.cell_audio[1][1].is_empty());
        assert!(output.cell_audio[0][1].is_empty());
        assert!(!output.spectrum.magnitudes[0][0].is_empty());
        assert!(output.spectrum.magnitudes[0][1].is_empty());
        assert_eq!(
            output.spectrum.magnitudes[1][1].len(),
            output.spectrum.freqs.len()
        );

        // one progress event per cell
        let progress = rx
            .try_iter()
            .filter(|e| matches!(e, TrackerEvent::AnalysisProgress { .. }))
            .count();
        assert_eq!(progress, 4);
    }

    #[test]
    fn an_all_missing_series_aborts_before_any_output() {
        let (mut input, grid) = session();
        input.series = vec![None; 20];
        let (tx, rx) = channel();

        assert!(matches!(
            analyze(input, &grid, &config(), &tx),
            Err(TrackError::NoUsableTrackData)
        ));
        // no stage after the failing one ran
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn gaps_in_the_series_are_bridged_before_segmentation() {
        let (mut input, grid) = session();
        // knock out a few interior detections; interpolation bridges them
        // inside cell (0,0), so the segmentation is unchanged
        input.series[3] = None;
        input.series[4] = None;

        let (tx, _rx) = channel();
        let output = analyze(input, &grid, &config(), &tx).unwrap();
        assert_eq!(
            output.segmentation.runs((0, 0)),
            &[FrameRun { start: 0, end: 9 }]
        );
    }
}
