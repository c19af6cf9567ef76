//! Converts per-cell frame runs into audio sample ranges and gathers each
//! cell's audio into one buffer, preserving temporal order across the
//! cell's separate visits.

use crate::segment::{FrameRun, Segmentation};

/// Each cell's concatenated audio, indexed by `(row, col)`. Never-visited
/// cells hold an empty buffer.
pub type CellAudio = Vec<Vec<Vec<f32>>>;

/// Maps a frame run to its half-open audio sample range at the given
/// rates: `(floor(start * r), floor(end * r))` with
/// `r = audio_rate / frame_rate`.
pub fn sample_range(run: FrameRun, frame_rate: f64, audio_rate: u32) -> (usize, usize) {
    let ratio = audio_rate as f64 / frame_rate;
    (
        (run.start as f64 * ratio) as usize,
        (run.end as f64 * ratio) as usize,
    )
}

/// Slices the synchronized audio by each cell's frame runs and
/// concatenates the slices in run order.
pub fn segment_audio(
    segmentation: &Segmentation,
    audio: &[f32],
    frame_rate: f64,
    audio_rate: u32,
) -> CellAudio {
    let (rows, cols) = segmentation.shape();
    let mut cells: CellAudio = vec![vec![Vec::new(); cols]; rows];

    for (cell, runs) in segmentation.iter_cells() {
        for &run in runs {
            let (start, end) = sample_range(run, frame_rate, audio_rate);
            let start = start.min(audio.len());
            let end = end.min(audio.len());
            cells[cell.0][cell.1].extend_from_slice(&audio[start..end]);
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::segment::segment_track;

    #[test]
    fn frame_runs_map_to_sample_ranges() {
        let run = FrameRun { start: 10, end: 20 };
        assert_eq!(sample_range(run, 30.0, 48000), (16000, 32000));
    }

    #[test]
    fn a_fractional_ratio_floors() {
        let run = FrameRun { start: 1, end: 2 };
        // 44100 / 30 = 1470 exactly; 44100 / 29 is not
        assert_eq!(sample_range(run, 30.0, 44100), (1470, 2940));
        assert_eq!(sample_range(run, 29.0, 44100), (1520, 3041));
    }

    #[test]
    fn cell_audio_concatenates_visits_in_order() {
        // 2x2 grid over 100x100, 10 samples of audio per frame
        let grid = Grid::new(100.0, 100.0, 2, 2, 0.0);
        let xs = vec![25.0, 25.0, 75.0, 25.0];
        let ys = vec![25.0, 25.0, 25.0, 25.0];
        let seg = segment_track(&xs, &ys, &grid);

        let audio: Vec<f32> = (0..40).map(|i| i as f32).collect();
        let cells = segment_audio(&seg, &audio, 10.0, 100);

        // (0,0): frames 0..=1 then 3..=3 -> samples [0,10) ++ [30,30)
        assert_eq!(cells[0][0], (0..10).map(|i| i as f32).collect::<Vec<_>>());
        // (0,1): frames 2..=2 -> samples [20,20), empty slice
        assert!(cells[0][1].is_empty());
        // untouched cells stay empty
        assert!(cells[1][0].is_empty());
        assert!(cells[1][1].is_empty());
    }

    #[test]
    fn ranges_are_clamped_to_the_audio_length() {
        let grid = Grid::new(100.0, 100.0, 1, 1, 0.0);
        let xs = vec![50.0; 10];
        let ys = vec![50.0; 10];
        let seg = segment_track(&xs, &ys, &grid);

        // only half the audio the runs ask for actually exists
        let audio = vec![1.0f32; 45];
        let cells = segment_audio(&seg, &audio, 10.0, 100);
        assert_eq!(cells[0][0].len(), 45);
    }
}
