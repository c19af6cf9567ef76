//! Flat numeric artifacts for a session: the raw position series, the
//! grid record, the spectrum and its frequency axis, and optional
//! per-cell WAV exports. One value (or one cell) per line, plain text,
//! so downstream tooling can load them with anything.

use crate::error::TrackError;
use crate::grid::Point;
use crate::spectrum::SpectrumGrid;
use hound::{SampleFormat, WavSpec, WavWriter};
use log::info;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Writes the raw position series as `track.x` and `track.y`, one value
/// per line. Missing detections are written as `nan` so the files stay
/// frame-aligned.
pub fn save_track(dir: impl AsRef<Path>, series: &[Option<Point>]) -> Result<(), TrackError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut xs = String::new();
    let mut ys = String::new();
    for sample in series {
        match sample {
            Some(p) => {
                writeln!(xs, "{}", p.x).unwrap();
                writeln!(ys, "{}", p.y).unwrap();
            }
            None => {
                xs.push_str("nan\n");
                ys.push_str("nan\n");
            }
        }
    }

    fs::write(dir.join("track.x"), xs)?;
    fs::write(dir.join("track.y"), ys)?;
    Ok(())
}

/// Loads a position series saved by [`save_track`]; `nan` lines become
/// missing samples again.
pub fn load_track(dir: impl AsRef<Path>) -> Result<Vec<Option<Point>>, TrackError> {
    let dir = dir.as_ref();
    let xs = load_channel(&dir.join("track.x"))?;
    let ys = load_channel(&dir.join("track.y"))?;

    Ok(xs
        .into_iter()
        .zip(ys)
        .map(|pair| match pair {
            (Some(x), Some(y)) => Some(Point { x, y }),
            _ => None,
        })
        .collect())
}

fn load_channel(path: &Path) -> Result<Vec<Option<f64>>, TrackError> {
    fs::read_to_string(path)?
        .lines()
        .map(|line| {
            let value: f64 = line
                .trim()
                .parse()
                .map_err(|_| TrackError::MalformedTrackFile(line.to_string()))?;
            Ok(if value.is_nan() { None } else { Some(value) })
        })
        .collect()
}

/// Writes the spectrum grid as `results.spec` (one cell per line in
/// row-major order, magnitudes space-separated, empty line for an
/// unvisited cell) and the shared axis as `results.freq`.
pub fn save_spectrum(dir: impl AsRef<Path>, spectrum: &SpectrumGrid) -> Result<(), TrackError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut spec = String::new();
    for row in &spectrum.magnitudes {
        for cell in row {
            let line: Vec<String> = cell.iter().map(f32::to_string).collect();
            writeln!(spec, "{}", line.join(" ")).unwrap();
        }
    }
    fs::write(dir.join("results.spec"), spec)?;

    let mut freq = String::new();
    for f in &spectrum.freqs {
        writeln!(freq, "{}", f).unwrap();
    }
    fs::write(dir.join("results.freq"), freq)?;

    info!("saved spectrum artifacts to {}", dir.display());
    Ok(())
}

/// Writes each visited cell's concatenated audio as
/// `cell_<row>_<col>.wav`. Empty cells produce no file.
pub fn export_cell_audio(
    dir: impl AsRef<Path>,
    cells: &[Vec<Vec<f32>>],
    audio_rate: u32,
) -> Result<(), TrackError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let spec = WavSpec {
        channels: 1,
        sample_rate: audio_rate,
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    for (row, cols) in cells.iter().enumerate() {
        for (col, audio) in cols.iter().enumerate() {
            if audio.is_empty() {
                continue;
            }
            let path = dir.join(format!("cell_{}_{}.wav", row, col));
            let mut writer = WavWriter::create(&path, spec)?;
            for &sample in audio {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::WavReader;
    use tempfile::tempdir;

    #[test]
    fn a_track_roundtrips_including_missing_samples() {
        let dir = tempdir().unwrap();
        let series = vec![
            Some(Point { x: 1.5, y: 2.5 }),
            None,
            Some(Point { x: 3.0, y: 4.0 }),
        ];

        save_track(dir.path(), &series).unwrap();
        let loaded = load_track(dir.path()).unwrap();
        assert_eq!(loaded, series);
    }

    #[test]
    fn a_malformed_track_file_is_an_error() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("track.x"), "1.0\nbogus\n").unwrap();
        fs::write(dir.path().join("track.y"), "1.0\n2.0\n").unwrap();

        assert!(matches!(
            load_track(dir.path()),
            Err(TrackError::MalformedTrackFile(_))
        ));
    }

    #[test]
    fn spectrum_files_have_one_line_per_cell_and_per_bin() {
        let dir = tempdir().unwrap();
        let spectrum = SpectrumGrid {
            magnitudes: vec![
                vec![vec![1.0, 2.0], Vec::new()],
                vec![vec![3.0, 4.0], vec![5.0, 6.0]],
            ],
            freqs: vec![100.0, 200.0],
        };

        save_spectrum(dir.path(), &spectrum).unwrap();

        let spec = fs::read_to_string(dir.path().join("results.spec")).unwrap();
        let lines: Vec<&str> = spec.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "1 2");
        assert_eq!(lines[1], "");
        assert_eq!(lines[3], "5 6");

        let freq = fs::read_to_string(dir.path().join("results.freq")).unwrap();
        assert_eq!(freq.lines().count(), 2);
    }

    #[test]
    fn cell_audio_exports_skip_empty_cells() {
        let dir = tempdir().unwrap();
        let cells = vec![vec![vec![0.1f32, -0.1, 0.2], Vec::new()]];

        export_cell_audio(dir.path(), &cells, 48000).unwrap();

        assert!(!dir.path().join("cell_0_1.wav").exists());
        let mut reader = WavReader::open(dir.path().join("cell_0_0.wav")).unwrap();
        let samples: Vec<f32> = reader.samples::<f32>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, vec![0.1, -0.1, 0.2]);
    }
}
