//! Per-cell spectral analysis: a Welch-style averaged power spectrum of
//! each cell's concatenated audio, restricted to the configured frequency
//! range.

use crate::audio_segment::CellAudio;
use crate::events::{emit, TrackerEvent};
use log::{debug, info};
use realfft::RealFftPlanner;
use std::sync::mpsc::Sender;

/// Frequency bin centers shared by every cell's spectrum, in Hz.
pub type FrequencyAxis = Vec<f32>;

/// The spectra of every cell, indexed by `(row, col)`, plus the shared
/// frequency axis. Cells that were never visited hold an empty magnitude
/// vector.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumGrid {
    /// Per-cell magnitude values in dB, aligned to `freqs`.
    pub magnitudes: Vec<Vec<Vec<f32>>>,
    /// Bin centers for every non-empty magnitude vector.
    pub freqs: FrequencyAxis,
}

/// Computes power spectra with a fixed FFT size and a Hann window,
/// averaging 50%-overlapped frames.
pub struct SpectralAnalyzer {
    planner: RealFftPlanner<f32>,
    fft_size: usize,
    window: Vec<f32>,
}

impl SpectralAnalyzer {
    /// Creates an analyzer. `fft_size` must be even and non-zero; 4096 is
    /// a sensible default for speech-band work at 44.1/48 kHz.
    pub fn new(fft_size: usize) -> Self {
        assert!(fft_size > 0 && fft_size % 2 == 0);

        let window = (0..fft_size)
            .map(|i| {
                0.5 * (1.0
                    - (2.0 * std::f32::consts::PI * i as f32 / (fft_size - 1) as f32).cos())
            })
            .collect();

        Self {
            planner: RealFftPlanner::new(),
            fft_size,
            window,
        }
    }

    /// Averaged power per bin over 50%-overlapped Hann-windowed frames,
    /// in dB. Input shorter than one frame is zero-padded to a single
    /// frame so short visits still produce a spectrum.
    pub fn power_spectrum(&mut self, samples: &[f32]) -> Vec<f32> {
        let fft = self.planner.plan_fft_forward(self.fft_size);
        let mut input = fft.make_input_vec();
        let mut output = fft.make_output_vec();

        let padded;
        let samples = if samples.len() < self.fft_size {
            padded = {
                let mut p = samples.to_vec();
                p.resize(self.fft_size, 0.0);
                p
            };
            &padded[..]
        } else {
            samples
        };

        let hop = self.fft_size / 2;
        let n_frames = (samples.len() - self.fft_size) / hop + 1;
        let mut accum = vec![0.0f64; self.fft_size / 2 + 1];

        for frame_i in 0..n_frames {
            let frame = &samples[frame_i * hop..frame_i * hop + self.fft_size];
            for (inp, (&s, &w)) in input.iter_mut().zip(frame.iter().zip(&self.window)) {
                *inp = s * w;
            }
            fft.process(&mut input, &mut output).expect("FFT failed");

            for (acc, bin) in accum.iter_mut().zip(&output) {
                *acc += bin.norm_sqr() as f64;
            }
        }

        let scale = 1.0 / n_frames as f64;
        accum
            .iter()
            .map(|&p| (10.0 * (p * scale).max(1e-12).log10()) as f32)
            .collect()
    }

    /// The bin indices and center frequencies falling inside
    /// `[freq_lo, freq_hi]` at the given audio rate.
    fn axis(&self, audio_rate: u32, freq_range: (f32, f32)) -> (Vec<usize>, FrequencyAxis) {
        let bin_width = audio_rate as f32 / self.fft_size as f32;
        (0..=self.fft_size / 2)
            .map(|k| (k, k as f32 * bin_width))
            .filter(|&(_, f)| f >= freq_range.0 && f <= freq_range.1)
            .unzip()
    }

    /// Analyzes every cell of a [`CellAudio`] grid, emitting a progress
    /// event per cell. Cells with no audio receive an empty entry.
    ///
    /// The returned frequency axis is the one computed for the last
    /// non-empty cell; with a fixed FFT size and a single audio rate per
    /// run it is identical for every cell.
    pub fn analyze_grid(
        &mut self,
        cells: &CellAudio,
        audio_rate: u32,
        freq_range: (f32, f32),
        events: &Sender<TrackerEvent>,
    ) -> SpectrumGrid {
        info!("analysis limits: {} Hz to {} Hz", freq_range.0, freq_range.1);

        let rows = cells.len();
        let cols = cells.first().map_or(0, Vec::len);
        let mut magnitudes = vec![vec![Vec::new(); cols]; rows];
        let mut freqs = FrequencyAxis::new();

        let mut index = 0;
        for row in 0..rows {
            for col in 0..cols {
                emit(
                    events,
                    TrackerEvent::AnalysisProgress {
                        cell: (row, col),
                        index,
                    },
                );
                index += 1;

                let audio = &cells[row][col];
                if audio.is_empty() {
                    debug!("cell ({}, {}) has no audio, skipping", row, col);
                    continue;
                }

                let full = self.power_spectrum(audio);
                let (bins, cell_freqs) = self.axis(audio_rate, freq_range);
                magnitudes[row][col] = bins.iter().map(|&k| full[k]).collect();
                freqs = cell_freqs;
            }
        }

        SpectrumGrid { magnitudes, freqs }
    }
}
