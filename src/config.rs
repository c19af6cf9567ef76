//! The immutable per-session configuration. Components receive this by
//! reference at construction; nothing reads ambient global state.

use crate::error::TrackError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_fft_size() -> usize {
    4096
}

/// Everything the caller decides up front about a tracking session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// Grid rows.
    pub rows: usize,
    /// Grid columns.
    pub cols: usize,
    /// Padding margin excluded from cell assignment, in pixels.
    pub padding: f64,
    /// Dwell time each cell must accumulate, in seconds.
    pub target_dwell_secs: f64,
    /// Frequency analysis range `(low, high)`, in Hz.
    pub freq_range: (f32, f32),
    /// FFT size used by the spectral analyzer.
    #[serde(default = "default_fft_size")]
    pub fft_size: usize,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            rows: 3,
            cols: 4,
            padding: 60.0,
            target_dwell_secs: 5.0,
            freq_range: (20.0, 20_000.0),
            fft_size: default_fft_size(),
        }
    }
}

impl TrackingConfig {
    /// Reads and validates a ron-encoded configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TrackError> {
        let text = fs::read_to_string(path)?;
        let config: Self = ron::de::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Writes the configuration as ron.
    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), TrackError> {
        let text = ron::ser::to_string(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// Rejects configurations no pipeline run could make sense of.
    pub fn validate(&self) -> Result<(), TrackError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(TrackError::InvalidConfig(
                "grid must have at least one row and one column".into(),
            ));
        }
        if self.padding < 0.0 {
            return Err(TrackError::InvalidConfig("padding must be non-negative".into()));
        }
        if self.target_dwell_secs <= 0.0 {
            return Err(TrackError::InvalidConfig(
                "target dwell duration must be positive".into(),
            ));
        }
        if self.freq_range.0 < 0.0 || self.freq_range.1 <= self.freq_range.0 {
            return Err(TrackError::InvalidConfig(
                "frequency range must be ordered and non-negative".into(),
            ));
        }
        if self.fft_size == 0 || self.fft_size % 2 != 0 {
            return Err(TrackError::InvalidConfig("fft size must be even".into()));
        }
        Ok(())
    }
}
