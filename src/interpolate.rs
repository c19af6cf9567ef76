//! Fills gaps in a recorded position series. The detector legitimately
//! loses the marker for stretches of frames; interior gaps are bridged by
//! linear interpolation between the surrounding detections, while leading
//! and trailing gaps have no anchor on one side and are trimmed instead.

use crate::error::TrackError;
use crate::grid::Point;

/// A gap-free position series, plus how many unrecoverable samples were
/// removed from each end of the raw recording.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanTrack {
    /// Interpolated x coordinates, one per surviving frame.
    pub xs: Vec<f64>,
    /// Interpolated y coordinates, one per surviving frame.
    pub ys: Vec<f64>,
    /// Frames removed from the front (missing before the first detection).
    pub leading_trim: usize,
    /// Frames removed from the back (missing after the last detection).
    pub trailing_trim: usize,
}

impl CleanTrack {
    /// Number of frames remaining in the cleaned series.
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// True when every frame was trimmed away.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }
}

/// Cleans a raw position series: interior runs of missing samples are
/// linearly interpolated between their two anchors, and anchorless runs at
/// either end are dropped and reported as trims.
///
/// Fails with [`TrackError::NoUsableTrackData`] when the series contains
/// no detection at all.
pub fn interpolate_track(series: &[Option<Point>]) -> Result<CleanTrack, TrackError> {
    let first = series
        .iter()
        .position(Option::is_some)
        .ok_or(TrackError::NoUsableTrackData)?;
    let last = series.iter().rposition(Option::is_some).unwrap();

    let leading_trim = first;
    let trailing_trim = series.len() - 1 - last;
    let window = &series[first..=last];

    let xs = fill_channel(window.iter().map(|s| s.map(|p| p.x)));
    let ys = fill_channel(window.iter().map(|s| s.map(|p| p.y)));

    Ok(CleanTrack {
        xs,
        ys,
        leading_trim,
        trailing_trim,
    })
}

/// Linearly interpolates the `None` runs of one coordinate channel. The
/// first and last values are guaranteed present by the caller.
fn fill_channel(channel: impl Iterator<Item = Option<f64>>) -> Vec<f64> {
    let raw: Vec<Option<f64>> = channel.collect();
    let mut filled = Vec::with_capacity(raw.len());

    let mut i = 0;
    while i < raw.len() {
        match raw[i] {
            Some(v) => {
                filled.push(v);
                i += 1;
            }
            None => {
                // maximal missing run, anchored on both sides
                let gap_start = i;
                while raw[i].is_none() {
                    i += 1;
                }
                let a = filled[gap_start - 1];
                let b = raw[i].unwrap();
                let span = (i - gap_start + 1) as f64;
                for k in 1..=(i - gap_start) {
                    filled.push(a + (b - a) * k as f64 / span);
                }
            }
        }
    }

    filled
}
