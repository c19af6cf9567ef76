//! Accumulates the time the tracked marker has spent in each grid cell
//! during a recording session, and reports per-cell completion against a
//! target dwell duration.

use crate::grid::CellId;

/// Per-cell elapsed-time accumulator. Totals are monotonically
/// non-decreasing while a session is active and reset only when a new
/// session starts.
#[derive(Debug, Clone)]
pub struct DwellAccumulator {
    times: Vec<Vec<f64>>,
    target_secs: f64,
    notified: bool,
}

impl DwellAccumulator {
    /// Creates an accumulator for a `rows x cols` grid with the given
    /// target dwell duration per cell, in seconds.
    pub fn new(rows: usize, cols: usize, target_secs: f64) -> Self {
        assert!(rows > 0 && cols > 0);
        assert!(target_secs > 0.0, "target dwell must be positive");

        Self {
            times: vec![vec![0.0; cols]; rows],
            target_secs,
            notified: false,
        }
    }

    /// Adds `delta_secs` to the cell the marker currently occupies. When
    /// the marker is missing or outside the grid the time is dropped, but
    /// the caller's clock baseline has already advanced, so the next delta
    /// is measured from now regardless.
    pub fn update(&mut self, cell: Option<CellId>, delta_secs: f64) {
        if let Some((row, col)) = cell {
            self.times[row][col] += delta_secs;
        }
    }

    /// Normalized completion for one cell, clamped to `[0, 1]`.
    pub fn alpha(&self, cell: CellId) -> f64 {
        let (row, col) = cell;
        (self.times[row][col] / self.target_secs).clamp(0.0, 1.0)
    }

    /// True iff every cell has reached its target dwell duration. The
    /// tolerance absorbs float dust from summing many small deltas, so a
    /// cell whose deltas add up to the target is complete even when the
    /// binary sum lands a few ulps short.
    pub fn all_complete(&self) -> bool {
        self.times
            .iter()
            .flatten()
            .all(|&t| t + 1e-9 >= self.target_secs)
    }

    /// One-shot completion check: returns true the first time every cell
    /// reaches its target, and false on every call after that. Drives the
    /// all-cells-complete notification so it fires exactly once.
    pub fn poll_complete(&mut self) -> bool {
        if self.notified || !self.all_complete() {
            return false;
        }
        self.notified = true;
        true
    }

    /// Total accumulated time across all cells, in seconds.
    pub fn total(&self) -> f64 {
        self.times.iter().flatten().sum()
    }

    /// The raw `rows x cols` time matrix.
    pub fn times(&self) -> &[Vec<f64>] {
        &self.times
    }

    /// Clears all accumulated time for a new recording session.
    pub fn reset(&mut self) {
        for row in self.times.iter_mut() {
            row.fill(0.0);
        }
        self.notified = false;
    }
}
