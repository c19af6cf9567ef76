//! Run-length-encodes a cleaned position series into per-cell frame
//! ranges: each maximal stretch of consecutive frames that landed in the
//! same grid cell becomes one run.

use crate::grid::{CellId, Grid, Point};
use log::info;

/// An inclusive range of frame indices spent in one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRun {
    /// First frame of the run.
    pub start: usize,
    /// Last frame of the run, inclusive.
    pub end: usize,
}

/// The per-cell run lists for a whole series, indexed by `(row, col)`.
///
/// Runs within a cell are in temporal order and disjoint; across the
/// whole grid no frame index is claimed by more than one run. Frames
/// that fell outside the grid belong to no run.
#[derive(Debug, Clone, PartialEq)]
pub struct Segmentation {
    rows: usize,
    cols: usize,
    runs: Vec<Vec<Vec<FrameRun>>>,
}

impl Segmentation {
    fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            runs: vec![vec![Vec::new(); cols]; rows],
        }
    }

    fn push(&mut self, cell: CellId, run: FrameRun) {
        self.runs[cell.0][cell.1].push(run);
    }

    /// The ordered runs recorded for one cell.
    pub fn runs(&self, cell: CellId) -> &[FrameRun] {
        &self.runs[cell.0][cell.1]
    }

    /// Grid shape this segmentation was built for.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Iterates cells in reading order together with their runs.
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellId, &[FrameRun])> {
        self.runs.iter().enumerate().flat_map(|(row, cols)| {
            cols.iter()
                .enumerate()
                .map(move |(col, runs)| ((row, col), runs.as_slice()))
        })
    }
}

/// Walks the series in temporal order and merges consecutive same-cell
/// samples into runs.
///
/// A sample that falls outside the grid closes the current run; when the
/// marker later re-enters a cell (even the same one), a fresh run opens.
/// Keeping the run open across the gap would merge temporally separate
/// visits, which would smear their audio together downstream.
pub fn segment_track(xs: &[f64], ys: &[f64], grid: &Grid) -> Segmentation {
    assert_eq!(xs.len(), ys.len());

    let mut segmentation = Segmentation::new(grid.rows(), grid.cols());
    // the open run, if any: which cell, and its frame range so far
    let mut open: Option<(CellId, FrameRun)> = None;

    for (index, (&x, &y)) in xs.iter().zip(ys).enumerate() {
        let located = grid.locate_point(Point { x, y });

        open = match (open, located) {
            (Some((cell, run)), Some(here)) if here == cell => {
                Some((cell, FrameRun { end: index, ..run }))
            }
            (Some((cell, run)), here) => {
                segmentation.push(cell, run);
                here.map(|c| {
                    (
                        c,
                        FrameRun {
                            start: index,
                            end: index,
                        },
                    )
                })
            }
            (None, here) => here.map(|c| {
                (
                    c,
                    FrameRun {
                        start: index,
                        end: index,
                    },
                )
            }),
        };
    }

    if let Some((cell, run)) = open {
        segmentation.push(cell, run);
    }

    for (cell, runs) in segmentation.iter_cells() {
        info!("cell {:?} -> {:?}", cell, runs);
    }

    segmentation
}
