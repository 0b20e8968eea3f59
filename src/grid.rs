// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The result grid: the only thing the engine hands back.

use std::slice::Chunks;

/// Marks a cell whose evaluation was abandoned.  Never a valid
/// iteration count, since the engine refuses `max_iter == u32::MAX`.
pub const CANCELLED: u32 = ::std::u32::MAX;

/// Escape iteration counts, one per sample, row-major with row 0 at
/// the bottom of the window.  A cell equal to `max_iter` never
/// escaped; a cell equal to `CANCELLED` was never finished.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultGrid {
    width: usize,
    height: usize,
    max_iter: u32,
    cells: Vec<u32>,
}

impl ResultGrid {
    pub(crate) fn new(width: usize, height: usize, max_iter: u32, cells: Vec<u32>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        ResultGrid {
            width,
            height,
            max_iter,
            cells,
        }
    }

    /// Columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The iteration budget the grid was computed with; renderers
    /// normalize against it.
    pub fn max_iter(&self) -> u32 {
        self.max_iter
    }

    /// The value at a cell, or `None` off the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<u32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(self.cells[row * self.width + col])
    }

    /// One row of cells.
    pub fn row(&self, row: usize) -> &[u32] {
        &self.cells[row * self.width..(row + 1) * self.width]
    }

    /// Rows from the bottom of the window to the top.
    pub fn rows(&self) -> Chunks<u32> {
        self.cells.chunks(self.width)
    }

    /// Every cell, row-major.
    pub fn as_slice(&self) -> &[u32] {
        &self.cells
    }

    /// Hands over the cells.
    pub fn into_vec(self) -> Vec<u32> {
        self.cells
    }

    /// Cells that never escaped.
    pub fn bounded_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == self.max_iter).count()
    }

    /// Cells abandoned by cancellation.
    pub fn cancelled_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v == CANCELLED).count()
    }

    /// True when every cell holds a real iteration count.
    pub fn is_complete(&self) -> bool {
        !self.cells.contains(&CANCELLED)
    }
}
