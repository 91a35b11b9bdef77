//! Rectangular, strided scan regions.

use super::ScanError;
use crate::chip::GRID_SIZE;
use serde::{Deserialize, Serialize};

/// Axis of the pixel array, used in error reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Rows, addressed by ROWSEL.
    Row,
    /// Columns, addressed by COLSEL.
    Col,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => f.write_str("row"),
            Axis::Col => f.write_str("column"),
        }
    }
}

/// The sub-region of the chip a scan reads.
///
/// Coordinates are physical chip addresses. A stride above one skips
/// pixels, which pairs with on-chip binning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanWindow {
    /// First physical row.
    pub row_start: u8,
    /// Rows read.
    pub row_count: u8,
    /// Physical rows advanced between reads.
    pub row_stride: u8,
    /// First physical column.
    pub col_start: u8,
    /// Columns read.
    pub col_count: u8,
    /// Physical columns advanced between reads.
    pub col_stride: u8,
}

impl Default for ScanWindow {
    /// The full pixel array at stride one.
    fn default() -> Self {
        Self::full()
    }
}

impl ScanWindow {
    /// The full pixel array at stride one.
    pub const fn full() -> Self {
        Self {
            row_start: 0,
            row_count: GRID_SIZE,
            row_stride: 1,
            col_start: 0,
            col_count: GRID_SIZE,
            col_stride: 1,
        }
    }

    /// A window with the same layout on both axes.
    pub const fn square(start: u8, count: u8, stride: u8) -> Self {
        Self {
            row_start: start,
            row_count: count,
            row_stride: stride,
            col_start: start,
            col_count: count,
            col_stride: stride,
        }
    }

    /// A single physical pixel.
    pub const fn pixel(row: u8, col: u8) -> Self {
        Self {
            row_start: row,
            row_count: 1,
            row_stride: 1,
            col_start: col,
            col_count: 1,
            col_stride: 1,
        }
    }

    /// Number of pixels the window covers.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        usize::from(self.row_count) * usize::from(self.col_count)
    }

    /// Physical row address of window row `index`.
    #[inline]
    pub fn chip_row(&self, index: u8) -> u16 {
        u16::from(self.row_start) + u16::from(index) * u16::from(self.row_stride)
    }

    /// Physical column address of window column `index`.
    #[inline]
    pub fn chip_col(&self, index: u8) -> u16 {
        u16::from(self.col_start) + u16::from(index) * u16::from(self.col_stride)
    }

    /// Checks the window is non-empty and stays on the pixel array.
    ///
    /// The traversal leaves each counter at `start + count * stride`, so that
    /// is the bound checked against the grid.
    pub fn validate(&self) -> Result<(), ScanError> {
        Self::check_axis(Axis::Row, self.row_start, self.row_count, self.row_stride)?;
        Self::check_axis(Axis::Col, self.col_start, self.col_count, self.col_stride)
    }

    fn check_axis(axis: Axis, start: u8, count: u8, stride: u8) -> Result<(), ScanError> {
        if count == 0 {
            return Err(ScanError::EmptyWindow(axis));
        }
        if stride == 0 {
            return Err(ScanError::ZeroStride(axis));
        }
        let end = u16::from(start) + u16::from(count) * u16::from(stride);
        if end > u16::from(GRID_SIZE) {
            return Err(ScanError::OutOfGrid {
                axis,
                start,
                count,
                stride,
            });
        }
        Ok(())
    }
}
