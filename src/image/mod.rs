//! Images produced by a scan.
//!
//! An [`Image`] is a row-major buffer of samples with its dimensions.
//! Raw captures hold [`Pixel`](crate::Pixel)s; calibrated images hold signed
//! samples because fixed-pattern correction flips polarity.

mod filter;
mod ops;

pub use filter::HighPassFilter;

use thiserror::Error;

/// Errors from image construction and slicing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// Buffer length does not match `rows * cols`.
    #[error("pixel buffer holds {actual} samples, dimensions need {expected}")]
    DimensionMismatch {
        /// `rows * cols`.
        expected: usize,
        /// Buffer length supplied.
        actual: usize,
    },
    /// Requested block runs past the image edge.
    #[error("sub-window {rows}x{cols} at ({row}, {col}) exceeds {image_rows}x{image_cols} image")]
    SubwindowOutOfBounds {
        /// Top row of the block.
        row: usize,
        /// Left column of the block.
        col: usize,
        /// Block height.
        rows: usize,
        /// Block width.
        cols: usize,
        /// Source image height.
        image_rows: usize,
        /// Source image width.
        image_cols: usize,
    },
}

/// A row-major image.
#[derive(Clone, PartialEq, Eq)]
pub struct Image<P = crate::Pixel> {
    pixels: Vec<P>,
    rows: usize,
    cols: usize,
}

impl<P> Image<P> {
    /// Wraps a pixel buffer, checking it matches `rows * cols`.
    pub fn new(pixels: Vec<P>, rows: usize, cols: usize) -> Result<Self, ImageError> {
        let expected = rows * cols;
        if pixels.len() != expected {
            return Err(ImageError::DimensionMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { pixels, rows, cols })
    }

    /// Wraps a buffer already known to be `rows * cols` long.
    pub(crate) fn from_raw(pixels: Vec<P>, rows: usize, cols: usize) -> Self {
        debug_assert_eq!(pixels.len(), rows * cols);
        Self { pixels, rows, cols }
    }

    /// Returns the pixels in row-major order.
    #[inline]
    pub fn pixels(&self) -> &[P] {
        &self.pixels
    }

    /// Returns the pixels mutably.
    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [P] {
        &mut self.pixels
    }

    /// Number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Returns true if the image has no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns true if both images have the same dimensions.
    pub fn same_shape<Q>(&self, other: &Image<Q>) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Consumes the image, returning its buffer.
    pub fn into_pixels(self) -> Vec<P> {
        self.pixels
    }
}

impl<P: Copy> Image<P> {
    /// Creates an image with every pixel set to `value`.
    pub fn filled(value: P, rows: usize, cols: usize) -> Self {
        Self {
            pixels: vec![value; rows * cols],
            rows,
            cols,
        }
    }

    /// Builds an image from a function of (row, col).
    pub fn from_fn(rows: usize, cols: usize, mut f: impl FnMut(usize, usize) -> P) -> Self {
        let mut pixels = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                pixels.push(f(r, c));
            }
        }
        Self { pixels, rows, cols }
    }

    /// Pixel at (row, col), if inside the image.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<P> {
        if row < self.rows && col < self.cols {
            Some(self.pixels[row * self.cols + col])
        } else {
            None
        }
    }

    /// Returns one row as a slice.
    pub fn row(&self, row: usize) -> Option<&[P]> {
        if row < self.rows {
            Some(&self.pixels[row * self.cols..(row + 1) * self.cols])
        } else {
            None
        }
    }
}

impl<P: Copy + Ord> Image<P> {
    /// Smallest pixel value.
    pub fn min(&self) -> Option<P> {
        self.pixels.iter().copied().min()
    }

    /// Largest pixel value.
    pub fn max(&self) -> Option<P> {
        self.pixels.iter().copied().max()
    }
}

impl<P> std::fmt::Debug for Image<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("pixels", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_creation() {
        let image = Image::new(vec![0u16; 12], 3, 4).unwrap();

        assert_eq!(image.rows(), 3);
        assert_eq!(image.cols(), 4);
        assert_eq!(image.len(), 12);
    }

    #[test]
    fn test_image_invalid_size() {
        let result = Image::new(vec![0u16; 10], 3, 4);
        assert_eq!(
            result.unwrap_err(),
            ImageError::DimensionMismatch {
                expected: 12,
                actual: 10
            }
        );
    }

    #[test]
    fn test_indexing_is_row_major() {
        let image = Image::from_fn(2, 3, |r, c| (r * 10 + c) as u16);

        assert_eq!(image.pixels(), &[0, 1, 2, 10, 11, 12]);
        assert_eq!(image.get(1, 2), Some(12));
        assert_eq!(image.get(2, 0), None);
        assert_eq!(image.row(1), Some(&[10u16, 11, 12][..]));
    }

    #[test]
    fn test_min_max() {
        let image = Image::new(vec![5u16, 3, 9, 7], 2, 2).unwrap();
        assert_eq!(image.min(), Some(3));
        assert_eq!(image.max(), Some(9));
        assert_eq!(Image::<u16>::filled(0, 0, 0).min(), None);
    }
}
