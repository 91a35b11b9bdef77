//! Sub-windows and 1-D strip reductions.
//!
//! Strips collapse a 2-D patch onto one axis so the 1-D flow estimator can
//! run on a row or column profile instead of the full neighborhood.

use super::{Image, ImageError};

impl<P: Copy> Image<P> {
    /// Copies out a `rows x cols` block starting at (`row`, `col`).
    pub fn subwindow(
        &self,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Image<P>, ImageError> {
        if row + rows > self.rows || col + cols > self.cols {
            return Err(ImageError::SubwindowOutOfBounds {
                row,
                col,
                rows,
                cols,
                image_rows: self.rows,
                image_cols: self.cols,
            });
        }

        let mut pixels = Vec::with_capacity(rows * cols);
        for r in row..row + rows {
            let start = r * self.cols + col;
            pixels.extend_from_slice(&self.pixels[start..start + cols]);
        }
        Ok(Image { pixels, rows, cols })
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Image<P> {
        let mut pixels = Vec::with_capacity(self.pixels.len());
        for c in 0..self.cols {
            for r in 0..self.rows {
                pixels.push(self.pixels[r * self.cols + c]);
            }
        }
        Image {
            pixels,
            rows: self.cols,
            cols: self.rows,
        }
    }
}

impl<P: Copy + Into<i64>> Image<P> {
    /// Sums each row, giving a vertical profile of length `rows()`.
    pub fn row_sums(&self) -> Vec<i64> {
        self.pixels
            .chunks(self.cols.max(1))
            .take(self.rows)
            .map(|row| row.iter().map(|&p| p.into()).sum())
            .collect()
    }

    /// Sums each column, giving a horizontal profile of length `cols()`.
    pub fn column_sums(&self) -> Vec<i64> {
        let mut sums = vec![0i64; self.cols];
        for row in self.pixels.chunks(self.cols.max(1)).take(self.rows) {
            for (sum, &p) in sums.iter_mut().zip(row) {
                *sum += p.into();
            }
        }
        sums
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> Image<u16> {
        Image::from_fn(4, 5, |r, c| (r * 10 + c) as u16)
    }

    #[test]
    fn test_subwindow_copies_block() {
        let sub = ramp().subwindow(1, 2, 2, 3).unwrap();

        assert_eq!(sub.rows(), 2);
        assert_eq!(sub.cols(), 3);
        assert_eq!(sub.pixels(), &[12, 13, 14, 22, 23, 24]);
    }

    #[test]
    fn test_subwindow_out_of_bounds() {
        assert!(matches!(
            ramp().subwindow(3, 0, 2, 1),
            Err(ImageError::SubwindowOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_transpose() {
        let t = ramp().transpose();
        assert_eq!(t.rows(), 5);
        assert_eq!(t.cols(), 4);
        assert_eq!(t.get(3, 2), Some(23));
        assert_eq!(t.transpose(), ramp());
    }

    #[test]
    fn test_row_and_column_sums() {
        let image = ramp();

        assert_eq!(image.row_sums(), vec![10, 60, 110, 160]);
        assert_eq!(image.column_sums(), vec![60, 64, 68, 72, 76]);
    }

    #[test]
    fn test_sums_of_signed_image() {
        let image = Image::new(vec![-2i32, 5, 1, -1], 2, 2).unwrap();
        assert_eq!(image.row_sums(), vec![3, 0]);
        assert_eq!(image.column_sums(), vec![-1, 4]);
    }
}
