//! Temporal high-pass filtering.
//!
//! Removes slowly varying illumination so flow is computed on texture only.

use super::{Image, ImageError};
use crate::Pixel;

/// Fractional bits carried by the low-pass state.
const STATE_SHIFT: u32 = 4;

/// Per-pixel first-order temporal high-pass.
///
/// Keeps a fixed-point low-pass image with four fractional bits. Each call
/// moves the low-pass toward the input by `1 / 2^shift_alpha` and returns
/// `input - lowpass`.
#[derive(Debug, Clone)]
pub struct HighPassFilter {
    shift_alpha: u32,
    low: Option<Image<i32>>,
}

impl HighPassFilter {
    /// Creates a filter with the given smoothing shift (larger is slower).
    pub fn new(shift_alpha: u32) -> Self {
        Self {
            shift_alpha: shift_alpha.min(15),
            low: None,
        }
    }

    /// Filters one frame, returning the high-pass image.
    ///
    /// The first frame seeds the low-pass with zeros, like a freshly cleared
    /// buffer on the chip host. A frame with different dimensions restarts
    /// the filter.
    pub fn apply(&mut self, input: &Image<Pixel>) -> Result<Image<i32>, ImageError> {
        let low = match self.low.take() {
            Some(low) if low.same_shape(input) => low,
            _ => Image::filled(0, input.rows(), input.cols()),
        };

        let mut low_pixels = low.into_pixels();
        let mut high = Vec::with_capacity(input.len());
        for (l, &p) in low_pixels.iter_mut().zip(input.pixels()) {
            let p = i32::from(p);
            let diff = (p << STATE_SHIFT) - *l;
            *l += diff >> self.shift_alpha;
            high.push(p - (*l >> STATE_SHIFT));
        }

        self.low = Some(Image::new(low_pixels, input.rows(), input.cols())?);
        Image::new(high, input.rows(), input.cols())
    }

    /// Forgets the low-pass state.
    pub fn reset(&mut self) {
        self.low = None;
    }
}

impl Default for HighPassFilter {
    fn default() -> Self {
        Self::new(3)
    }
}
