//! Fixed-pattern-noise mask.

use super::CalibrationError;
use crate::image::Image;
use crate::Pixel;

/// Per-pixel offsets captured under uniform illumination.
///
/// `base` is the darkest reading of the calibration frame and each mask
/// entry is how far that pixel sat above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FpnMask {
    mask: Vec<u8>,
    base: Pixel,
}

impl FpnMask {
    /// Builds a mask from a uniformly illuminated capture.
    ///
    /// Fails if a pixel sits more than 255 counts above the minimum, which
    /// means the frame was not uniformly lit.
    pub fn capture(image: &Image<Pixel>) -> Result<Self, CalibrationError> {
        let base = image.min().ok_or(CalibrationError::EmptyImage)?;

        let mask = image
            .pixels()
            .iter()
            .enumerate()
            .map(|(index, &p)| {
                let spread = p - base;
                u8::try_from(spread).map_err(|_| CalibrationError::MaskOverflow { index, spread })
            })
            .collect::<Result<Vec<u8>, _>>()?;

        tracing::info!(base, pixels = mask.len(), "FPN mask captured");
        Ok(Self { mask, base })
    }

    /// Wraps a stored mask and base.
    pub fn from_parts(mask: Vec<u8>, base: Pixel) -> Self {
        Self { mask, base }
    }

    /// Corrects a raw image: `-(raw - base - mask)` per pixel.
    ///
    /// The sign flip turns the chip's inverted output into brightness, so
    /// brighter pixels come out larger.
    pub fn apply(&self, image: &Image<Pixel>) -> Result<Image<i32>, CalibrationError> {
        if image.len() != self.mask.len() {
            return Err(CalibrationError::LengthMismatch {
                mask: self.mask.len(),
                image: image.len(),
            });
        }

        let base = i32::from(self.base);
        let pixels = image
            .pixels()
            .iter()
            .zip(&self.mask)
            .map(|(&p, &m)| -(i32::from(p) - base - i32::from(m)))
            .collect();
        Ok(Image::from_raw(pixels, image.rows(), image.cols()))
    }

    /// Per-pixel offsets.
    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    /// Darkest reading of the calibration frame.
    pub fn base(&self) -> Pixel {
        self.base
    }

    /// Number of pixels covered.
    pub fn len(&self) -> usize {
        self.mask.len()
    }

    /// Returns true if the mask covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_capture_finds_base() {
        let image = Image::new(vec![110u16, 100, 105, 130], 2, 2).unwrap();
        let mask = FpnMask::capture(&image).unwrap();

        assert_eq!(mask.base(), 100);
        assert_eq!(mask.mask(), &[10, 0, 5, 30]);
    }

    #[test]
    fn test_apply_flips_sign() {
        let mask = FpnMask::from_parts(vec![10, 0, 5, 30], 100);
        let raw = Image::new(vec![100u16, 90, 200, 130], 2, 2).unwrap();

        let out = mask.apply(&raw).unwrap();
        assert_eq!(out.pixels(), &[10, 10, -95, 0]);
    }

    #[test]
    fn test_length_mismatch() {
        let mask = FpnMask::from_parts(vec![0; 4], 0);
        let raw = Image::filled(0u16, 3, 3);

        assert!(matches!(
            mask.apply(&raw),
            Err(CalibrationError::LengthMismatch { mask: 4, image: 9 })
        ));
    }

    #[test]
    fn test_non_uniform_frame_rejected() {
        let image = Image::new(vec![0u16, 300], 1, 2).unwrap();
        assert!(matches!(
            FpnMask::capture(&image),
            Err(CalibrationError::MaskOverflow { index: 1, spread: 300 })
        ));
    }

    #[test]
    fn test_empty_frame_rejected() {
        let image = Image::<Pixel>::filled(0, 0, 4);
        assert!(matches!(
            FpnMask::capture(&image),
            Err(CalibrationError::EmptyImage)
        ));
    }

    proptest! {
        #[test]
        fn prop_mask_cancels_its_own_frame(
            base in 0u16..700,
            offsets in prop::collection::vec(0u16..=255, 1..64),
        ) {
            let pixels: Vec<Pixel> = offsets.iter().map(|&o| base + o).collect();
            let image = Image::new(pixels, 1, offsets.len()).unwrap();

            let mask = FpnMask::capture(&image).unwrap();
            let out = mask.apply(&image).unwrap();
            prop_assert!(out.pixels().iter().all(|&v| v == 0));
        }

        #[test]
        fn prop_apply_is_exact(
            raw in prop::collection::vec(0u16..=1023, 16),
            offsets in prop::collection::vec(any::<u8>(), 16),
            base in 0u16..=1023,
        ) {
            let mask = FpnMask::from_parts(offsets.clone(), base);
            let image = Image::new(raw.clone(), 4, 4).unwrap();
            let out = mask.apply(&image).unwrap();

            for i in 0..16 {
                let expected = -(i32::from(raw[i]) - i32::from(base) - i32::from(offsets[i]));
                prop_assert_eq!(out.pixels()[i], expected);
            }
        }
    }
}
