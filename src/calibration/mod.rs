//! Fixed-pattern-noise calibration.
//!
//! Every pixel of the chip carries a static offset. A frame taken under
//! uniform illumination records those offsets once; every later raw
//! capture is corrected against it before flow is computed.

mod mask;

pub use mask::FpnMask;

use thiserror::Error;

/// Errors from mask capture and application.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalibrationError {
    /// The calibration frame has no pixels.
    #[error("cannot calibrate from an empty frame")]
    EmptyImage,
    /// Mask and image sizes differ.
    #[error("mask covers {mask} pixels but image has {image}")]
    LengthMismatch {
        /// Pixels in the mask.
        mask: usize,
        /// Pixels in the image.
        image: usize,
    },
    /// A correction does not fit in a byte.
    #[error("pixel {index} sits {spread} counts above the frame minimum; calibration frame is not uniform")]
    MaskOverflow {
        /// Row-major pixel index.
        index: usize,
        /// Counts above the frame minimum.
        spread: u16,
    },
}
