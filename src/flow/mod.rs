//! Optical flow between successive frames.
//!
//! All estimators work in integer arithmetic: `scale` multiplies the
//! numerator before the final division so that sub-pixel motion survives
//! as a fixed-point result. Spatial differentials run along increasing
//! row/column index and the temporal one is `previous - current`, so
//! motion toward higher indices gives positive flow in every estimator.
//!
//! # Units
//!
//! Spatial differentials span two pixels. IIA doubles its result to undo
//! that and reports in units of `1 / scale` pixel. Least squares keeps the
//! bare normal-equation solve and reports in units of `2 / scale` pixel,
//! so the same motion reads half as large. A half-pixel shift at scale 100
//! comes out near 50 from IIA and near 25 from least squares.
//!
//! Estimators are pure functions of their inputs and may run in parallel
//! on independent frames.

mod filter;
mod gradient;
mod iia;
mod least_squares;
mod odometry;

pub use filter::{low_pass, LowPass, ThresholdAccumulator};
pub use iia::{iia_1d, iia_2d, MIN_STRIP};
pub use least_squares::least_squares_2d;
pub use odometry::{Odometry, OdometryStep};

use crate::image::Image;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from flow estimation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    /// The two frames differ in shape.
    #[error("current frame is {current:?} but previous is {previous:?}")]
    ShapeMismatch {
        /// `(rows, cols)` of the current frame.
        current: (usize, usize),
        /// `(rows, cols)` of the previous frame.
        previous: (usize, usize),
    },
    /// The frame is smaller than the neighborhood.
    #[error("{rows}x{cols} frame is smaller than the {min}x{min} neighborhood")]
    TooSmall {
        /// Frame height.
        rows: usize,
        /// Frame width.
        cols: usize,
        /// Smallest side accepted.
        min: usize,
    },
    /// Low-pass weight outside `[0, 1]`.
    #[error("low-pass alpha {0} outside [0, 1]")]
    InvalidAlpha(f32),
    /// Zero fixed-point scale.
    #[error("flow scale must be non-zero")]
    ZeroScale,
}

/// Displacement between two frames, in fixed point.
///
/// IIA samples are in units of `1 / scale` pixel, least-squares samples in
/// units of `2 / scale` pixel (see the [module docs](crate::flow#units)).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowSample {
    /// Motion toward higher column index.
    pub dx: i32,
    /// Motion toward higher row index.
    pub dy: i32,
}

impl FlowSample {
    /// No motion.
    pub const ZERO: FlowSample = FlowSample { dx: 0, dy: 0 };
}

/// Pixel neighborhood used for spatial differentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Neighborhood {
    /// Left/right and up/down neighbours of each interior pixel.
    #[default]
    Plus,
    /// The four corners of each 2x2 block.
    Square,
}

impl Neighborhood {
    /// Smallest frame side the neighborhood fits in.
    pub fn min_size(self) -> usize {
        match self {
            Neighborhood::Plus => 3,
            Neighborhood::Square => 2,
        }
    }
}

/// Estimator family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Algorithm {
    /// Image interpolation algorithm.
    Iia,
    /// Gradient least squares. Reports half the IIA value for the same motion.
    #[default]
    LeastSquares,
}

/// Flow settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Estimator family.
    pub algorithm: Algorithm,
    /// Differential stencil.
    pub neighborhood: Neighborhood,
    /// Fixed-point multiplier applied before division. One output count is
    /// `1 / scale` pixel for IIA and `2 / scale` pixel for least squares.
    pub scale: u16,
    /// Low-pass weight of the newest sample.
    pub alpha: f32,
    /// Accumulator noise gate, in flow units.
    pub threshold: u16,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::LeastSquares,
            neighborhood: Neighborhood::Plus,
            scale: 100,
            alpha: 0.5,
            threshold: 2,
        }
    }
}

impl FlowConfig {
    /// Validates the flow parameters.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.scale == 0 {
            return Err(FlowError::ZeroScale);
        }
        LowPass::new(self.alpha)?;
        Ok(())
    }
}

/// A configured 2-D estimator.
///
/// Output units follow the algorithm: `1 / scale` pixel for IIA,
/// `2 / scale` pixel for least squares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowEstimator {
    algorithm: Algorithm,
    neighborhood: Neighborhood,
    scale: u16,
}

impl FlowEstimator {
    /// An estimator with explicit settings.
    pub fn new(algorithm: Algorithm, neighborhood: Neighborhood, scale: u16) -> Self {
        Self {
            algorithm,
            neighborhood,
            scale,
        }
    }

    /// Takes algorithm, neighborhood and scale from `config`.
    pub fn from_config(config: &FlowConfig) -> Self {
        Self::new(config.algorithm, config.neighborhood, config.scale)
    }

    /// Estimates flow from `previous` to `current`.
    pub fn estimate<P: Copy + Into<i64>>(
        &self,
        current: &Image<P>,
        previous: &Image<P>,
    ) -> Result<FlowSample, FlowError> {
        match self.algorithm {
            Algorithm::Iia => iia_2d(current, previous, self.neighborhood, self.scale),
            Algorithm::LeastSquares => {
                least_squares_2d(current, previous, self.neighborhood, self.scale)
            }
        }
    }
}

impl Default for FlowEstimator {
    fn default() -> Self {
        Self::from_config(&FlowConfig::default())
    }
}

#[cfg(test)]
pub(crate) mod test_scenes {
    //! Smooth synthetic frames with exact integer half-pixel shifts.

    use crate::image::Image;

    /// Paraboloid `2 * ((2c - (cols-1))^2 + (2r - (rows-1))^2)` centred on the frame.
    pub fn bowl(rows: usize, cols: usize) -> Image<u16> {
        Image::from_fn(rows, cols, |r, c| {
            let a = 2 * c as i64 - (cols as i64 - 1);
            let b = 2 * r as i64 - (rows as i64 - 1);
            (2 * (a * a + b * b)) as u16
        })
    }

    /// [`bowl`] moved half a pixel toward higher column index.
    pub fn shifted_bowl(rows: usize, cols: usize) -> Image<u16> {
        Image::from_fn(rows, cols, |r, c| {
            let a = 2 * c as i64 - cols as i64;
            let b = 2 * r as i64 - (rows as i64 - 1);
            (2 * (a * a + b * b)) as u16
        })
    }
}
