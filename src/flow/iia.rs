//! Image interpolation algorithm.
//!
//! Srinivasan-style flow: the current frame is modelled as the previous
//! frame interpolated between copies shifted one pixel either way, and the
//! interpolation weight is recovered by least squares. The spatial
//! differentials span two pixels, hence the factor of two in the output.
//!
//! A textureless window has a zero denominator. Both variants report zero
//! flow for it instead of dividing.

use super::gradient::{accumulate, check_frames, saturate};
use super::{FlowError, FlowSample, Neighborhood};
use crate::image::Image;

/// Shortest strip the 1-D estimator accepts.
pub const MIN_STRIP: usize = 3;

/// Flow along a 1-D strip, in units of `1 / scale` pixel.
pub fn iia_1d<P: Copy + Into<i64>>(
    current: &[P],
    previous: &[P],
    scale: u16,
) -> Result<i32, FlowError> {
    if current.len() != previous.len() {
        return Err(FlowError::ShapeMismatch {
            current: (1, current.len()),
            previous: (1, previous.len()),
        });
    }
    if current.len() < MIN_STRIP {
        return Err(FlowError::TooSmall {
            rows: 1,
            cols: current.len(),
            min: MIN_STRIP,
        });
    }

    let mut top: i64 = 0;
    let mut bottom: i64 = 0;
    for i in 1..current.len() - 1 {
        let dx = current[i + 1].into() - current[i - 1].into();
        let dt = previous[i].into() - current[i].into();
        top += dt * dx;
        bottom += dx * dx;
    }

    if bottom == 0 {
        tracing::debug!("Flat strip, reporting zero flow");
        return Ok(0);
    }
    Ok(saturate(
        2 * i128::from(scale) * i128::from(top) / i128::from(bottom),
    ))
}

/// 2-D flow over a whole window, in units of `1 / scale` pixel.
pub fn iia_2d<P: Copy + Into<i64>>(
    current: &Image<P>,
    previous: &Image<P>,
    shape: Neighborhood,
    scale: u16,
) -> Result<FlowSample, FlowError> {
    check_frames(current, previous, shape)?;

    let sums = accumulate(current, previous, shape);
    let (top_x, top_y, bottom) = sums.solve_terms();
    if bottom == 0 {
        tracing::debug!(?shape, "Degenerate window, reporting zero flow");
        return Ok(FlowSample::ZERO);
    }

    let scale = 2 * i128::from(scale);
    Ok(FlowSample {
        dx: saturate(scale * top_x / bottom),
        dy: saturate(scale * top_y / bottom),
    })
}
