//! Gradient least-squares flow (Lucas-Kanade style).
//!
//! Assumes a single displacement for the whole window and solves the 2x2
//! normal equations of the brightness-constancy constraint.
//!
//! The differentials span two pixels and the solve is not doubled, so one
//! output count is `2 / scale` pixel: a shift of `s` pixels reads as
//! `s * scale / 2`.

use super::gradient::{accumulate, check_frames, saturate};
use super::{FlowError, FlowSample, Neighborhood};
use crate::image::Image;

/// 2-D flow over a whole window, in units of `2 / scale` pixel.
///
/// A singular normal matrix (textureless window, or texture along a single
/// direction) yields exactly zero flow.
pub fn least_squares_2d<P: Copy + Into<i64>>(
    current: &Image<P>,
    previous: &Image<P>,
    shape: Neighborhood,
    scale: u16,
) -> Result<FlowSample, FlowError> {
    check_frames(current, previous, shape)?;

    let sums = accumulate(current, previous, shape);
    // A11 = xx, A12 = xy, A22 = yy, b1 = xt, b2 = yt
    let (top_x, top_y, det) = sums.solve_terms();
    if det == 0 {
        tracing::debug!(?shape, "Singular normal matrix, reporting zero flow");
        return Ok(FlowSample::ZERO);
    }

    let scale = i128::from(scale);
    Ok(FlowSample {
        dx: saturate(top_x * scale / det),
        dy: saturate(top_y * scale / det),
    })
}
