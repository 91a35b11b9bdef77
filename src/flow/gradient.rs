//! Spatial/temporal gradient sums shared by the 2-D estimators.

use super::{FlowError, Neighborhood};
use crate::image::Image;

/// Five running sums over a window.
///
/// `x` and `y` are the horizontal and vertical spatial differentials, `t`
/// the temporal one (`previous - current`). Spatial differentials point
/// along increasing column/row index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GradientSums {
    pub xx: i64,
    pub xy: i64,
    pub yy: i64,
    pub xt: i64,
    pub yt: i64,
}

impl GradientSums {
    fn add(&mut self, x: i64, y: i64, t: i64) {
        self.xx += x * x;
        self.xy += y * x;
        self.yy += y * y;
        self.xt += t * x;
        self.yt += t * y;
    }

    /// Numerators and denominator of the 2x2 normal-equation solve.
    ///
    /// Returns `(top_x, top_y, bottom)` in 128 bits so products of full
    /// 64-bit sums cannot overflow.
    pub fn solve_terms(&self) -> (i128, i128, i128) {
        let (xx, xy, yy, xt, yt) = (
            i128::from(self.xx),
            i128::from(self.xy),
            i128::from(self.yy),
            i128::from(self.xt),
            i128::from(self.yt),
        );
        let top_x = xt * yy - yt * xy;
        let top_y = yt * xx - xt * xy;
        let bottom = xx * yy - xy * xy;
        (top_x, top_y, bottom)
    }
}

/// Checks both frames share a shape large enough for `shape`.
pub(crate) fn check_frames<P>(
    current: &Image<P>,
    previous: &Image<P>,
    shape: Neighborhood,
) -> Result<(), FlowError> {
    if !current.same_shape(previous) {
        return Err(FlowError::ShapeMismatch {
            current: (current.rows(), current.cols()),
            previous: (previous.rows(), previous.cols()),
        });
    }
    let min = shape.min_size();
    if current.rows() < min || current.cols() < min {
        return Err(FlowError::TooSmall {
            rows: current.rows(),
            cols: current.cols(),
            min,
        });
    }
    Ok(())
}

/// Accumulates gradient sums over every position `shape` fits.
///
/// `Plus` uses the four direct neighbours of each interior pixel, so the
/// outer ring is skipped. `Square` uses each 2x2 block, with the temporal
/// differential taken at the block's top-left pixel.
///
/// Differentials are right minus left and down minus up. The classic C
/// flow routines name theirs `F2F1`/`F4F3` and take left minus right, so
/// their 2-D results carry the opposite sign to these.
pub(crate) fn accumulate<P: Copy + Into<i64>>(
    current: &Image<P>,
    previous: &Image<P>,
    shape: Neighborhood,
) -> GradientSums {
    let cols = current.cols();
    let cur = current.pixels();
    let prev = previous.pixels();
    let at = |buf: &[P], r: usize, c: usize| -> i64 { buf[r * cols + c].into() };

    let mut sums = GradientSums::default();
    match shape {
        Neighborhood::Plus => {
            for r in 1..current.rows() - 1 {
                for c in 1..cols - 1 {
                    let x = at(cur, r, c + 1) - at(cur, r, c - 1);
                    let y = at(cur, r + 1, c) - at(cur, r - 1, c);
                    let t = at(prev, r, c) - at(cur, r, c);
                    sums.add(x, y, t);
                }
            }
        }
        Neighborhood::Square => {
            for r in 0..current.rows() - 1 {
                for c in 0..cols - 1 {
                    let tl = at(cur, r, c);
                    let tr = at(cur, r, c + 1);
                    let bl = at(cur, r + 1, c);
                    let br = at(cur, r + 1, c + 1);
                    let x = (tr - tl) + (br - bl);
                    let y = (bl - tl) + (br - tr);
                    let t = at(prev, r, c) - tl;
                    sums.add(x, y, t);
                }
            }
        }
    }
    sums
}

/// Clamps a wide intermediate into the output range.
pub(crate) fn saturate(value: i128) -> i32 {
    value.clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_differentials_point_along_increasing_index() {
        // Brightness grows to the right and downward
        let cur = Image::from_fn(3, 3, |r, c| (100 * r + 10 * c) as u16);
        let prev = Image::from_fn(3, 3, |r, c| (100 * r + 10 * c + 5) as u16);
        let sums = accumulate(&cur, &prev, Neighborhood::Plus);

        // One interior pixel: x = 20, y = 200, t = 5
        assert_eq!(sums.xx, 400);
        assert_eq!(sums.yy, 40_000);
        assert_eq!(sums.xy, 4_000);
        assert_eq!(sums.xt, 100);
        assert_eq!(sums.yt, 1_000);
    }

    #[test]
    fn test_plus_skips_border() {
        // Horizontal ramp: x differential is 2 everywhere inside
        let cur = Image::from_fn(4, 5, |_, c| c as u16 * 10);
        let sums = accumulate(&cur, &cur, Neighborhood::Plus);

        // 2 x 3 interior pixels, each x = 20
        assert_eq!(sums.xx, 6 * 400);
        assert_eq!(sums.yy, 0);
        assert_eq!(sums.xt, 0);
    }

    #[test]
    fn test_square_covers_blocks() {
        let cur = Image::from_fn(3, 3, |r, _| r as u16 * 5);
        let prev = Image::from_fn(3, 3, |r, _| r as u16 * 5 + 1);
        let sums = accumulate(&cur, &prev, Neighborhood::Square);

        // 4 blocks, y = 10, t = 1
        assert_eq!(sums.yy, 4 * 100);
        assert_eq!(sums.yt, 4 * 10);
        assert_eq!(sums.xx, 0);
    }

    #[test]
    fn test_check_frames() {
        let a = Image::filled(0u16, 3, 3);
        let b = Image::filled(0u16, 3, 4);
        assert!(matches!(
            check_frames(&a, &b, Neighborhood::Plus),
            Err(FlowError::ShapeMismatch { .. })
        ));

        let small = Image::filled(0u16, 2, 2);
        assert!(check_frames(&small, &small, Neighborhood::Square).is_ok());
        assert!(matches!(
            check_frames(&small, &small, Neighborhood::Plus),
            Err(FlowError::TooSmall { min: 3, .. })
        ));
    }

    #[test]
    fn test_saturate() {
        assert_eq!(saturate(5), 5);
        assert_eq!(saturate(i128::from(i64::MAX)), i32::MAX);
        assert_eq!(saturate(-i128::from(i64::MAX)), i32::MIN);
    }
}
