//! Per-pixel processing policies plugged into a scan.

use crate::Pixel;

/// Right shift applied to each vector sum before it is stored.
pub const SUM_SHIFT: u32 = 4;

/// Receives pixels from a [`ScanEngine`](super::ScanEngine) traversal.
///
/// Hooks are called in a fixed order: `pre_process` once, then for each
/// outer vector `handle_vector_start`, one `handle_pixel` per inner index,
/// `handle_vector_end`; finally `post_process`. Every hook is required so a
/// consumer cannot silently skip a state reset.
///
/// `row` and `col` are window indices (not chip addresses) and keep their
/// meaning in both traversal orders, so one consumer serves both.
pub trait FrameConsumer {
    /// Resets transient state before the scan starts.
    fn pre_process(&mut self);

    /// Called before the first pixel of each outer vector.
    fn handle_vector_start(&mut self);

    /// Called once per sampled pixel.
    fn handle_pixel(&mut self, row: u8, col: u8, pixel: Pixel, amplifier: bool);

    /// Called after the last pixel of each outer vector.
    fn handle_vector_end(&mut self);

    /// Called once after the last vector.
    fn post_process(&mut self);
}

/// Stores every pixel into a row-major buffer.
#[derive(Debug)]
pub struct CaptureConsumer<'a> {
    out: &'a mut [Pixel],
    cols: usize,
    written: usize,
}

impl<'a> CaptureConsumer<'a> {
    /// Writes into `out`, which must hold `rows * cols` pixels.
    pub fn new(out: &'a mut [Pixel], cols: usize) -> Self {
        Self {
            out,
            cols,
            written: 0,
        }
    }

    /// Pixels written by the last scan.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl FrameConsumer for CaptureConsumer<'_> {
    fn pre_process(&mut self) {
        self.written = 0;
    }

    fn handle_vector_start(&mut self) {}

    fn handle_pixel(&mut self, row: u8, col: u8, pixel: Pixel, _amplifier: bool) {
        let idx = usize::from(row) * self.cols + usize::from(col);
        if let Some(slot) = self.out.get_mut(idx) {
            *slot = pixel;
            self.written += 1;
        }
    }

    fn handle_vector_end(&mut self) {}

    fn post_process(&mut self) {}
}

/// Sums each traversal vector (a row or a column, depending on order).
///
/// Each sum is stored shifted right by [`SUM_SHIFT`], approximating a mean
/// while keeping the result small.
#[derive(Debug)]
pub struct SumConsumer<'a> {
    out: &'a mut [u32],
    total: u32,
    next: usize,
}

impl<'a> SumConsumer<'a> {
    /// Writes one value per outer vector into `out`.
    pub fn new(out: &'a mut [u32]) -> Self {
        Self {
            out,
            total: 0,
            next: 0,
        }
    }
}

impl FrameConsumer for SumConsumer<'_> {
    fn pre_process(&mut self) {
        self.total = 0;
        self.next = 0;
    }

    fn handle_vector_start(&mut self) {
        self.total = 0;
    }

    fn handle_pixel(&mut self, _row: u8, _col: u8, pixel: Pixel, _amplifier: bool) {
        self.total += u32::from(pixel);
    }

    fn handle_vector_end(&mut self) {
        if let Some(slot) = self.out.get_mut(self.next) {
            *slot = self.total >> SUM_SHIFT;
        }
        self.next += 1;
    }

    fn post_process(&mut self) {}
}

/// Location of the brightest pixel found by a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brightest {
    /// Window row index.
    pub row: u8,
    /// Window column index.
    pub col: u8,
    /// Raw reading at that pixel.
    pub value: Pixel,
}

/// Tracks the brightest pixel.
///
/// The amplifier inverts the chip output: without it the brightest pixel
/// reads lowest, with it the brightest reads highest. Ties keep the first
/// pixel visited.
#[derive(Debug, Default)]
pub struct BrightestConsumer {
    best: Option<Brightest>,
}

impl BrightestConsumer {
    /// A consumer with no pixel seen yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Result of the last scan, if any pixel was visited.
    pub fn best(&self) -> Option<Brightest> {
        self.best
    }
}

impl FrameConsumer for BrightestConsumer {
    fn pre_process(&mut self) {
        self.best = None;
    }

    fn handle_vector_start(&mut self) {}

    fn handle_pixel(&mut self, row: u8, col: u8, pixel: Pixel, amplifier: bool) {
        let better = match self.best {
            None => true,
            Some(best) if amplifier => pixel > best.value,
            Some(best) => pixel < best.value,
        };
        if better {
            self.best = Some(Brightest {
                row,
                col,
                value: pixel,
            });
        }
    }

    fn handle_vector_end(&mut self) {}

    fn post_process(&mut self) {
        if let Some(best) = self.best {
            tracing::trace!(row = best.row, col = best.col, value = best.value, "Brightest pixel");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(consumer: &mut impl FrameConsumer, rows: &[&[Pixel]], amplifier: bool) {
        consumer.pre_process();
        for (r, row) in rows.iter().enumerate() {
            consumer.handle_vector_start();
            for (c, &p) in row.iter().enumerate() {
                consumer.handle_pixel(r as u8, c as u8, p, amplifier);
            }
            consumer.handle_vector_end();
        }
        consumer.post_process();
    }

    #[test]
    fn test_capture_fills_row_major() {
        let mut out = [0; 4];
        let mut consumer = CaptureConsumer::new(&mut out, 2);
        feed(&mut consumer, &[&[1, 2], &[3, 4]], false);

        assert_eq!(consumer.written(), 4);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn test_sum_resets_per_vector() {
        let mut out = [0; 2];
        let mut consumer = SumConsumer::new(&mut out);
        feed(&mut consumer, &[&[16, 16, 32], &[160, 0, 0]], false);

        assert_eq!(out, [4, 10]);
    }

    #[test]
    fn test_brightest_polarity() {
        let rows: [&[Pixel]; 2] = [&[500, 200, 900], &[300, 100, 800]];

        let mut consumer = BrightestConsumer::new();
        feed(&mut consumer, &rows, false);
        let best = consumer.best().unwrap();
        assert_eq!((best.row, best.col, best.value), (1, 1, 100));

        feed(&mut consumer, &rows, true);
        let best = consumer.best().unwrap();
        assert_eq!((best.row, best.col, best.value), (0, 2, 900));
    }

    #[test]
    fn test_brightest_ties_keep_first() {
        let mut consumer = BrightestConsumer::new();
        feed(&mut consumer, &[&[7, 7], &[7, 7]], false);
        let best = consumer.best().unwrap();
        assert_eq!((best.row, best.col), (0, 0));
    }
}
