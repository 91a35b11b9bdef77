//! Sensor readout.
//!
//! A scan walks a [`ScanWindow`] one pixel at a time, stepping the chip's
//! row and column registers with incremental pulses, and hands each
//! sample to a [`FrameConsumer`]. Captures, row/column sums and the
//! brightest-pixel search are all consumers over the same traversal.

mod consumer;
mod window;

pub use consumer::{
    Brightest, BrightestConsumer, CaptureConsumer, FrameConsumer, SumConsumer, SUM_SHIFT,
};
pub use window::{Axis, ScanWindow};

use crate::chip::{ChipIo, Register, RegisterPort};
use crate::image::Image;
use crate::Pixel;
use thiserror::Error;

/// Errors raised before a scan touches the chip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// Zero pixels requested along an axis.
    #[error("{0} count must be non-zero")]
    EmptyWindow(Axis),
    /// Zero stride along an axis.
    #[error("{0} stride must be non-zero")]
    ZeroStride(Axis),
    /// The window leaves the pixel array.
    #[error("{axis} window start {start} + {count} x {stride} runs off the pixel array")]
    OutOfGrid {
        /// Offending axis.
        axis: Axis,
        /// First address on the axis.
        start: u8,
        /// Pixels along the axis.
        count: u8,
        /// Address step along the axis.
        stride: u8,
    },
    /// Caller buffer has the wrong length.
    #[error("output buffer holds {actual} values, scan produces {expected}")]
    BufferMismatch {
        /// Values the scan produces.
        expected: usize,
        /// Buffer length supplied.
        actual: usize,
    },
}

/// Traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanOrder {
    /// Rows outer, columns inner.
    #[default]
    RowMajor,
    /// Columns outer, rows inner.
    ColumnMajor,
}

/// Per-scan settings taken from the sensor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSettings {
    /// Pulse the amplifier before each sample. Also flips brightness polarity.
    pub amplifier: bool,
    /// ADC channel to sample.
    pub analog_channel: u8,
    /// Settle delay on either side of the amplifier pulse, in microseconds.
    pub settle_us: u32,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            amplifier: false,
            analog_channel: 0,
            settle_us: 1,
        }
    }
}

/// Drives scans over a register port.
///
/// Borrows the port mutably for its lifetime: a chip can only run one
/// register sequence at a time.
#[derive(Debug)]
pub struct ScanEngine<'p, IO> {
    port: &'p mut RegisterPort<IO>,
    settings: ScanSettings,
}

impl<'p, IO: ChipIo> ScanEngine<'p, IO> {
    /// Binds an engine to `port` for the engine's lifetime.
    pub fn new(port: &'p mut RegisterPort<IO>, settings: ScanSettings) -> Self {
        Self { port, settings }
    }

    /// Returns the settings scans run with.
    pub fn settings(&self) -> &ScanSettings {
        &self.settings
    }

    /// Walks `window` in `order`, feeding every pixel to `consumer`.
    pub fn run<C: FrameConsumer + ?Sized>(
        &mut self,
        window: &ScanWindow,
        order: ScanOrder,
        consumer: &mut C,
    ) -> Result<(), ScanError> {
        window.validate()?;
        let pulses_before = self.port.pulses_issued();
        let (outer, inner) = AxisPlan::for_order(window, order);

        consumer.pre_process();
        self.port
            .set_pointer_value(outer.register, u16::from(outer.start));

        for o in 0..outer.count {
            self.port
                .set_pointer_value(inner.register, u16::from(inner.start));
            consumer.handle_vector_start();

            for i in 0..inner.count {
                let pixel = self.sample();
                let (row, col) = match order {
                    ScanOrder::RowMajor => (o, i),
                    ScanOrder::ColumnMajor => (i, o),
                };
                consumer.handle_pixel(row, col, pixel, self.settings.amplifier);
                self.port.increment_value(u16::from(inner.stride));
            }

            self.port.set_pointer(outer.register);
            self.port.increment_value(u16::from(outer.stride));
            consumer.handle_vector_end();
            tracing::trace!(vector = o, "Vector scanned");
        }

        consumer.post_process();

        tracing::debug!(
            ?order,
            rows = window.row_count,
            cols = window.col_count,
            pixels = window.pixel_count(),
            pulses = self.port.pulses_issued() - pulses_before,
            "Scan complete"
        );
        Ok(())
    }

    /// Captures `window` into a row-major image.
    pub fn capture(&mut self, window: &ScanWindow) -> Result<Image, ScanError> {
        let mut pixels = vec![0; window.pixel_count()];
        self.capture_into(window, &mut pixels)?;
        Ok(Image::from_raw(
            pixels,
            usize::from(window.row_count),
            usize::from(window.col_count),
        ))
    }

    /// Captures `window` into a caller buffer of exactly `pixel_count()` pixels.
    pub fn capture_into(&mut self, window: &ScanWindow, out: &mut [Pixel]) -> Result<(), ScanError> {
        check_len(window.pixel_count(), out.len())?;
        let mut consumer = CaptureConsumer::new(out, usize::from(window.col_count));
        self.run(window, ScanOrder::RowMajor, &mut consumer)
    }

    /// Sums each row of `window`, one value per row.
    pub fn row_sums(&mut self, window: &ScanWindow) -> Result<Vec<u32>, ScanError> {
        let mut out = vec![0; usize::from(window.row_count)];
        self.run(window, ScanOrder::RowMajor, &mut SumConsumer::new(&mut out))?;
        Ok(out)
    }

    /// Sums each column of `window`, one value per column.
    pub fn col_sums(&mut self, window: &ScanWindow) -> Result<Vec<u32>, ScanError> {
        let mut out = vec![0; usize::from(window.col_count)];
        self.run(window, ScanOrder::ColumnMajor, &mut SumConsumer::new(&mut out))?;
        Ok(out)
    }

    /// Finds the brightest pixel in `window`.
    pub fn find_brightest(&mut self, window: &ScanWindow) -> Result<Brightest, ScanError> {
        let mut consumer = BrightestConsumer::new();
        self.run(window, ScanOrder::RowMajor, &mut consumer)?;
        // A validated window visits at least one pixel.
        Ok(consumer.best().unwrap_or(Brightest {
            row: 0,
            col: 0,
            value: 0,
        }))
    }

    /// Settles, optionally clocks the amplifier, then samples one pixel.
    fn sample(&mut self) -> Pixel {
        self.port.wait(self.settings.settle_us);
        if self.settings.amplifier {
            self.port.pulse_amplifier();
        }
        self.port.wait(self.settings.settle_us);
        self.port.read_analog(self.settings.analog_channel)
    }
}

/// Register and extent of one traversal axis.
struct AxisPlan {
    register: Register,
    start: u8,
    count: u8,
    stride: u8,
}

impl AxisPlan {
    /// Returns the (outer, inner) axes for `order`.
    fn for_order(window: &ScanWindow, order: ScanOrder) -> (Self, Self) {
        let rows = Self {
            register: Register::RowSel,
            start: window.row_start,
            count: window.row_count,
            stride: window.row_stride,
        };
        let cols = Self {
            register: Register::ColSel,
            start: window.col_start,
            count: window.col_count,
            stride: window.col_stride,
        };
        match order {
            ScanOrder::RowMajor => (rows, cols),
            ScanOrder::ColumnMajor => (cols, rows),
        }
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), ScanError> {
    if expected != actual {
        return Err(ScanError::BufferMismatch { expected, actual });
    }
    Ok(())
}
