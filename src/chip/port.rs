//! Pulse-train register protocol.
//!
//! The chip has no data bus. Its eight internal registers are reached by
//! resetting a pointer and pulsing it forward, and a register's value is
//! written the same way on a second pair of lines. Every operation here is
//! fire-and-forget: the chip has no readback path.

use super::register::Register;
use crate::Pixel;

/// Digital control lines of the chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Line {
    /// Resets the register pointer to zero.
    Resp,
    /// Advances the register pointer by one.
    Incp,
    /// Resets the value of the pointed register to zero.
    Resv,
    /// Advances the value of the pointed register by one.
    Incv,
    /// Clocks the on-chip amplifier.
    Inphi,
}

/// Logic level driven onto a [`Line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Logic 0.
    Low,
    /// Logic 1.
    High,
}

/// Host capability the core is written against.
///
/// Implementations wrap GPIO, a delay source and an ADC. The core never
/// touches hardware directly, so the same scan code runs against
/// [`SimulatedChip`](super::SimulatedChip) in tests.
pub trait ChipIo {
    /// Drives a control line to the given level.
    fn set_line(&mut self, line: Line, level: Level);

    /// Blocks for at least `us` microseconds.
    fn wait_microseconds(&mut self, us: u32);

    /// Samples the analog output on the given ADC channel.
    fn read_analog(&mut self, channel: u8) -> Pixel;
}

/// Minimal hold time of a single pulse, in microseconds.
pub const PULSE_HOLD_US: u32 = 1;

/// Register access over the pulse protocol.
///
/// Owns the IO capability, so exactly one logical register sequence can be
/// in flight at a time.
#[derive(Debug)]
pub struct RegisterPort<IO> {
    io: IO,
    /// Pulses issued since construction.
    pulses: u64,
}

impl<IO: ChipIo> RegisterPort<IO> {
    /// Wraps an IO capability. Lines are not touched until the first pulse.
    pub fn new(io: IO) -> Self {
        Self { io, pulses: 0 }
    }

    /// Drives every control line low.
    pub fn init_lines(&mut self) {
        for line in [Line::Resp, Line::Incp, Line::Resv, Line::Incv, Line::Inphi] {
            self.io.set_line(line, Level::Low);
        }
    }

    /// One rising/falling edge pair on `line`.
    pub fn pulse(&mut self, line: Line) {
        self.io.set_line(line, Level::High);
        self.io.wait_microseconds(PULSE_HOLD_US);
        self.io.set_line(line, Level::Low);
        self.pulses += 1;
    }

    /// Resets the pointer and advances it to `register`.
    ///
    /// Costs `register.index()` pulses after the reset; there is no direct jump.
    pub fn set_pointer(&mut self, register: Register) {
        self.pulse(Line::Resp);
        for _ in 0..register.index() {
            self.pulse(Line::Incp);
        }
    }

    /// Resets the pointed register's value and pulses it up to `value`.
    pub fn set_value(&mut self, value: u16) {
        self.pulse(Line::Resv);
        self.increment_value(value);
    }

    /// Adds `delta` to the pointed register's value without resetting it.
    pub fn increment_value(&mut self, delta: u16) {
        for _ in 0..delta {
            self.pulse(Line::Incv);
        }
    }

    /// Points at `register` and writes `value` into it.
    pub fn set_pointer_value(&mut self, register: Register, value: u16) {
        self.set_pointer(register);
        self.set_value(value);
    }

    /// Writes zero to every register.
    pub fn clear_values(&mut self) {
        for register in Register::ALL {
            self.set_pointer_value(register, 0);
        }
    }

    /// Clocks the amplifier once.
    pub fn pulse_amplifier(&mut self) {
        self.pulse(Line::Inphi);
    }

    /// Blocks for `us` microseconds.
    pub fn wait(&mut self, us: u32) {
        self.io.wait_microseconds(us);
    }

    /// Samples one pixel from the analog output.
    pub fn read_analog(&mut self, channel: u8) -> Pixel {
        self.io.read_analog(channel)
    }

    /// Returns the number of pulses issued so far.
    #[inline]
    pub fn pulses_issued(&self) -> u64 {
        self.pulses
    }

    /// Returns a reference to the IO capability.
    pub fn io(&self) -> &IO {
        &self.io
    }

    /// Returns a mutable reference to the IO capability.
    pub fn io_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Releases the IO capability.
    pub fn into_inner(self) -> IO {
        self.io
    }
}
