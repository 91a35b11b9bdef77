//! Simulated chip for tests and the demo CLI.
//!
//! Decodes pulse trains into register state the same way the silicon does
//! and answers analog reads from a synthetic scene addressed by the
//! ROWSEL/COLSEL registers.

use super::port::{ChipIo, Level, Line};
use super::register::{Register, CONFIG_AMP, GRID_SIZE};
use crate::Pixel;
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};

/// Full-scale reading of the simulated 10-bit ADC.
pub const ADC_MAX: Pixel = 1023;

const GRID: usize = GRID_SIZE as usize;

/// Line-level model of a Stonyman chip.
///
/// The scene holds raw (unamplified) readings for every physical pixel.
/// When the CONFIG amplifier bit is set, reads come back inverted about
/// [`ADC_MAX`].
#[derive(Debug, Clone)]
pub struct SimulatedChip {
    scene: Vec<Pixel>,
    fpn: Vec<Pixel>,
    registers: [u16; 8],
    pointer: u8,
    levels: [Level; 5],
    elapsed_us: u64,
    reads: u64,
    amplifier_pulses: u64,
}

impl Default for SimulatedChip {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedChip {
    /// A chip looking at a flat mid-gray scene with no fixed-pattern noise.
    pub fn new() -> Self {
        Self {
            scene: vec![ADC_MAX / 2; GRID * GRID],
            fpn: vec![0; GRID * GRID],
            registers: [0; 8],
            pointer: 0,
            levels: [Level::Low; 5],
            elapsed_us: 0,
            reads: 0,
            amplifier_pulses: 0,
        }
    }

    /// Adds seeded per-pixel offsets in `0..amplitude` to every read.
    pub fn with_fpn(mut self, seed: u64, amplitude: u16) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let amplitude = u32::from(amplitude.max(1));
        for offset in self.fpn.iter_mut() {
            *offset = (rng.next_u32() % amplitude) as Pixel;
        }
        self
    }

    /// Fills the scene from a function of physical (row, col).
    pub fn set_scene(&mut self, mut scene: impl FnMut(u8, u8) -> Pixel) {
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                self.scene[row as usize * GRID + col as usize] = scene(row, col).min(ADC_MAX);
            }
        }
    }

    /// Sets one physical pixel of the scene.
    pub fn set_pixel(&mut self, row: u8, col: u8, value: Pixel) {
        if row < GRID_SIZE && col < GRID_SIZE {
            self.scene[row as usize * GRID + col as usize] = value.min(ADC_MAX);
        }
    }

    /// Returns the raw reading the chip would produce at (row, col), amplifier bypassed.
    pub fn raw_pixel(&self, row: u8, col: u8) -> Pixel {
        if row >= GRID_SIZE || col >= GRID_SIZE {
            return 0;
        }
        let idx = row as usize * GRID + col as usize;
        self.scene[idx].saturating_add(self.fpn[idx]).min(ADC_MAX)
    }

    /// Current value of a register.
    pub fn register(&self, register: Register) -> u16 {
        self.registers[register.index() as usize]
    }

    /// Current pointer position.
    pub fn pointer(&self) -> u8 {
        self.pointer
    }

    /// Total simulated time spent in waits.
    pub fn elapsed_us(&self) -> u64 {
        self.elapsed_us
    }

    /// Number of analog reads served.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of amplifier clock pulses seen.
    pub fn amplifier_pulses(&self) -> u64 {
        self.amplifier_pulses
    }

    fn on_rising_edge(&mut self, line: Line) {
        let ptr = self.pointer as usize;
        match line {
            Line::Resp => self.pointer = 0,
            Line::Incp => self.pointer = (self.pointer + 1) % 8,
            Line::Resv => self.registers[ptr] = 0,
            Line::Incv => self.registers[ptr] = self.registers[ptr].wrapping_add(1),
            Line::Inphi => self.amplifier_pulses += 1,
        }
    }
}

fn line_slot(line: Line) -> usize {
    match line {
        Line::Resp => 0,
        Line::Incp => 1,
        Line::Resv => 2,
        Line::Incv => 3,
        Line::Inphi => 4,
    }
}

impl ChipIo for SimulatedChip {
    fn set_line(&mut self, line: Line, level: Level) {
        let slot = line_slot(line);
        let previous = self.levels[slot];
        self.levels[slot] = level;
        if previous == Level::Low && level == Level::High {
            self.on_rising_edge(line);
        }
    }

    fn wait_microseconds(&mut self, us: u32) {
        self.elapsed_us += u64::from(us);
    }

    fn read_analog(&mut self, _channel: u8) -> Pixel {
        self.reads += 1;
        let row = self.register(Register::RowSel);
        let col = self.register(Register::ColSel);
        if row >= u16::from(GRID_SIZE) || col >= u16::from(GRID_SIZE) {
            tracing::trace!(row, col, "Read outside pixel array");
            return 0;
        }
        let raw = self.raw_pixel(row as u8, col as u8);
        if self.register(Register::Config) & CONFIG_AMP != 0 {
            ADC_MAX - raw
        } else {
            raw
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::RegisterPort;

    #[test]
    fn test_pulses_decode_to_registers() {
        let mut port = RegisterPort::new(SimulatedChip::new());
        port.set_pointer_value(Register::Vref, 30);
        port.set_pointer_value(Register::RowSel, 5);
        port.increment_value(3);

        let chip = port.io();
        assert_eq!(chip.register(Register::Vref), 30);
        assert_eq!(chip.register(Register::RowSel), 8);
        assert_eq!(chip.pointer(), Register::RowSel.index());
    }

    #[test]
    fn test_read_follows_address_registers() {
        let mut chip = SimulatedChip::new();
        chip.set_pixel(3, 7, 42);

        let mut port = RegisterPort::new(chip);
        port.set_pointer_value(Register::RowSel, 3);
        port.set_pointer_value(Register::ColSel, 7);

        assert_eq!(port.read_analog(0), 42);
        assert_eq!(port.io().reads(), 1);
    }

    #[test]
    fn test_amplifier_inverts_output() {
        let mut chip = SimulatedChip::new();
        chip.set_pixel(0, 0, 100);

        let mut port = RegisterPort::new(chip);
        port.set_pointer_value(Register::Config, 16 + 8 + 1);
        port.set_pointer_value(Register::RowSel, 0);
        port.set_pointer_value(Register::ColSel, 0);

        assert_eq!(port.read_analog(0), ADC_MAX - 100);
    }

    #[test]
    fn test_fpn_is_seeded_and_bounded() {
        let a = SimulatedChip::new().with_fpn(7, 20);
        let b = SimulatedChip::new().with_fpn(7, 20);

        let mut varied = false;
        for row in 0..GRID_SIZE {
            for col in 0..GRID_SIZE {
                let pa = a.raw_pixel(row, col);
                assert_eq!(pa, b.raw_pixel(row, col));
                assert!(pa >= ADC_MAX / 2 && pa < ADC_MAX / 2 + 20);
                varied |= pa != ADC_MAX / 2;
            }
        }
        assert!(varied);
    }

    #[test]
    fn test_waits_accumulate() {
        let mut port = RegisterPort::new(SimulatedChip::new());
        port.pulse(Line::Incp);
        port.wait(5);
        assert_eq!(port.io().elapsed_us(), 6);
    }
}
