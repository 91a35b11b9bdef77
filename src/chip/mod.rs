//! Vision chip control.
//!
//! This module drives the Stonyman chip's pulse-train register protocol
//! and holds the chip configuration. Hardware access goes through the
//! [`ChipIo`] capability so everything above it is host independent.

mod config;
mod port;
mod register;
mod sensor;
mod sim;

pub use config::{ConfigError, FileConfig, SensorConfig, MAX_BIAS, MAX_GAIN};
pub use port::{ChipIo, Level, Line, RegisterPort, PULSE_HOLD_US};
pub use register::{config_value, Binning, Register, GRID_SIZE};
pub use sensor::Sensor;
pub use sim::{SimulatedChip, ADC_MAX};
