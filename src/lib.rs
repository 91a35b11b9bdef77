//! Stonyman Vision Chip Library
//!
//! Drives a row/column addressable analog vision chip through its
//! pulse-train register interface and estimates sub-pixel optical flow
//! between successive frames in integer arithmetic.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! chip → scan → image → calibration → flow → odometry
//!                 ↓
//!               render
//! ```
//!
//! # Design Principles
//!
//! - **Host independent**: hardware access goes through the [`ChipIo`] capability
//! - **One traversal**: captures, sums and brightest-pixel search share the scan engine
//! - **Integer flow**: fixed-point scaling, degenerate solves report zero motion
//!
//! # Example
//!
//! ```
//! use stonyman_flow::{
//!     calibration::FpnMask,
//!     chip::{Sensor, SensorConfig, SimulatedChip},
//!     flow::{FlowEstimator, Odometry},
//!     scan::ScanWindow,
//! };
//!
//! let chip = SimulatedChip::new().with_fpn(1, 12);
//! let mut sensor = Sensor::begin(chip, SensorConfig::default()).unwrap();
//! let window = ScanWindow::square(40, 16, 1);
//!
//! // Calibrate against the uniform scene
//! let flat = sensor.engine().capture(&window).unwrap();
//! let mask = FpnMask::capture(&flat).unwrap();
//!
//! let estimator = FlowEstimator::default();
//! let mut odometry = Odometry::new(0.5, 2).unwrap();
//!
//! let mut previous = mask.apply(&flat).unwrap();
//! for _ in 0..3 {
//!     let frame = sensor.engine().capture(&window).unwrap();
//!     let current = mask.apply(&frame).unwrap();
//!     let flow = estimator.estimate(&current, &previous).unwrap();
//!     odometry.update(flow);
//!     previous = current;
//! }
//! assert_eq!(odometry.position(), (0, 0));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod calibration;
pub mod chip;
pub mod flow;
pub mod image;
pub mod metrics;
pub mod render;
pub mod scan;

/// One raw analog reading.
pub type Pixel = u16;

// Re-export commonly used types at crate root
pub use calibration::{CalibrationError, FpnMask};
pub use chip::{ChipIo, ConfigError, FileConfig, RegisterPort, Sensor, SensorConfig, SimulatedChip};
pub use flow::{FlowConfig, FlowError, FlowEstimator, FlowSample, Odometry};
pub use image::{Image, ImageError};
pub use scan::{ScanEngine, ScanError, ScanOrder, ScanWindow};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
