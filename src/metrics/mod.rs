//! Prometheus metrics for the sensor and flow pipeline.
//!
//! Metrics are rendered in the text exposition format; nothing here serves
//! them over the network.
//!
//! # Metrics Exposed
//!
//! ## Scan Metrics
//! - `stonyman_scans_total` - Scans completed
//! - `stonyman_pixels_read_total` - Analog pixel reads
//! - `stonyman_register_pulses_total` - Control-line pulses issued
//!
//! ## Flow Metrics
//! - `stonyman_flow_x`, `stonyman_flow_y` - Smoothed flow
//! - `stonyman_odometry_x`, `stonyman_odometry_y` - Integrated displacement
//! - `stonyman_flow_accepted_total` - Samples above the accumulator threshold
//! - `stonyman_flow_rejected_total` - Samples at or below it
//!
//! # Example
//!
//! ```
//! use stonyman_flow::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().unwrap();
//! registry.update(&MetricsSnapshot {
//!     scans: 1,
//!     pixels_read: 64,
//!     ..Default::default()
//! });
//! assert!(registry.encode().unwrap().contains("stonyman_scans_total 1"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
