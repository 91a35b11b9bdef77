//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

use crate::chip::{ChipIo, RegisterPort};
use crate::flow::{FlowSample, Odometry};

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// Registration or encoding failed.
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of sensor and flow state for a metrics update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Scans completed.
    pub scans: u64,
    /// Analog reads performed.
    pub pixels_read: u64,
    /// Control-line pulses issued.
    pub register_pulses: u64,
    /// Latest smoothed flow.
    pub flow: FlowSample,
    /// Integrated position `(x, y)`.
    pub odometry: (i64, i64),
    /// Flow samples that cleared the threshold, both axes.
    pub flow_accepted: u64,
    /// Flow samples below the threshold, both axes.
    pub flow_rejected: u64,
}

impl MetricsSnapshot {
    /// Collects the current state of a port and an odometer.
    ///
    /// `scans` and `pixels_read` are tracked by the caller since the port
    /// only sees individual pulses.
    pub fn from_components<IO: ChipIo>(
        scans: u64,
        pixels_read: u64,
        port: &RegisterPort<IO>,
        odometry: &Odometry,
    ) -> Self {
        let (x, y) = odometry.accumulators();
        Self {
            scans,
            pixels_read,
            register_pulses: port.pulses_issued(),
            flow: odometry.filtered(),
            odometry: odometry.position(),
            flow_accepted: x.accepted() + y.accepted(),
            flow_rejected: x.rejected() + y.rejected(),
        }
    }
}

/// Prometheus metrics registry for the sensor and flow pipeline.
pub struct MetricsRegistry {
    registry: Registry,

    // Scan metrics
    scans_total: IntCounter,
    pixels_read_total: IntCounter,
    register_pulses_total: IntCounter,

    // Flow metrics
    flow_x: IntGauge,
    flow_y: IntGauge,
    odometry_x: IntGauge,
    odometry_y: IntGauge,
    flow_accepted_total: IntCounter,
    flow_rejected_total: IntCounter,
}

impl MetricsRegistry {
    /// Creates a registry with every metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let scans_total = IntCounter::new("stonyman_scans_total", "Total scans completed")?;
        let pixels_read_total =
            IntCounter::new("stonyman_pixels_read_total", "Total analog pixel reads")?;
        let register_pulses_total = IntCounter::new(
            "stonyman_register_pulses_total",
            "Total control-line pulses issued",
        )?;

        let flow_x = IntGauge::new(
            "stonyman_flow_x",
            "Smoothed x flow (1/scale pixel for IIA, 2/scale pixel for least squares)",
        )?;
        let flow_y = IntGauge::new(
            "stonyman_flow_y",
            "Smoothed y flow (1/scale pixel for IIA, 2/scale pixel for least squares)",
        )?;
        let odometry_x = IntGauge::new("stonyman_odometry_x", "Integrated x displacement")?;
        let odometry_y = IntGauge::new("stonyman_odometry_y", "Integrated y displacement")?;
        let flow_accepted_total = IntCounter::new(
            "stonyman_flow_accepted_total",
            "Flow samples above the accumulator threshold",
        )?;
        let flow_rejected_total = IntCounter::new(
            "stonyman_flow_rejected_total",
            "Flow samples at or below the accumulator threshold",
        )?;

        registry.register(Box::new(scans_total.clone()))?;
        registry.register(Box::new(pixels_read_total.clone()))?;
        registry.register(Box::new(register_pulses_total.clone()))?;
        registry.register(Box::new(flow_x.clone()))?;
        registry.register(Box::new(flow_y.clone()))?;
        registry.register(Box::new(odometry_x.clone()))?;
        registry.register(Box::new(odometry_y.clone()))?;
        registry.register(Box::new(flow_accepted_total.clone()))?;
        registry.register(Box::new(flow_rejected_total.clone()))?;

        Ok(Self {
            registry,
            scans_total,
            pixels_read_total,
            register_pulses_total,
            flow_x,
            flow_y,
            odometry_x,
            odometry_y,
            flow_accepted_total,
            flow_rejected_total,
        })
    }

    /// Updates all metrics from a snapshot.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        advance(&self.scans_total, snapshot.scans);
        advance(&self.pixels_read_total, snapshot.pixels_read);
        advance(&self.register_pulses_total, snapshot.register_pulses);

        self.flow_x.set(i64::from(snapshot.flow.dx));
        self.flow_y.set(i64::from(snapshot.flow.dy));
        self.odometry_x.set(snapshot.odometry.0);
        self.odometry_y.set(snapshot.odometry.1);

        advance(&self.flow_accepted_total, snapshot.flow_accepted);
        advance(&self.flow_rejected_total, snapshot.flow_rejected);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

// Counters only move forward, so bump by the difference
fn advance(counter: &IntCounter, total: u64) {
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chip::SimulatedChip;

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            scans: 3,
            pixels_read: 768,
            register_pulses: 5000,
            flow: FlowSample { dx: 12, dy: -4 },
            odometry: (120, -30),
            flow_accepted: 9,
            flow_rejected: 2,
        };
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("stonyman_scans_total 3"));
        assert!(output.contains("stonyman_pixels_read_total 768"));
        assert!(output.contains("stonyman_flow_y -4"));
        assert!(output.contains("stonyman_odometry_x 120"));
        assert!(output.contains("stonyman_flow_rejected_total 2"));
    }

    #[test]
    fn test_counters_never_go_backwards() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            scans: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            scans: 4,
            ..Default::default()
        });

        assert!(registry.encode().unwrap().contains("stonyman_scans_total 10"));
    }

    #[test]
    fn test_snapshot_from_components() {
        let mut port = RegisterPort::new(SimulatedChip::new());
        port.clear_values();
        let mut odometry = Odometry::new(1.0, 1).unwrap();
        odometry.update(FlowSample { dx: 5, dy: 0 });

        let snapshot = MetricsSnapshot::from_components(1, 64, &port, &odometry);
        assert_eq!(snapshot.register_pulses, port.pulses_issued());
        assert!(snapshot.register_pulses > 0);
        assert_eq!(snapshot.odometry, (5, 0));
        assert_eq!(snapshot.flow_accepted, 1);
        assert_eq!(snapshot.flow_rejected, 1);
    }
}
