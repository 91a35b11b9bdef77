//! Position from a stream of flow samples.

use super::filter::{LowPass, ThresholdAccumulator};
use super::{FlowConfig, FlowError, FlowSample};

/// Outcome of one [`Odometry::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OdometryStep {
    /// Smoothed flow after this sample.
    pub filtered: FlowSample,
    /// Whether the x component cleared the threshold.
    pub accepted_x: bool,
    /// Whether the y component cleared the threshold.
    pub accepted_y: bool,
}

/// Low-pass smoothing followed by per-axis gated accumulation.
#[derive(Debug, Clone)]
pub struct Odometry {
    filter: LowPass,
    filtered: FlowSample,
    x: ThresholdAccumulator,
    y: ThresholdAccumulator,
}

impl Odometry {
    /// Starts at the origin with low-pass weight `alpha` and noise gate `threshold`.
    pub fn new(alpha: f32, threshold: u16) -> Result<Self, FlowError> {
        Ok(Self {
            filter: LowPass::new(alpha)?,
            filtered: FlowSample::ZERO,
            x: ThresholdAccumulator::new(threshold),
            y: ThresholdAccumulator::new(threshold),
        })
    }

    /// Builds an odometer from the `alpha` and `threshold` of `config`.
    pub fn from_config(config: &FlowConfig) -> Result<Self, FlowError> {
        Self::new(config.alpha, config.threshold)
    }

    /// Folds in one raw flow sample.
    pub fn update(&mut self, sample: FlowSample) -> OdometryStep {
        self.filter.apply(&mut self.filtered, sample);
        let accepted_x = self.x.add(self.filtered.dx);
        let accepted_y = self.y.add(self.filtered.dy);
        OdometryStep {
            filtered: self.filtered,
            accepted_x,
            accepted_y,
        }
    }

    /// Integrated displacement `(x, y)` in flow units.
    pub fn position(&self) -> (i64, i64) {
        (self.x.total(), self.y.total())
    }

    /// Current smoothed flow.
    pub fn filtered(&self) -> FlowSample {
        self.filtered
    }

    /// Per-axis accumulators.
    pub fn accumulators(&self) -> (&ThresholdAccumulator, &ThresholdAccumulator) {
        (&self.x, &self.y)
    }

    /// Returns to the origin and clears the filter state.
    pub fn reset(&mut self) {
        self.filtered = FlowSample::ZERO;
        self.x.reset();
        self.y.reset();
        tracing::info!("Odometry reset");
    }
}
