//! Temporal smoothing and gated integration of flow.

use super::{FlowError, FlowSample};

/// One low-pass step: `filtered += alpha * (new - filtered)`.
///
/// The caller owns `filtered` across calls. The result truncates toward
/// zero.
pub fn low_pass(filtered: &mut i32, new: i32, alpha: f32) {
    let current = *filtered as f32;
    *filtered = (current + (new as f32 - current) * alpha) as i32;
}

/// First-order low-pass applied to both flow components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPass {
    alpha: f32,
}

impl LowPass {
    /// Creates a filter; `alpha` must lie in `[0, 1]`.
    pub fn new(alpha: f32) -> Result<Self, FlowError> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(FlowError::InvalidAlpha(alpha));
        }
        Ok(Self { alpha })
    }

    /// Smoothing weight of the newest sample.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Moves `filtered` toward `new`.
    pub fn apply(&self, filtered: &mut FlowSample, new: FlowSample) {
        low_pass(&mut filtered.dx, new.dx, self.alpha);
        low_pass(&mut filtered.dy, new.dy, self.alpha);
    }
}

/// Integrates flow, ignoring samples at or below a noise threshold.
#[derive(Debug, Clone, Default)]
pub struct ThresholdAccumulator {
    threshold: u16,
    total: i64,
    accepted: u64,
    rejected: u64,
}

impl ThresholdAccumulator {
    /// An empty accumulator gating at `threshold`.
    pub fn new(threshold: u16) -> Self {
        Self {
            threshold,
            ..Default::default()
        }
    }

    /// Adds `value` if `|value| > threshold`. Returns whether it was added.
    pub fn add(&mut self, value: i32) -> bool {
        if i64::from(value).abs() > i64::from(self.threshold) {
            self.total += i64::from(value);
            self.accepted += 1;
            tracing::trace!(value, total = self.total, "Flow sample accepted");
            true
        } else {
            self.rejected += 1;
            tracing::trace!(value, threshold = self.threshold, "Flow sample below threshold");
            false
        }
    }

    /// Running total of accepted samples.
    #[inline]
    pub fn total(&self) -> i64 {
        self.total
    }

    /// Samples accepted so far.
    #[inline]
    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    /// Samples rejected so far.
    #[inline]
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    /// Gate threshold.
    #[inline]
    pub fn threshold(&self) -> u16 {
        self.threshold
    }

    /// Clears the total and counters, keeping the threshold.
    pub fn reset(&mut self) {
        *self = Self::new(self.threshold);
    }
}
