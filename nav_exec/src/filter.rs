//! # Adaptive moving average filter
//!
//! Exponential moving average used as a slow, long horizon baseline for the microphone and IR
//! channels. Transient spikes (bumps on the microphones, drops on the IR array when the line is
//! lost) are measured against this baseline.
//!
//! Every channel uses the same fixed weighting, the filter is never specialised per channel.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Serialize;

use crate::eqpt::NUM_CHANNELS;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Inverse of the weight given to each new reading.
pub const FILTER_WINDOW: f64 = 1000.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Running estimate for a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MovingAverage {
    estimate: f64,
}

/// Running estimates for a triple of channels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TripleBaseline {
    channels: [MovingAverage; NUM_CHANNELS],
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Update an estimate with a new reading.
///
/// Computes `(estimate * 999 + reading) / 1000`.
pub fn update(estimate: f64, reading: f64) -> f64 {
    (estimate * (FILTER_WINDOW - 1.0) + reading) / FILTER_WINDOW
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MovingAverage {
    /// Create a new estimate from a seed value.
    pub fn new(seed: f64) -> Self {
        Self { estimate: seed }
    }

    /// Feed a new reading into the estimate, returning the updated estimate.
    pub fn update(&mut self, reading: f64) -> f64 {
        self.estimate = update(self.estimate, reading);
        self.estimate
    }

    pub fn value(&self) -> f64 {
        self.estimate
    }
}

impl TripleBaseline {
    /// Create baselines for all channels from the same seed value.
    pub fn new(seed: f64) -> Self {
        Self {
            channels: [MovingAverage::new(seed); NUM_CHANNELS],
        }
    }

    /// Feed one reading per channel into the baselines, returning the updated estimates.
    pub fn update(&mut self, readings: [u16; NUM_CHANNELS]) -> [f64; NUM_CHANNELS] {
        let mut out = [0f64; NUM_CHANNELS];

        for (i, ch) in self.channels.iter_mut().enumerate() {
            out[i] = ch.update(readings[i] as f64);
        }

        out
    }

    pub fn values(&self) -> [f64; NUM_CHANNELS] {
        let mut out = [0f64; NUM_CHANNELS];

        for (i, ch) in self.channels.iter().enumerate() {
            out[i] = ch.value();
        }

        out
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_update_bounds() {
        let readings = [0.0, 5000.0, 200.0, 199.0, 1500.0, 3.0, 2500.0];
        let mut estimate = 200.0;

        for &r in readings.iter() {
            let next = update(estimate, r);

            // The new estimate lies between the old one and the reading, moving by exactly
            // 1/1000 of the gap
            let (lo, hi) = if r < estimate { (r, estimate) } else { (estimate, r) };
            assert!(next >= lo && next <= hi);
            if r != estimate {
                assert!(next != estimate && next != r);
            }
            assert!((next - estimate - (r - estimate) / 1000.0).abs() < 1e-9);

            estimate = next;
        }
    }

    #[test]
    fn test_convergence() {
        let mut avg = MovingAverage::new(200.0);

        // The window is also the time constant, so after 1000 identical readings the remaining
        // gap is (999/1000)^1000 ~ 1/e of the initial gap
        for _ in 0..1000 {
            avg.update(1200.0);
        }
        let gap = 1200.0 - avg.value();
        assert!((gap / 1000.0 - (-1f64).exp()).abs() < 1e-3);

        // And within 1% of the reading after ~4.6 time constants
        for _ in 1000..4700 {
            avg.update(1200.0);
        }
        assert!((1200.0 - avg.value()) / 1200.0 < 0.01);
        assert!(avg.value() > 0.0);
    }

    #[test]
    fn test_triple_baseline() {
        let mut base = TripleBaseline::new(1500.0);

        let est = base.update([500, 1500, 2500]);
        assert_eq!(est, [1499.0, 1500.0, 1501.0]);
        assert_eq!(base.values(), est);
    }
}
