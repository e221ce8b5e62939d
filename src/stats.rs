//! Online mean/variance over a fixed sliding window, used by the
//! integrator to recognize pole crossings from anomalous step-distance
//! behavior.

use std::collections::VecDeque;

/// Default window size (`N`) for `RollingStatistic::default`.
pub const DEFAULT_WINDOW: usize = 40;
/// Number of samples that must accumulate before `is_outlier` will ever
/// return `true`.
pub const DEFAULT_READY_THRESHOLD: usize = 5;

/// Fixed-window online estimator of mean and variance.
///
/// During the fill phase (fewer than `window` samples seen) it uses the
/// incremental mean/variance update; once full, it uses Welford's
/// sliding-window update. A negative variance from numerical underflow
/// is never applied — the previous variance is retained and a warning
/// is logged instead.
#[derive(Debug, Clone)]
pub struct RollingStatistic {
    window: usize,
    ready_threshold: usize,
    mean: f64,
    variance: f64,
    elements: VecDeque<f64>,
}

impl RollingStatistic {
    pub fn new(window: usize, ready_threshold: usize) -> Self {
        Self {
            window,
            ready_threshold,
            mean: 0.0,
            variance: 0.0,
            elements: VecDeque::with_capacity(window),
        }
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn variance(&self) -> f64 {
        self.variance
    }

    pub fn stddev(&self) -> f64 {
        self.variance.sqrt()
    }

    pub fn filled(&self) -> usize {
        self.elements.len()
    }

    /// Fold in a new sample.
    pub fn update(&mut self, new: f64) {
        if self.elements.len() < self.window {
            let filled = self.elements.len();
            let old_mean = self.mean;
            self.mean = (self.mean * filled as f64 + new) / (filled as f64 + 1.0);
            if filled >= 1 {
                self.variance = ((filled - 1) as f64 / filled as f64) * self.variance
                    + 1.0 / (filled as f64 + 1.0) * (new - old_mean).powi(2);
            }
            self.elements.push_back(new);
        } else {
            let old = self.elements.pop_front().unwrap();
            let old_mean = self.mean;
            self.mean = old_mean + (new - old) / self.window as f64;
            let new_variance = self.variance
                + (new - old) * (new - self.mean + old - old_mean) / (self.window - 1) as f64;
            if new_variance < 0.0 {
                log::warn!(
                    "rolling statistic: variance underflow ({}), retaining previous variance {}",
                    new_variance,
                    self.variance
                );
            } else {
                self.variance = new_variance;
            }
            self.elements.push_back(new);
        }
    }

    /// Whether `sample` is more than `k` standard deviations from the
    /// mean. Always `false` until `ready_threshold` samples have been
    /// accumulated.
    pub fn is_outlier(&self, sample: f64, k: f64) -> bool {
        if self.elements.len() < self.ready_threshold {
            return false;
        }
        (sample - self.mean).abs() > self.stddev() * k
    }
}

impl Default for RollingStatistic {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW, DEFAULT_READY_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converges_to_constant_mean() {
        let mut stat = RollingStatistic::new(10, 5);
        for _ in 0..50 {
            stat.update(3.0);
        }
        assert!((stat.mean() - 3.0).abs() < 1e-9);
        assert!(stat.variance().abs() < 1e-9);
    }

    #[test]
    fn outlier_requires_ready_threshold() {
        let mut stat = RollingStatistic::new(40, 5);
        stat.update(1.0);
        assert!(!stat.is_outlier(1000.0, 2.0));
    }

    #[test]
    fn detects_outlier_after_ready() {
        let mut stat = RollingStatistic::new(40, 5);
        for i in 0..20 {
            // Alternate around 10.0 so variance is nonzero; a strictly
            // constant series makes every nonzero deviation a 0-sigma
            // "outlier", which is a degenerate case this test isn't
            // about.
            let sample = if i % 2 == 0 { 9.0 } else { 11.0 };
            stat.update(sample);
        }
        assert!(stat.is_outlier(1.0, 2.0));
        assert!(!stat.is_outlier(10.1, 2.0));
    }
}
