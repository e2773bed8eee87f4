//! Streaming per-group statistics
//!
//! Each group keeps O(1) state regardless of how many amounts it receives:
//! a running total, the set of quarters seen and Welford's running mean and
//! sum of squared deviations.

use crate::app::models::GroupKey;
use std::collections::BTreeSet;

/// Statistics for one `(legal name, region)` group
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStatistics {
    key: GroupKey,
    total_amount: f64,
    distinct_periods: BTreeSet<String>,
    sample_count: u64,
    mean: f64,
    m2: f64,
}

impl GroupStatistics {
    /// Create a group from its first contribution
    ///
    /// Groups never exist empty, so `sample_count >= 1` and
    /// `distinct_periods` is non-empty from construction on.
    pub fn new(key: GroupKey, amount: f64, period: &str) -> Self {
        let mut stats = Self {
            key,
            total_amount: 0.0,
            distinct_periods: BTreeSet::new(),
            sample_count: 0,
            mean: 0.0,
            m2: 0.0,
        };
        stats.add(amount, period);
        stats
    }

    /// Add one amount observed in `period`
    pub fn add(&mut self, amount: f64, period: &str) {
        self.total_amount += amount;
        if !self.distinct_periods.contains(period) {
            self.distinct_periods.insert(period.to_string());
        }

        self.sample_count += 1;
        let delta = amount - self.mean;
        self.mean += delta / self.sample_count as f64;
        let delta2 = amount - self.mean;
        self.m2 += delta * delta2;
    }

    pub fn key(&self) -> &GroupKey {
        &self.key
    }

    pub fn total_amount(&self) -> f64 {
        self.total_amount
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn distinct_periods(&self) -> &BTreeSet<String> {
        &self.distinct_periods
    }

    /// Average total per quarter in which the group had expenses
    pub fn quarterly_average(&self) -> f64 {
        if self.distinct_periods.is_empty() {
            0.0
        } else {
            self.total_amount / self.distinct_periods.len() as f64
        }
    }

    /// Bessel-corrected sample variance, 0 for fewer than two samples
    pub fn sample_variance(&self) -> f64 {
        if self.sample_count < 2 {
            0.0
        } else {
            // guards against a tiny negative m2 from rounding
            (self.m2 / (self.sample_count - 1) as f64).max(0.0)
        }
    }

    /// Sample standard deviation of the individual amounts
    pub fn standard_deviation(&self) -> f64 {
        self.sample_variance().sqrt()
    }
}
