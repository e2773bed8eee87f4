//! Aggregation accumulator for joined expense rows
//!
//! One [`GroupStatistics`] per `(legal name, region)` group, created lazily on
//! the first contribution and kept until the report is written. Memory grows
//! with the number of groups, never with the number of rows.
//!
//! Groups remember the order in which they were first seen; the report sort
//! is stable over that order.

pub mod statistics;

pub use statistics::GroupStatistics;

use crate::app::models::GroupKey;
use std::collections::HashMap;

/// Accumulator owning every group of a run
#[derive(Debug, Default)]
pub struct ExpenseAggregator {
    /// Group position in `groups` by key
    index: HashMap<GroupKey, usize>,

    /// Groups in first-contribution order
    groups: Vec<GroupStatistics>,

    /// Total number of contributions
    contributions: u64,
}

impl ExpenseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one amount to the group `key`, creating it when needed
    pub fn contribute(&mut self, key: GroupKey, amount: f64, period: &str) {
        self.contributions += 1;

        match self.index.get(&key) {
            Some(&position) => self.groups[position].add(amount, period),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push(GroupStatistics::new(key, amount, period));
            }
        }
    }

    /// Statistics of a single group
    pub fn get(&self, key: &GroupKey) -> Option<&GroupStatistics> {
        self.index.get(key).map(|&position| &self.groups[position])
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn contribution_count(&self) -> u64 {
        self.contributions
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Consume the accumulator into groups sorted by descending total
    ///
    /// The sort is stable, so groups with equal totals keep their
    /// first-contribution order.
    pub fn into_sorted(self) -> Vec<GroupStatistics> {
        let mut groups = self.groups;
        groups.sort_by(|a, b| b.total_amount().total_cmp(&a.total_amount()));
        groups
    }
}
