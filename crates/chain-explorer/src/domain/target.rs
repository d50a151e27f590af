//! Mining target adjustment.
//!
//! The target is a count of required leading zero bits. At every adjustment
//! boundary it moves by exactly one unit, then is clamped:
//!
//! | Elapsed vs expected | Next target |
//! |---------------------|-------------|
//! | actual > expected   | prev - 1    |
//! | actual < expected   | prev + 1    |
//! | equal               | prev        |

use crate::config::TargetConfig;
use std::cmp::Ordering;

impl TargetConfig {
    /// Next target from the previous one and the interval's timing.
    pub fn calculate(&self, prev_target: u32, expected_secs: u64, actual_secs: u64) -> u32 {
        let next = match actual_secs.cmp(&expected_secs) {
            Ordering::Greater => prev_target.saturating_sub(1),
            Ordering::Less => prev_target.saturating_add(1),
            Ordering::Equal => prev_target,
        };
        next.clamp(self.minimum_target, self.maximum_target)
    }
}

/// [`TargetConfig::calculate`] with the default bounds.
pub fn calculate_mining_target(prev_target: u32, expected_secs: u64, actual_secs: u64) -> u32 {
    TargetConfig::default().calculate(prev_target, expected_secs, actual_secs)
}
