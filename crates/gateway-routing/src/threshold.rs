//! Usage threshold gate.
//!
//! Without a threshold a metric only blocks at its hard ceiling (100%). A
//! configured threshold outside [0, 100] always blocks.

use crate::backends::UsageStatus;
use crate::profile::{RateHint, UsageMetric};
use crate::resolver::RejectionReason;

/// Hard ceiling applied to metrics without a threshold
pub const HARD_CEILING_PERCENT: f64 = 100.0;

/// Whether a single metric's usage is under its threshold
#[must_use]
pub fn within_threshold(percent_used: f64, hint: Option<&RateHint>, metric: UsageMetric) -> bool {
    match hint.and_then(|h| h.threshold(metric)) {
        None => percent_used < HARD_CEILING_PERCENT,
        Some(threshold) if !(0.0..=HARD_CEILING_PERCENT).contains(&threshold) => false,
        Some(threshold) => percent_used < threshold,
    }
}

/// Check all metrics; the first failing one names the rejection.
///
/// # Errors
/// Returns the rejection reason of the first metric over its threshold
pub fn check_usage(status: &UsageStatus, hint: Option<&RateHint>) -> Result<(), RejectionReason> {
    for metric in UsageMetric::ALL {
        if !within_threshold(percent_used(status, metric), hint, metric) {
            return Err(RejectionReason::threshold_exceeded(metric));
        }
    }
    Ok(())
}

fn percent_used(status: &UsageStatus, metric: UsageMetric) -> f64 {
    match metric {
        UsageMetric::Request => status.request_percent_used,
        UsageMetric::Token => status.token_percent_used,
        UsageMetric::Budget => status.budget_percent_used,
    }
}
