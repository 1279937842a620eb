//! Aggregate risk rating for a scanned database.

use crate::models::{InformationType, RiskLevel, RiskTier};
use std::collections::BTreeMap;

/// Share of sensitive columns, in percent, above which a database with any
/// high-risk column is rated critical.
const CRITICAL_PERCENT: f64 = 20.0;
const HIGH_PERCENT: f64 = 15.0;
const MEDIUM_PERCENT: f64 = 5.0;

/// Rates a scan from its per-type column counts.
///
/// Types are partitioned by [`InformationType::risk_tier`]; the rating
/// depends on whether any high-risk type was found and on the percentage of
/// all columns that fall in the high or medium tier.
///
/// # Example
///
/// ```rust
/// use colscan_core::models::{InformationType, RiskLevel};
/// use colscan_core::risk::risk_level;
/// use std::collections::BTreeMap;
///
/// let counts = BTreeMap::from([(InformationType::Ssn, 3)]);
/// assert_eq!(risk_level(&counts, 10), RiskLevel::Critical);
/// assert_eq!(risk_level(&counts, 0), RiskLevel::Low);
/// ```
pub fn risk_level(counts: &BTreeMap<InformationType, usize>, total_columns: usize) -> RiskLevel {
    if total_columns == 0 {
        return RiskLevel::Low;
    }

    let (high, medium) = counts
        .iter()
        .fold((0usize, 0usize), |(high, medium), (info_type, count)| {
            match info_type.risk_tier() {
                RiskTier::High => (high + count, medium),
                RiskTier::Medium => (high, medium + count),
                RiskTier::None => (high, medium),
            }
        });

    #[allow(clippy::cast_precision_loss)]
    let percent = (high + medium) as f64 / total_columns as f64 * 100.0;

    if high > 0 && percent > CRITICAL_PERCENT {
        RiskLevel::Critical
    } else if high > 0 || percent > HIGH_PERCENT {
        RiskLevel::High
    } else if medium > 0 || percent > MEDIUM_PERCENT {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
