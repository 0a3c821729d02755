use crate::categorize::RiskBuckets;
use crate::flags::{RedFlag, Severity};

/// Structural ids that count as strong when reported at `high` severity.
pub const STRONG_STRUCTURAL_FLAG_IDS: &[&str] = &[
    "title-brands",
    "theft-record",
    "odometer-rollback",
    "accident-history",
];

pub const ENVIRONMENTAL_RISK_ID: &str = "environmental-risk";

pub fn is_strong_structural(flag: &RedFlag) -> bool {
    flag.severity == Severity::Critical
        || (flag.severity == Severity::High
            && STRONG_STRUCTURAL_FLAG_IDS.contains(&flag.id.as_str()))
}

pub fn has_strong_structural_risk(structural: &[RedFlag]) -> bool {
    structural.iter().any(is_strong_structural)
}

/// True when the only structural concern is a single environmental exposure.
pub fn has_only_environmental_risk(structural: &[RedFlag]) -> bool {
    matches!(structural, [only] if only.id == ENVIRONMENTAL_RISK_ID)
}

pub fn count_meaningful(bucket: &[RedFlag]) -> usize {
    bucket.iter().filter(|flag| flag.is_meaningful()).count()
}

/// Meaningful (non-low) flag counts per bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskCounts {
    pub structural: usize,
    pub market: usize,
    pub seller_behavior: usize,
}

impl RiskCounts {
    pub fn from_buckets(buckets: &RiskBuckets) -> Self {
        Self {
            structural: count_meaningful(&buckets.structural),
            market: count_meaningful(&buckets.market),
            seller_behavior: count_meaningful(&buckets.seller_behavior),
        }
    }

    pub fn total(&self) -> usize {
        self.structural + self.market + self.seller_behavior
    }

    /// Any meaningful market or seller-behavior signal.
    pub fn has_secondary(&self) -> bool {
        self.market > 0 || self.seller_behavior > 0
    }
}
