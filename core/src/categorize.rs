//! Partitions red flags into structural, market, and seller-behavior buckets.

use crate::flags::{FlagCategory, RedFlag, Severity};

/// Finding kinds that bear on the vehicle's physical or legal integrity.
pub const STRUCTURAL_FLAG_IDS: &[&str] = &[
    "title-brands",
    "theft-record",
    "odometer-rollback",
    "accident-history",
    "environmental-risk",
    "disaster-risk",
];

pub const MARKET_FLAG_IDS: &[&str] = &[
    "overpriced",
    "underpriced",
    "unusually-low-price",
    "too-good-for-too-long",
];

/// `too-good-too-be-long` is spelled differently from the market id
/// `too-good-for-too-long`; both spellings are matched verbatim.
pub const SELLER_BEHAVIOR_FLAG_IDS: &[&str] = &[
    "relisting-detected",
    "price-volatility",
    "stale-listing",
    "too-good-too-be-long",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBucket {
    Structural,
    Market,
    SellerBehavior,
}

impl RiskBucket {
    pub fn label(self) -> &'static str {
        match self {
            RiskBucket::Structural => "structural",
            RiskBucket::Market => "market",
            RiskBucket::SellerBehavior => "seller behavior",
        }
    }
}

/// The three disjoint buckets. Input order is preserved within each.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskBuckets {
    pub structural: Vec<RedFlag>,
    pub market: Vec<RedFlag>,
    pub seller_behavior: Vec<RedFlag>,
}

impl RiskBuckets {
    pub fn len(&self) -> usize {
        self.structural.len() + self.market.len() + self.seller_behavior.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bucket(&self, bucket: RiskBucket) -> &[RedFlag] {
        match bucket {
            RiskBucket::Structural => &self.structural,
            RiskBucket::Market => &self.market,
            RiskBucket::SellerBehavior => &self.seller_behavior,
        }
    }
}

/// Decide which bucket a single flag belongs to. First match wins.
pub fn classify(flag: &RedFlag) -> RiskBucket {
    let id = flag.id.as_str();

    // Any critical flag is structural regardless of category: the
    // disaster-category clause only applies to `high`. This mirrors the
    // existing precedence of `disaster && high || critical` and is kept
    // as-is; requiring the disaster category for critical flags would move
    // e.g. a critical pricing flag into the market bucket.
    if STRUCTURAL_FLAG_IDS.contains(&id)
        || (flag.category == FlagCategory::Disaster && flag.severity == Severity::High)
        || flag.severity == Severity::Critical
    {
        return RiskBucket::Structural;
    }

    if MARKET_FLAG_IDS.contains(&id) || flag.category == FlagCategory::Pricing {
        return RiskBucket::Market;
    }

    if SELLER_BEHAVIOR_FLAG_IDS.contains(&id)
        || matches!(flag.category, FlagCategory::Listing | FlagCategory::Seller)
    {
        return RiskBucket::SellerBehavior;
    }

    if flag.severity.is_high_or_critical() {
        RiskBucket::Structural
    } else {
        RiskBucket::Market
    }
}

pub fn categorize(flags: &[RedFlag]) -> RiskBuckets {
    let mut buckets = RiskBuckets::default();
    for flag in flags {
        let target = match classify(flag) {
            RiskBucket::Structural => &mut buckets.structural,
            RiskBucket::Market => &mut buckets.market,
            RiskBucket::SellerBehavior => &mut buckets.seller_behavior,
        };
        target.push(flag.clone());
    }
    buckets
}
