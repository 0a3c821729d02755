//! Upstream signal sources and the coverage-based data-quality assessment
//! used when no external assessment is supplied.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::quality::{ConfidenceLevel, DataQualityAssessment, DataQualityFactor, FactorImpact};

pub const HIGH_CONFIDENCE_MIN_SCORE: u8 = 80;
pub const MEDIUM_CONFIDENCE_MIN_SCORE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    VehicleHistory,
    MarketPricing,
    DisasterGeography,
    SellerSignals,
}

impl SourceKind {
    pub const ALL: [SourceKind; 4] = [
        SourceKind::VehicleHistory,
        SourceKind::MarketPricing,
        SourceKind::DisasterGeography,
        SourceKind::SellerSignals,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::VehicleHistory => "vehicle-history",
            SourceKind::MarketPricing => "market-pricing",
            SourceKind::DisasterGeography => "disaster-geography",
            SourceKind::SellerSignals => "seller-signals",
        }
    }

    /// Share of the coverage score this source contributes. Sums to 100.
    pub fn weight(self) -> u8 {
        match self {
            SourceKind::VehicleHistory => 40,
            SourceKind::MarketPricing => 25,
            SourceKind::DisasterGeography => 15,
            SourceKind::SellerSignals => 20,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SourceKind::VehicleHistory => "Title and accident history",
            SourceKind::MarketPricing => "Market pricing",
            SourceKind::DisasterGeography => "Disaster geography",
            SourceKind::SellerSignals => "Seller listing signals",
        }
    }

    fn recommendation(self) -> &'static str {
        match self {
            SourceKind::VehicleHistory => {
                "Order a full vehicle history report to confirm title status and accident records."
            }
            SourceKind::MarketPricing => {
                "Compare the asking price against recent local sales of the same trim."
            }
            SourceKind::DisasterGeography => {
                "Ask where the vehicle was registered and check for flood or fire exposure."
            }
            SourceKind::SellerSignals => {
                "Search for earlier listings of this VIN to check for relisting or price changes."
            }
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    /// Responded with a well-formed flag list (possibly empty)
    Available,
    /// No endpoint configured for this source
    NotConfigured,
    /// Request failed, timed out, or returned an unusable body
    Failed,
}

/// What one upstream source contributed to a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SourceReport {
    pub source: SourceKind,
    pub status: SourceStatus,
    pub flag_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SourceReport {
    pub fn is_available(&self) -> bool {
        self.status == SourceStatus::Available
    }
}

pub fn confidence_level_for_score(score: u8) -> ConfidenceLevel {
    if score >= HIGH_CONFIDENCE_MIN_SCORE {
        ConfidenceLevel::High
    } else if score >= MEDIUM_CONFIDENCE_MIN_SCORE {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Derive an assessment from which sources answered.
pub fn assess_coverage(reports: &[SourceReport]) -> DataQualityAssessment {
    let mut score: u8 = 0;
    let mut factors = Vec::with_capacity(SourceKind::ALL.len());
    let mut recommendations = Vec::new();
    let mut missing = Vec::new();

    for kind in SourceKind::ALL {
        let report = reports.iter().find(|r| r.source == kind);
        let available = report.is_some_and(SourceReport::is_available);
        if available {
            score = score.saturating_add(kind.weight());
            factors.push(DataQualityFactor {
                name: kind.as_str().to_string(),
                impact: FactorImpact::Positive,
                description: format!("{} data was available.", kind.label()),
            });
        } else {
            let reason = match report.map(|r| r.status) {
                Some(SourceStatus::Failed) => "could not be retrieved",
                _ => "is not available",
            };
            factors.push(DataQualityFactor {
                name: kind.as_str().to_string(),
                impact: FactorImpact::Negative,
                description: format!("{} data {reason}.", kind.label()),
            });
            recommendations.push(kind.recommendation().to_string());
            missing.push(kind.label().to_lowercase());
        }
    }

    let score = score.min(100);
    let summary = if missing.is_empty() {
        "All data sources responded.".to_string()
    } else {
        format!("Missing {}.", missing.join(", "))
    };

    DataQualityAssessment {
        overall_confidence: confidence_level_for_score(score),
        confidence_score: Some(score),
        factors,
        summary,
        recommendations,
    }
}
