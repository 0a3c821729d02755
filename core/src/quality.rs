use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseEnumError;
use crate::verdict::Verdict;

/// External estimate of how complete and trustworthy the underlying vehicle
/// data was. Absence of an assessment is a valid input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityAssessment {
    pub overall_confidence: ConfidenceLevel,
    /// 0-100
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<u8>,
    #[serde(default)]
    pub factors: Vec<DataQualityFactor>,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl DataQualityAssessment {
    pub fn new(overall_confidence: ConfidenceLevel, confidence_score: Option<u8>) -> Self {
        Self {
            overall_confidence,
            confidence_score,
            factors: Vec::new(),
            summary: String::new(),
            recommendations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
    #[serde(other)]
    Unknown,
}

impl ConfidenceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ConfidenceLevel::High => "high",
            ConfidenceLevel::Medium => "medium",
            ConfidenceLevel::Low => "low",
            ConfidenceLevel::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(ConfidenceLevel::High),
            "medium" => Ok(ConfidenceLevel::Medium),
            "low" => Ok(ConfidenceLevel::Low),
            other => Err(ParseEnumError::new("confidence level", other)),
        }
    }
}

/// One input that raised or lowered the assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DataQualityFactor {
    pub name: String,
    pub impact: FactorImpact,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FactorImpact {
    Positive,
    Neutral,
    Negative,
}

/// How far the data-quality assessment moved the verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DataQualityImpact {
    None,
    Softening,
    PreventingDeal,
}

impl DataQualityImpact {
    pub fn as_str(self) -> &'static str {
        match self {
            DataQualityImpact::None => "none",
            DataQualityImpact::Softening => "softening",
            DataQualityImpact::PreventingDeal => "preventing-deal",
        }
    }
}

/// Decide whether an assessment blocks a favorable verdict or only softens it.
pub fn data_quality_impact(
    assessment: Option<&DataQualityAssessment>,
    proposed: Verdict,
) -> DataQualityImpact {
    let Some(assessment) = assessment else {
        return DataQualityImpact::None;
    };

    match assessment.overall_confidence {
        ConfidenceLevel::Low if proposed == Verdict::Deal => DataQualityImpact::PreventingDeal,
        ConfidenceLevel::Low | ConfidenceLevel::Medium => DataQualityImpact::Softening,
        ConfidenceLevel::High | ConfidenceLevel::Unknown => DataQualityImpact::None,
    }
}
