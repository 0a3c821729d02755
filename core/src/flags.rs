use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ParseEnumError;

/// A discrete risk finding produced by upstream analysis of vehicle history,
/// pricing, or listing data. The verdict engine only reads flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedFlag {
    /// Stable identifier of the finding kind (e.g. "title-brands", "overpriced")
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub severity: Severity,
    pub category: FlagCategory,
    /// Finding is only shown in the paid report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
    /// Upstream provider that produced the finding
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl RedFlag {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        severity: Severity,
        category: FlagCategory,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            severity,
            category,
            is_premium: None,
            data_source: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_data_source(mut self, data_source: impl Into<String>) -> Self {
        self.data_source = Some(data_source.into());
        self
    }

    /// Anything above `low` counts toward the verdict.
    pub fn is_meaningful(&self) -> bool {
        self.severity != Severity::Low
    }
}

/// Severity of a red flag. Unrecognized values deserialize to `Unknown`
/// and are treated as neither low nor high/critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
            Severity::Unknown => "unknown",
        }
    }

    pub fn is_high_or_critical(self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(ParseEnumError::new("severity", other)),
        }
    }
}

/// Upstream category of a red flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum FlagCategory {
    Pricing,
    History,
    Title,
    DataGap,
    Listing,
    Ownership,
    Disaster,
    Seller,
    #[serde(other)]
    Other,
}

impl FlagCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            FlagCategory::Pricing => "pricing",
            FlagCategory::History => "history",
            FlagCategory::Title => "title",
            FlagCategory::DataGap => "data-gap",
            FlagCategory::Listing => "listing",
            FlagCategory::Ownership => "ownership",
            FlagCategory::Disaster => "disaster",
            FlagCategory::Seller => "seller",
            FlagCategory::Other => "other",
        }
    }
}

impl fmt::Display for FlagCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pricing" => Ok(FlagCategory::Pricing),
            "history" => Ok(FlagCategory::History),
            "title" => Ok(FlagCategory::Title),
            "data-gap" => Ok(FlagCategory::DataGap),
            "listing" => Ok(FlagCategory::Listing),
            "ownership" => Ok(FlagCategory::Ownership),
            "disaster" => Ok(FlagCategory::Disaster),
            "seller" => Ok(FlagCategory::Seller),
            other => Err(ParseEnumError::new("category", other)),
        }
    }
}
