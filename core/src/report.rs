use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::flags::RedFlag;
use crate::quality::DataQualityAssessment;
use crate::sources::SourceReport;
use crate::verdict::{RuleId, VerdictReasoning};

/// Request body for POST /v1/verdict: evaluate flags the caller already has.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateRequest {
    #[serde(default)]
    pub flags: Vec<RedFlag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<DataQualityAssessment>,
}

/// Request body for POST /v1/reports. Also forwarded as-is to every
/// upstream signal source.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// 17-character vehicle identification number
    pub vin: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_url: Option<String>,
    /// Asking price in whole dollars
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asking_price: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mileage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub report_id: Uuid,
    pub vin: String,
    pub generated_at: DateTime<Utc>,
    /// Cascade rule that decided the verdict
    pub rule: RuleId,
    pub sources: Vec<SourceReport>,
    pub data_quality: DataQualityAssessment,
    pub reasoning: VerdictReasoning,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VinError {
    #[error("VIN must be 17 characters, got {0}")]
    Length(usize),
    #[error("VIN may only contain A-Z (excluding I, O, Q) and 0-9")]
    Characters,
}

/// Normalize a VIN to uppercase and check its shape.
pub fn normalize_vin(raw: &str) -> Result<String, VinError> {
    static VIN_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"^[A-HJ-NPR-Z0-9]{17}$").expect("VIN regex must compile")
    });

    let vin = raw.trim().to_uppercase();
    let len = vin.chars().count();
    if len != 17 {
        return Err(VinError::Length(len));
    }
    if !VIN_RE.is_match(&vin) {
        return Err(VinError::Characters);
    }
    Ok(vin)
}
