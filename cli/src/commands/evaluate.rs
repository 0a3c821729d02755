use clap::Args;
use redflagged_core::report::EvaluateRequest;
use redflagged_core::sources::confidence_level_for_score;
use redflagged_core::{ConfidenceLevel, DataQualityAssessment, evaluate_traced};
use serde_json::{Value, json};

use crate::util::{api_request, exit_error, pretty, read_json_from_file};

#[derive(Args)]
pub struct EvaluateArgs {
    /// JSON file with `{flags, dataQuality}` or a bare flag array ('-' for stdin)
    #[arg(long, short = 'f')]
    pub file: String,

    /// Send the flags to POST /v1/verdict instead of evaluating locally
    #[arg(long)]
    pub remote: bool,

    /// Override the overall data confidence (high, medium, low)
    #[arg(long)]
    pub confidence: Option<ConfidenceLevel>,

    /// Override the data-quality confidence score (0-100). Without
    /// --confidence or an assessment in the file, the level follows the score.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub score: Option<u8>,

    /// Include the id of the rule that produced the verdict
    #[arg(long)]
    pub trace: bool,
}

pub async fn run(api_url: &str, api_key: Option<&str>, args: EvaluateArgs) -> i32 {
    let raw = match read_json_from_file(&args.file) {
        Ok(v) => v,
        Err(e) => exit_error(&e, Some("Provide a JSON file with a flags array, or '-' for stdin.")),
    };
    let request = match build_request(raw, args.confidence, args.score) {
        Ok(r) => r,
        Err(e) => exit_error(&e, Some("Each flag needs id, title, severity and category.")),
    };

    if args.remote {
        let body = match serde_json::to_value(&request) {
            Ok(v) => v,
            Err(e) => exit_error(&format!("Failed to encode request: {e}"), None),
        };
        return api_request(api_url, reqwest::Method::POST, "/v1/verdict", api_key, Some(body))
            .await;
    }

    let traced = evaluate_traced(&request.flags, request.data_quality.as_ref());
    tracing::debug!(rule = traced.rule.as_str(), "evaluated locally");
    let output = if args.trace {
        json!({ "rule": traced.rule, "reasoning": traced.reasoning })
    } else {
        json!(traced.reasoning)
    };
    println!("{}", pretty(&output));
    0
}

/// Accept either a full request object or a bare array of flags, then
/// apply command-line overrides to the data-quality assessment.
fn build_request(
    raw: Value,
    confidence: Option<ConfidenceLevel>,
    score: Option<u8>,
) -> Result<EvaluateRequest, String> {
    let mut request: EvaluateRequest = match raw {
        Value::Array(_) => EvaluateRequest {
            flags: serde_json::from_value(raw).map_err(|e| format!("Invalid flags: {e}"))?,
            data_quality: None,
        },
        other => serde_json::from_value(other).map_err(|e| format!("Invalid request: {e}"))?,
    };

    match request.data_quality.as_mut() {
        Some(assessment) => {
            if let Some(level) = confidence {
                assessment.overall_confidence = level;
            }
            if score.is_some() {
                assessment.confidence_score = score;
            }
        }
        None => {
            // A bare score implies its level, so it never reads as an unknown assessment.
            let level = confidence.or(score.map(confidence_level_for_score));
            if let Some(level) = level {
                request.data_quality = Some(DataQualityAssessment::new(level, score));
            }
        }
    }
    Ok(request)
}
