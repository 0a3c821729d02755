use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use redflagged_core::error::ApiError;
use redflagged_core::evaluate_traced;
use redflagged_core::report::{ReportRequest, ReportResponse, normalize_vin};
use redflagged_core::sources::{SourceReport, assess_coverage};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::ApiCaller;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;
use crate::upstream::fetch_all;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/reports", post(create_report))
}

/// Build a purchase report for a vehicle
///
/// Queries every configured signal source in parallel, derives a
/// data-quality assessment from which sources answered, and runs the
/// verdict cascade over the combined flags. Sources that fail or time out
/// are listed with status `failed` and lower the data-quality score; they
/// never fail the request.
#[utoipa::path(
    post,
    path = "/v1/reports",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report with verdict and source coverage", body = ReportResponse),
        (status = 400, description = "Invalid VIN or malformed body", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    State(state): State<AppState>,
    caller: ApiCaller,
    AppJson(mut req): AppJson<ReportRequest>,
) -> Result<Json<ReportResponse>, AppError> {
    let vin = normalize_vin(&req.vin).map_err(|err| AppError::Validation {
        message: err.to_string(),
        field: Some("vin".to_string()),
        received: Some(Value::String(req.vin.clone())),
        docs_hint: Some(
            "Use the 17-character VIN from the dashboard plate or title, e.g. 1HGCM82633A004352."
                .to_string(),
        ),
    })?;
    req.vin = vin;

    let outcomes = fetch_all(&state.http, &state.sources, &req).await;

    let mut flags = Vec::new();
    let mut sources: Vec<SourceReport> = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        flags.extend(outcome.flags);
        sources.push(outcome.report);
    }

    let data_quality = assess_coverage(&sources);
    let traced = evaluate_traced(&flags, Some(&data_quality));
    let report_id = Uuid::now_v7();

    tracing::info!(
        report_id = %report_id,
        caller = caller.label(),
        vin = %req.vin,
        flags = flags.len(),
        sources_available = sources.iter().filter(|s| s.is_available()).count(),
        rule = traced.rule.as_str(),
        verdict = %traced.reasoning.verdict,
        "report generated"
    );

    Ok(Json(ReportResponse {
        report_id,
        vin: req.vin,
        generated_at: Utc::now(),
        rule: traced.rule,
        sources,
        data_quality,
        reasoning: traced.reasoning,
    }))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use super::*;

    async fn post_report(body: Value) -> (StatusCode, Value) {
        let response = router()
            .with_state(AppState::for_tests(Vec::new()))
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/reports")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        (status, serde_json::from_slice(&bytes).expect("json body"))
    }

    #[tokio::test]
    async fn invalid_vin_is_rejected() {
        let (status, body) = post_report(json!({ "vin": "ABC123" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field"], "vin");
        assert_eq!(body["received"], "ABC123");
    }

    #[tokio::test]
    async fn no_sources_means_low_confidence_caution() {
        let (status, body) = post_report(json!({ "vin": "1hgcm82633a004352" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["vin"], "1HGCM82633A004352");
        assert_eq!(body["rule"], "no_meaningful_risks");
        assert_eq!(body["dataQuality"]["overallConfidence"], "low");
        assert_eq!(body["reasoning"]["verdict"], "caution");
        assert_eq!(body["reasoning"]["dataQualityImpact"], "preventing-deal");
        assert_eq!(body["reasoning"]["confidence"], 40);
        assert_eq!(body["sources"].as_array().map(Vec::len), Some(4));
        assert_eq!(body["sources"][0]["status"], "not_configured");
    }
}
