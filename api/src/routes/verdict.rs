use axum::routing::post;
use axum::{Json, Router};
use redflagged_core::error::ApiError;
use redflagged_core::report::EvaluateRequest;
use redflagged_core::{VerdictReasoning, evaluate_traced};

use crate::auth::ApiCaller;
use crate::error::AppError;
use crate::extract::AppJson;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/v1/verdict", post(evaluate_verdict))
}

/// Evaluate red flags into a verdict
///
/// Runs the verdict cascade over caller-supplied flags and an optional
/// data-quality assessment. No upstream sources are contacted.
#[utoipa::path(
    post,
    path = "/v1/verdict",
    request_body = EvaluateRequest,
    responses(
        (status = 200, description = "Verdict with bucketed risks", body = VerdictReasoning),
        (status = 400, description = "Malformed request body", body = ApiError),
        (status = 401, description = "Missing or invalid API key", body = ApiError)
    ),
    security(("bearer_auth" = [])),
    tag = "verdict"
)]
pub async fn evaluate_verdict(
    caller: ApiCaller,
    AppJson(req): AppJson<EvaluateRequest>,
) -> Result<Json<VerdictReasoning>, AppError> {
    let traced = evaluate_traced(&req.flags, req.data_quality.as_ref());

    tracing::info!(
        caller = caller.label(),
        flags = req.flags.len(),
        rule = traced.rule.as_str(),
        verdict = %traced.reasoning.verdict,
        confidence = traced.reasoning.confidence,
        "verdict evaluated"
    );

    Ok(Json(traced.reasoning))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use redflagged_core::auth::generate_api_key;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;

    async fn post_json(state: AppState, body: Value, auth: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/v1/verdict")
            .header("content-type", "application/json");
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        let response = router()
            .with_state(state)
            .oneshot(
                builder
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
    async fn empty_flags_are_a_deal() {
        let (status, body) =
            post_json(AppState::for_tests(Vec::new()), json!({ "flags": [] }), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"], "deal");
        assert_eq!(body["confidence"], 85);
        assert_eq!(body["dataQualityImpact"], "none");
    }

    #[tokio::test]
    async fn strong_structural_with_pricing_is_a_disaster() {
        let (status, body) = post_json(
            AppState::for_tests(Vec::new()),
            json!({
                "flags": [
                    {"id": "title-brands", "title": "Salvage title", "severity": "critical", "category": "title"},
                    {"id": "comparable-gap", "title": "Priced above comps", "severity": "medium", "category": "pricing"}
                ],
                "dataQuality": {"overallConfidence": "medium", "confidenceScore": 80}
            }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verdict"], "disaster");
        assert_eq!(body["confidence"], 75);
        assert_eq!(body["dataQualityImpact"], "softening");
        assert_eq!(body["structuralRisks"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["marketRisks"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn requires_key_when_keys_are_configured() {
        let (key, hash) = generate_api_key();
        let state = AppState::for_tests(vec![hash]);

        let (status, body) = post_json(state.clone(), json!({ "flags": [] }), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "unauthorized");

        let (status, _) = post_json(
            state,
            json!({ "flags": [] }),
            Some(&format!("Bearer {key}")),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_flag_is_a_validation_error() {
        let (status, body) = post_json(
            AppState::for_tests(Vec::new()),
            json!({ "flags": [{ "title": "no id", "severity": "low", "category": "title" }] }),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_failed");
        assert_eq!(body["field"], "id");
    }
}
