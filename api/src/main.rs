use std::net::SocketAddr;

use axum::Router;
use axum::http::Uri;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod auth;
mod error;
mod extract;
mod middleware;
mod routes;
mod state;
mod upstream;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "RedFlagged API",
        version = "0.1.0",
        description = "Used-car purchase verdicts (deal, caution, disaster) assembled from title history, market pricing, disaster geography, and seller-listing signals."
    ),
    paths(
        routes::health::health_check,
        routes::verdict::evaluate_verdict,
        routes::reports::create_report,
    ),
    components(schemas(
        HealthResponse,
        redflagged_core::error::ApiError,
        redflagged_core::flags::RedFlag,
        redflagged_core::flags::Severity,
        redflagged_core::flags::FlagCategory,
        redflagged_core::quality::DataQualityAssessment,
        redflagged_core::quality::DataQualityFactor,
        redflagged_core::quality::ConfidenceLevel,
        redflagged_core::quality::FactorImpact,
        redflagged_core::quality::DataQualityImpact,
        redflagged_core::verdict::Verdict,
        redflagged_core::verdict::VerdictReasoning,
        redflagged_core::verdict::RuleId,
        redflagged_core::sources::SourceKind,
        redflagged_core::sources::SourceStatus,
        redflagged_core::sources::SourceReport,
        redflagged_core::report::EvaluateRequest,
        redflagged_core::report::ReportRequest,
        redflagged_core::report::ReportResponse,
    )),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(
                utoipa::openapi::security::Http::new(
                    utoipa::openapi::security::HttpAuthScheme::Bearer,
                ),
            ),
        );
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Upstream signal sources with a configured endpoint (0-4)
    pub configured_sources: usize,
}

async fn not_found(uri: Uri) -> error::AppError {
    error::AppError::NotFound {
        resource: format!("route {}", uri.path()),
    }
}

fn build_router(app_state: state::AppState, require_https: bool) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::verdict::router().layer(middleware::rate_limit::verdict_layer()))
        .merge(routes::reports::router().layer(middleware::rate_limit::reports_layer()))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .option_layer(require_https.then(|| {
                    axum::middleware::from_fn(middleware::https::require_https)
                }))
                .layer(axum::middleware::from_fn(middleware::security_headers::apply))
                .layer(middleware::cors::build_cors_layer()),
        )
        .with_state(app_state)
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    // Structured JSON logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "redflagged_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let app_state = state::AppState::from_env();
    if app_state.api_key_hashes.is_empty() {
        tracing::warn!("REDFLAGGED_API_KEY_HASHES not set, API keys are not required");
    }
    tracing::info!(
        configured_sources = app_state.sources.configured_count(),
        "upstream signal sources loaded"
    );

    let app = build_router(app_state, middleware::https::enabled_from_env());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("RedFlagged API listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind {addr}: {err}");
            std::process::exit(1);
        }
    };
    if let Err(err) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    {
        tracing::error!("server error: {err}");
        std::process::exit(1);
    }
}
