use axum::extract::Request;
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

const HSTS: &str = "max-age=63072000; includeSubDomains";

/// Redirect plain-HTTP requests to HTTPS, judged by `X-Forwarded-Proto`
/// from the TLS-terminating proxy. Enabled by `REDFLAGGED_REQUIRE_HTTPS=true`.
/// Every response carries HSTS.
pub async fn require_https(req: Request, next: Next) -> Response {
    let forwarded_http = req
        .headers()
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("http"));

    let location = if forwarded_http {
        https_location(&req)
    } else {
        None
    };

    let mut response = match location {
        Some(location) => {
            (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
        }
        None => next.run(req).await,
    };
    response.headers_mut().insert(
        header::STRICT_TRANSPORT_SECURITY,
        HeaderValue::from_static(HSTS),
    );
    response
}

fn https_location(req: &Request) -> Option<HeaderValue> {
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost");
    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    HeaderValue::from_str(&format!("https://{host}{path_and_query}")).ok()
}

pub fn enabled_from_env() -> bool {
    std::env::var("REDFLAGGED_REQUIRE_HTTPS")
        .map(|v| v == "true")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::{Router, middleware};
    use tower::ServiceExt;

    async fn ok() -> StatusCode {
        StatusCode::OK
    }

    fn app() -> Router {
        Router::new()
            .route("/v1/reports", get(ok))
            .layer(middleware::from_fn(super::require_https))
    }

    #[tokio::test]
    async fn forwarded_http_is_redirected() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/reports?vin=1")
                    .header("host", "redflagged.app")
                    .header("x-forwarded-proto", "http")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response
                .headers()
                .get("location")
                .expect("location header should exist"),
            "https://redflagged.app/v1/reports?vin=1"
        );
        assert!(response.headers().contains_key("strict-transport-security"));
    }

    #[tokio::test]
    async fn https_passes_through_with_hsts() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/v1/reports")
                    .header("x-forwarded-proto", "https")
                    .body(Body::empty())
                    .expect("request should build"),
            )
            .await
            .expect("request should succeed");

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("strict-transport-security"));
    }
}
