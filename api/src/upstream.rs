//! Parallel fan-out to the upstream signal sources.
//!
//! Each source is queried independently with its own timeout. A source that
//! is unconfigured, slow, or broken contributes no flags and is reported as
//! such; it never blocks or fails the others.

use std::time::Duration;

use redflagged_core::RedFlag;
use redflagged_core::report::ReportRequest;
use redflagged_core::sources::{SourceKind, SourceReport, SourceStatus};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone)]
pub struct SourceEndpoints {
    history: Option<Url>,
    pricing: Option<Url>,
    disaster: Option<Url>,
    seller: Option<Url>,
    timeout: Duration,
}

impl SourceEndpoints {
    pub fn new(timeout: Duration) -> Self {
        Self {
            history: None,
            pricing: None,
            disaster: None,
            seller: None,
            timeout,
        }
    }

    /// Read `REDFLAGGED_{HISTORY,PRICING,DISASTER,SELLER}_URL` and
    /// `REDFLAGGED_SOURCE_TIMEOUT_MS`. Unparseable URLs are logged and skipped.
    pub fn from_env() -> Self {
        let timeout_ms = std::env::var("REDFLAGGED_SOURCE_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_SOURCE_TIMEOUT_MS);

        let mut endpoints = Self::new(Duration::from_millis(timeout_ms));
        for kind in SourceKind::ALL {
            let var = env_var_name(kind);
            let Ok(raw) = std::env::var(var) else {
                continue;
            };
            if raw.trim().is_empty() {
                continue;
            }
            match Url::parse(raw.trim()) {
                Ok(url) => endpoints = endpoints.with_endpoint(kind, url),
                Err(err) => tracing::warn!(source = %kind, var, "ignoring invalid source URL: {err}"),
            }
        }
        endpoints
    }

    pub fn with_endpoint(mut self, kind: SourceKind, url: Url) -> Self {
        *self.slot_mut(kind) = Some(url);
        self
    }

    pub fn endpoint(&self, kind: SourceKind) -> Option<&Url> {
        match kind {
            SourceKind::VehicleHistory => self.history.as_ref(),
            SourceKind::MarketPricing => self.pricing.as_ref(),
            SourceKind::DisasterGeography => self.disaster.as_ref(),
            SourceKind::SellerSignals => self.seller.as_ref(),
        }
    }

    pub fn configured_count(&self) -> usize {
        SourceKind::ALL
            .iter()
            .filter(|kind| self.endpoint(**kind).is_some())
            .count()
    }

    fn slot_mut(&mut self, kind: SourceKind) -> &mut Option<Url> {
        match kind {
            SourceKind::VehicleHistory => &mut self.history,
            SourceKind::MarketPricing => &mut self.pricing,
            SourceKind::DisasterGeography => &mut self.disaster,
            SourceKind::SellerSignals => &mut self.seller,
        }
    }
}

fn env_var_name(kind: SourceKind) -> &'static str {
    match kind {
        SourceKind::VehicleHistory => "REDFLAGGED_HISTORY_URL",
        SourceKind::MarketPricing => "REDFLAGGED_PRICING_URL",
        SourceKind::DisasterGeography => "REDFLAGGED_DISASTER_URL",
        SourceKind::SellerSignals => "REDFLAGGED_SELLER_URL",
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("upstream returned HTTP {0}")]
    Status(u16),
}

#[derive(Deserialize)]
struct SourceResponse {
    #[serde(default)]
    flags: Vec<RedFlag>,
}

/// Flags from one source plus its status line for the report.
#[derive(Debug, Clone)]
pub struct SourceOutcome {
    pub report: SourceReport,
    pub flags: Vec<RedFlag>,
}

impl SourceOutcome {
    fn unavailable(source: SourceKind, status: SourceStatus, detail: Option<String>) -> Self {
        Self {
            report: SourceReport {
                source,
                status,
                flag_count: 0,
                detail,
            },
            flags: Vec::new(),
        }
    }
}

async fn request_flags(
    client: &reqwest::Client,
    url: Url,
    request: &ReportRequest,
    timeout: Duration,
) -> Result<Vec<RedFlag>, FetchError> {
    let call = async {
        let resp = client.post(url).json(request).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body: SourceResponse = resp.json().await?;
        Ok(body.flags)
    };

    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| FetchError::Timeout(timeout))?
}

pub async fn fetch_source(
    client: &reqwest::Client,
    endpoints: &SourceEndpoints,
    kind: SourceKind,
    request: &ReportRequest,
) -> SourceOutcome {
    let Some(url) = endpoints.endpoint(kind).cloned() else {
        return SourceOutcome::unavailable(kind, SourceStatus::NotConfigured, None);
    };

    match request_flags(client, url, request, endpoints.timeout).await {
        Ok(flags) => {
            let flags: Vec<RedFlag> = flags
                .into_iter()
                .map(|mut flag| {
                    if flag.data_source.is_none() {
                        flag.data_source = Some(kind.as_str().to_string());
                    }
                    flag
                })
                .collect();
            tracing::debug!(source = %kind, flags = flags.len(), "source responded");
            SourceOutcome {
                report: SourceReport {
                    source: kind,
                    status: SourceStatus::Available,
                    flag_count: flags.len(),
                    detail: None,
                },
                flags,
            }
        }
        Err(err) => {
            tracing::warn!(source = %kind, vin = %request.vin, "source unavailable: {err}");
            SourceOutcome::unavailable(kind, SourceStatus::Failed, Some(err.to_string()))
        }
    }
}

/// Query all four sources concurrently. Results come back in
/// `SourceKind::ALL` order.
pub async fn fetch_all(
    client: &reqwest::Client,
    endpoints: &SourceEndpoints,
    request: &ReportRequest,
) -> Vec<SourceOutcome> {
    let (history, pricing, disaster, seller) = tokio::join!(
        fetch_source(client, endpoints, SourceKind::VehicleHistory, request),
        fetch_source(client, endpoints, SourceKind::MarketPricing, request),
        fetch_source(client, endpoints, SourceKind::DisasterGeography, request),
        fetch_source(client, endpoints, SourceKind::SellerSignals, request),
    );
    vec![history, pricing, disaster, seller]
}
