use clap::Args;
use redflagged_core::report::{ReportRequest, normalize_vin};

use crate::util::{api_request, exit_error};

#[derive(Args)]
pub struct ReportArgs {
    /// 17-character vehicle identification number
    #[arg(long)]
    pub vin: String,

    /// Listing page the vehicle was found on
    #[arg(long)]
    pub listing_url: Option<String>,

    /// Asking price in whole dollars
    #[arg(long)]
    pub asking_price: Option<u32>,

    /// Odometer reading in miles
    #[arg(long)]
    pub mileage: Option<u32>,

    /// ZIP code where the vehicle is located
    #[arg(long)]
    pub zip_code: Option<String>,
}

pub async fn run(api_url: &str, api_key: Option<&str>, args: ReportArgs) -> i32 {
    let request = match build_request(args) {
        Ok(r) => r,
        Err(e) => exit_error(
            &e,
            Some("Use the 17-character VIN from the dashboard plate or title."),
        ),
    };
    let body = match serde_json::to_value(&request) {
        Ok(v) => v,
        Err(e) => exit_error(&format!("Failed to encode request: {e}"), None),
    };
    api_request(api_url, reqwest::Method::POST, "/v1/reports", api_key, Some(body)).await
}

/// VINs are checked locally so a typo never costs an upstream lookup.
fn build_request(args: ReportArgs) -> Result<ReportRequest, String> {
    let vin = normalize_vin(&args.vin).map_err(|e| e.to_string())?;
    Ok(ReportRequest {
        vin,
        listing_url: args.listing_url,
        asking_price: args.asking_price,
        mileage: args.mileage,
        zip_code: args.zip_code,
    })
}
