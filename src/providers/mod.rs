pub mod coingecko;
pub mod exchange_rate;
pub mod metals_live;
pub mod yahoo_finance;

use anyhow::Result;
use std::time::Duration;

/// Upper bound on any single upstream call, so one slow provider cannot hang
/// a whole conversion request.
pub(crate) const API_TIMEOUT: Duration = Duration::from_secs(3);

pub(crate) fn http_client() -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .user_agent("equiv/0.1")
        .timeout(API_TIMEOUT)
        .build()?)
}
