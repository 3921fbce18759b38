use crate::price_source::{PricePayload, PriceSource};
use crate::providers::http_client;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Fetches the full USD-based fiat rate table in a single call. Rates are
/// expressed as "1 USD = rate units of the currency".
pub struct ExchangeRateProvider {
    base_url: String,
}

impl ExchangeRateProvider {
    pub fn new(base_url: &str) -> Self {
        ExchangeRateProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct RatesResponse {
    rates: Option<PricePayload>,
}

#[async_trait]
impl PriceSource for ExchangeRateProvider {
    #[instrument(name = "FiatFetch", skip(self))]
    async fn fetch(&self) -> Result<Option<PricePayload>> {
        let url = format!("{}/latest?base=USD", self.base_url);
        debug!("Requesting fiat rates from {}", url);

        let client = http_client()?;
        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Fiat request error: {e}");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            debug!("Fiat request returned HTTP {}", response.status());
            return Ok(None);
        }

        let data = response
            .json::<RatesResponse>()
            .await
            .map_err(|e| anyhow!("Failed to parse fiat rate response: {}", e))?;

        Ok(data.rates.filter(|rates| !rates.is_empty()))
    }
}
