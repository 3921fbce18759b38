use crate::price_source::{PricePayload, PriceSource};
use crate::providers::http_client;
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};

const GRAMS_PER_TROY_OUNCE: f64 = 31.1035;

// Approximate USD-per-gram prices, served when the spot API is unreachable
// so metals never drop out of the result set entirely.
const FALLBACK_GOLD: f64 = 65.0;
const FALLBACK_SILVER: f64 = 0.85;

/// Fetches gold and silver spot prices (quoted per troy ounce upstream,
/// stored per gram).
pub struct MetalsProvider {
    base_url: String,
}

impl MetalsProvider {
    pub fn new(base_url: &str) -> Self {
        MetalsProvider {
            base_url: base_url.to_string(),
        }
    }

    fn fallback() -> PricePayload {
        HashMap::from([
            ("GOLD".to_string(), FALLBACK_GOLD),
            ("SILVER".to_string(), FALLBACK_SILVER),
        ])
    }
}

#[derive(Deserialize, Debug)]
struct SpotResponse {
    gold: Option<f64>,
    silver: Option<f64>,
}

#[async_trait]
impl PriceSource for MetalsProvider {
    #[instrument(name = "MetalsFetch", skip(self))]
    async fn fetch(&self) -> Result<Option<PricePayload>> {
        let url = format!("{}/v1/spot", self.base_url);
        debug!("Requesting metal spot prices from {}", url);

        let client = http_client()?;
        let spot = match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                response.json::<SpotResponse>().await.ok()
            }
            Ok(response) => {
                debug!("Metals request returned HTTP {}", response.status());
                None
            }
            Err(e) => {
                debug!("Metals request error: {e}");
                None
            }
        };

        if let Some(SpotResponse {
            gold: Some(gold),
            silver: Some(silver),
        }) = spot
        {
            return Ok(Some(HashMap::from([
                ("GOLD".to_string(), gold / GRAMS_PER_TROY_OUNCE),
                ("SILVER".to_string(), silver / GRAMS_PER_TROY_OUNCE),
            ])));
        }

        warn!("Metal spot prices unavailable, using approximate fallback prices");
        Ok(Some(Self::fallback()))
    }
}
