use crate::price_source::{PricePayload, PriceSource};
use crate::providers::http_client;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

// CoinGecko id -> display symbol. Both coins ride on one batched request.
const COINS: [(&str, &str); 2] = [("bitcoin", "BTC"), ("ethereum", "ETH")];

pub struct CoinGeckoProvider {
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(base_url: &str) -> Self {
        CoinGeckoProvider {
            base_url: base_url.to_string(),
        }
    }
}

#[derive(Deserialize, Debug)]
struct SimplePrice {
    usd: Option<f64>,
}

#[async_trait]
impl PriceSource for CoinGeckoProvider {
    #[instrument(name = "CryptoFetch", skip(self))]
    async fn fetch(&self) -> Result<Option<PricePayload>> {
        let ids = COINS.map(|(id, _)| id).join(",");
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd",
            self.base_url, ids
        );
        debug!("Requesting crypto prices from {}", url);

        let client = http_client()?;
        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Crypto request error: {e}");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            debug!("Crypto request returned HTTP {}", response.status());
            return Ok(None);
        }

        let data = response
            .json::<HashMap<String, SimplePrice>>()
            .await
            .map_err(|e| anyhow!("Failed to parse crypto price response: {}", e))?;

        let mut payload = PricePayload::new();
        for (id, symbol) in COINS {
            if let Some(price) = data.get(id).and_then(|p| p.usd) {
                payload.insert(symbol.to_string(), price);
            }
        }

        if payload.is_empty() {
            return Ok(None);
        }
        Ok(Some(payload))
    }
}
