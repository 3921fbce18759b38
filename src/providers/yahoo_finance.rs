use crate::price_source::{PricePayload, PriceSource};
use crate::providers::http_client;
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Fetches equity prices from the Yahoo Finance chart API, one request per
/// symbol. Symbols that fail are simply absent from the payload; the batch
/// itself only counts as failed when nothing resolves.
pub struct YahooEquityProvider {
    base_url: String,
    symbols: Vec<String>,
    /// Exchange suffix appended on the wire (".NS" for NSE symbols) and
    /// stripped again in the returned payload.
    suffix: String,
}

impl YahooEquityProvider {
    pub fn new(base_url: &str, symbols: Vec<String>, suffix: &str) -> Self {
        YahooEquityProvider {
            base_url: base_url.to_string(),
            symbols,
            suffix: suffix.to_string(),
        }
    }

    async fn fetch_symbol(&self, client: &reqwest::Client, symbol: &str) -> Option<f64> {
        let url = format!(
            "{}/v8/finance/chart/{}{}",
            self.base_url, symbol, self.suffix
        );
        debug!("Requesting equity price from {}", url);

        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Equity request error for {symbol}: {e}");
                return None;
            }
        };
        if !response.status().is_success() {
            debug!(
                "Equity request for {symbol} returned HTTP {}",
                response.status()
            );
            return None;
        }

        let data = match response.json::<YahooChartResponse>().await {
            Ok(data) => data,
            Err(e) => {
                debug!("Failed to parse equity response for {symbol}: {e}");
                return None;
            }
        };

        data.chart
            .result
            .and_then(|items| items.into_iter().next())
            .map(|item| item.meta.regular_market_price)
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: f64,
}

#[async_trait]
impl PriceSource for YahooEquityProvider {
    #[instrument(name = "EquityFetch", skip(self))]
    async fn fetch(&self) -> Result<Option<PricePayload>> {
        let client = http_client()?;

        let fetches = self.symbols.iter().map(|symbol| {
            let client = client.clone();
            async move { (symbol.clone(), self.fetch_symbol(&client, symbol).await) }
        });

        let mut payload = PricePayload::new();
        for (symbol, price) in join_all(fetches).await {
            if let Some(price) = price {
                payload.insert(symbol, price);
            }
        }

        if payload.is_empty() {
            return Ok(None);
        }
        Ok(Some(payload))
    }
}
