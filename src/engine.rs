//! Normalize-through-USD valuation over the TTL price cache

use crate::asset::{AssetClass, AssetRegistry, Mode, Region, VehicleCatalog};
use crate::cache::TtlCache;
use crate::config::CacheConfig;
use crate::format;
use crate::price_source::{PricePayload, PriceSource};
use crate::series::{self, SPARKLINE_DAYS};
use crate::staleness::StalenessOracle;
use crate::store::{CacheEntry, Store};
use chrono::Utc;
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

pub const CRYPTO_BUCKET: &str = "crypto";
pub const FIAT_BUCKET: &str = "fiat";
pub const METALS_BUCKET: &str = "metals";

#[derive(Debug, Error, PartialEq)]
pub enum ValuationError {
    #[error("amount must be a positive number")]
    InvalidAmount,
    #[error("no price data available to convert {0}")]
    Unavailable(String),
}

/// Per-bucket time-to-live settings.
#[derive(Debug, Clone, Copy)]
pub struct BucketTtls {
    pub crypto: Duration,
    pub fiat: Duration,
    pub metals: Duration,
    pub stocks: Duration,
}

impl BucketTtls {
    pub fn from_config(cache: &CacheConfig) -> Self {
        BucketTtls {
            crypto: Duration::from_secs(cache.crypto_ttl),
            fiat: Duration::from_secs(cache.fiat_ttl),
            metals: Duration::from_secs(cache.metals_ttl),
            stocks: Duration::from_secs(cache.stocks_ttl),
        }
    }
}

/// One upstream adapter per cache bucket.
pub struct EngineSources {
    pub crypto: Arc<dyn PriceSource>,
    pub fiat: Arc<dyn PriceSource>,
    pub metals: Arc<dyn PriceSource>,
    pub stocks_us: Arc<dyn PriceSource>,
    pub stocks_in: Arc<dyn PriceSource>,
}

#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub value: f64,
    pub asset: String,
    pub region: Region,
    pub mode: Mode,
}

/// A source amount expressed in one target asset.
#[derive(Debug, Clone, Serialize)]
pub struct Equivalent {
    pub asset: String,
    pub value: f64,
    pub equiv: String,
    pub updated_at: String,
    pub stale: bool,
    pub sparkline: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub bucket: &'static str,
    pub ok: bool,
}

/// Converts amounts between assets by routing through USD, reading prices
/// from the TTL cache and refreshing buckets on demand.
pub struct ValuationEngine {
    cache: TtlCache,
    oracle: StalenessOracle,
    registry: AssetRegistry,
    catalog: VehicleCatalog,
    ttls: BucketTtls,
    sources: EngineSources,
}

impl ValuationEngine {
    pub fn new(
        cache: TtlCache,
        oracle: StalenessOracle,
        registry: AssetRegistry,
        catalog: VehicleCatalog,
        ttls: BucketTtls,
        sources: EngineSources,
    ) -> Self {
        ValuationEngine {
            cache,
            oracle,
            registry,
            catalog,
            ttls,
            sources,
        }
    }

    pub fn registry(&self) -> &AssetRegistry {
        &self.registry
    }

    async fn crypto_prices(&self) -> Option<PricePayload> {
        let source = Arc::clone(&self.sources.crypto);
        self.cache
            .get_or_refresh(CRYPTO_BUCKET, self.ttls.crypto, move || async move {
                source.fetch().await
            })
            .await
    }

    async fn fiat_rates(&self) -> Option<PricePayload> {
        let source = Arc::clone(&self.sources.fiat);
        self.cache
            .get_or_refresh(FIAT_BUCKET, self.ttls.fiat, move || async move {
                source.fetch().await
            })
            .await
    }

    async fn metal_prices(&self) -> Option<PricePayload> {
        let source = Arc::clone(&self.sources.metals);
        self.cache
            .get_or_refresh(METALS_BUCKET, self.ttls.metals, move || async move {
                source.fetch().await
            })
            .await
    }

    async fn stock_prices(&self, region: Region) -> Option<PricePayload> {
        let source = match region {
            Region::Us => Arc::clone(&self.sources.stocks_us),
            Region::In => Arc::clone(&self.sources.stocks_in),
        };
        self.cache
            .get_or_refresh(region.stocks_bucket(), self.ttls.stocks, move || {
                async move { source.fetch().await }
            })
            .await
    }

    fn price_of(payload: Option<PricePayload>, asset: &str) -> Option<f64> {
        payload
            .and_then(|p| p.get(asset).copied())
            .filter(|price| *price > 0.0)
    }

    /// Converts an amount of `asset` to USD.
    ///
    /// Unrecognized assets, and recognized ones whose bucket cannot be
    /// served, are treated as already USD-denominated. Only a vehicle whose
    /// fiat rate is unreachable fails outright.
    pub async fn to_base(
        &self,
        value: f64,
        asset: &str,
        region: Region,
    ) -> Result<f64, ValuationError> {
        match self.registry.class_of(asset) {
            Some(AssetClass::Crypto) => {
                if let Some(price) = Self::price_of(self.crypto_prices().await, asset) {
                    return Ok(value * price);
                }
            }
            Some(AssetClass::Fiat) => {
                if let Some(rate) = Self::price_of(self.fiat_rates().await, asset) {
                    return Ok(value / rate);
                }
            }
            Some(AssetClass::Metal) => {
                if let Some(price) = Self::price_of(self.metal_prices().await, asset) {
                    return Ok(value * price);
                }
            }
            Some(AssetClass::Equity) => {
                let bucket_region = self.registry.region_of(asset).unwrap_or(region);
                if let Some(price) = Self::price_of(self.stock_prices(bucket_region).await, asset) {
                    return Ok(value * price);
                }
            }
            Some(AssetClass::Vehicle) => {
                let catalog_region = self.registry.region_of(asset).unwrap_or(region);
                if let Some(local_price) = self.catalog.local_price(catalog_region, asset) {
                    return match self.vehicle_price_usd(catalog_region, local_price).await {
                        Some(price_usd) => Ok(value * price_usd),
                        None => Err(ValuationError::Unavailable(asset.to_string())),
                    };
                }
            }
            None => {}
        }

        debug!("No conversion rule for {asset}, assuming USD");
        Ok(value)
    }

    /// Converts a USD amount to a target asset. `None` means the target has
    /// no reachable price and is omitted from the result set; unlike
    /// `to_base` there is no identity fallback.
    pub async fn from_base(&self, usd_value: f64, asset: &str, region: Region) -> Option<f64> {
        match self.registry.class_of(asset)? {
            AssetClass::Crypto => {
                Self::price_of(self.crypto_prices().await, asset).map(|price| usd_value / price)
            }
            AssetClass::Fiat => {
                Self::price_of(self.fiat_rates().await, asset).map(|rate| usd_value * rate)
            }
            AssetClass::Metal => {
                Self::price_of(self.metal_prices().await, asset).map(|price| usd_value / price)
            }
            AssetClass::Equity => {
                let bucket_region = self.registry.region_of(asset).unwrap_or(region);
                Self::price_of(self.stock_prices(bucket_region).await, asset)
                    .map(|price| usd_value / price)
            }
            AssetClass::Vehicle => {
                let catalog_region = self.registry.region_of(asset).unwrap_or(region);
                let local_price = self.catalog.local_price(catalog_region, asset)?;
                let price_usd = self.vehicle_price_usd(catalog_region, local_price).await?;
                Some(usd_value / price_usd)
            }
        }
    }

    /// A vehicle's price in USD. Regional price lists are denominated in the
    /// region's local currency, so non-USD regions route through the fiat
    /// rate table.
    async fn vehicle_price_usd(&self, region: Region, local_price: f64) -> Option<f64> {
        let local_currency = region.local_currency();
        if local_currency == "USD" {
            return Some(local_price);
        }
        Self::price_of(self.fiat_rates().await, local_currency).map(|rate| local_price / rate)
    }

    /// Expresses the requested amount in every other supported asset for the
    /// region. Targets without reachable pricing are omitted; a single
    /// unavailable asset never fails the batch.
    pub async fn convert(
        &self,
        request: &ConversionRequest,
    ) -> Result<Vec<Equivalent>, ValuationError> {
        if !request.value.is_finite() || request.value <= 0.0 {
            return Err(ValuationError::InvalidAmount);
        }

        // The buckets are disjoint, so their refreshes can run concurrently.
        self.warm_buckets(request.region).await;

        let usd_value = self
            .to_base(request.value, &request.asset, request.region)
            .await?;
        debug!(
            "Converted {} {} to {} USD",
            request.value, request.asset, usd_value
        );

        let updated_at = Utc::now().to_rfc3339();
        let mut results = Vec::new();
        for target in self.registry.targets(request.region) {
            if target == request.asset {
                continue;
            }
            let Some(value) = self.from_base(usd_value, &target, request.region).await else {
                debug!("Skipping {target}: no price data reachable");
                continue;
            };
            let class = self
                .registry
                .class_of(&target)
                .unwrap_or(AssetClass::Fiat);
            results.push(Equivalent {
                equiv: format::equivalence(request.value, &request.asset, value, &target, class),
                stale: self.target_is_stale(&target, class),
                sparkline: series::sparkline(SPARKLINE_DAYS),
                updated_at: updated_at.clone(),
                asset: target,
                value,
            });
        }
        Ok(results)
    }

    async fn warm_buckets(&self, region: Region) {
        let (crypto, fiat, metals, stocks) = futures::join!(
            self.crypto_prices(),
            self.fiat_rates(),
            self.metal_prices(),
            self.stock_prices(region),
        );
        for (bucket, payload) in [
            (CRYPTO_BUCKET, crypto),
            (FIAT_BUCKET, fiat),
            (METALS_BUCKET, metals),
            (region.stocks_bucket(), stocks),
        ] {
            if payload.is_none() {
                debug!("Bucket {bucket} has no data after warm-up");
            }
        }
    }

    fn target_is_stale(&self, asset: &str, class: AssetClass) -> bool {
        let (bucket, ttl) = match class {
            AssetClass::Crypto => (CRYPTO_BUCKET, self.ttls.crypto),
            AssetClass::Fiat => (FIAT_BUCKET, self.ttls.fiat),
            AssetClass::Metal => (METALS_BUCKET, self.ttls.metals),
            AssetClass::Equity => {
                let region = self.registry.region_of(asset).unwrap_or(Region::Us);
                (region.stocks_bucket(), self.ttls.stocks)
            }
            // Vehicle prices are static configuration, never stale.
            AssetClass::Vehicle => return false,
        };
        self.oracle.is_stale(bucket, ttl)
    }

    /// Live USD price used to seed overview charts. Only crypto carries one;
    /// other classes chart from a nominal base.
    pub async fn chart_base_price(&self, asset: &str) -> Option<f64> {
        match self.registry.class_of(asset)? {
            AssetClass::Crypto => Self::price_of(self.crypto_prices().await, asset),
            _ => None,
        }
    }

    /// Force-refreshes every bucket, ignoring TTLs. Used by the `refresh`
    /// command to warm the cache out-of-band.
    pub async fn refresh_all<F>(&self, on_bucket_done: F) -> Vec<RefreshOutcome>
    where
        F: Fn(&'static str) + Sync,
    {
        let buckets: [(&'static str, Arc<dyn PriceSource>); 5] = [
            (CRYPTO_BUCKET, Arc::clone(&self.sources.crypto)),
            (FIAT_BUCKET, Arc::clone(&self.sources.fiat)),
            (METALS_BUCKET, Arc::clone(&self.sources.metals)),
            (Region::Us.stocks_bucket(), Arc::clone(&self.sources.stocks_us)),
            (Region::In.stocks_bucket(), Arc::clone(&self.sources.stocks_in)),
        ];

        let refreshes = buckets.map(|(bucket, source)| {
            let on_done = &on_bucket_done;
            async move {
                let ok = match source.fetch().await {
                    Ok(Some(data)) => {
                        self.cache
                            .store()
                            .write(bucket, &CacheEntry::new(Utc::now().timestamp(), data));
                        true
                    }
                    Ok(None) => false,
                    Err(e) => {
                        debug!("Refresh failed for bucket {bucket}: {e}");
                        false
                    }
                };
                on_done(bucket);
                RefreshOutcome { bucket, ok }
            }
        });

        join_all(refreshes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AssetsConfig;
    use crate::store::memory::MemoryStore;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticSource(PricePayload);

    #[async_trait]
    impl PriceSource for StaticSource {
        async fn fetch(&self) -> anyhow::Result<Option<PricePayload>> {
            Ok(Some(self.0.clone()))
        }
    }

    struct FailingSource;

    #[async_trait]
    impl PriceSource for FailingSource {
        async fn fetch(&self) -> anyhow::Result<Option<PricePayload>> {
            Err(anyhow!("upstream unreachable"))
        }
    }

    fn payload(pairs: &[(&str, f64)]) -> PricePayload {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect::<HashMap<_, _>>()
    }

    fn full_fiat_table() -> PricePayload {
        payload(&[
            ("USD", 1.0),
            ("EUR", 0.9),
            ("GBP", 0.8),
            ("INR", 83.0),
            ("JPY", 150.0),
        ])
    }

    struct EngineBuilder {
        store: Arc<MemoryStore>,
        sources: EngineSources,
    }

    impl EngineBuilder {
        fn new() -> Self {
            EngineBuilder {
                store: Arc::new(MemoryStore::new()),
                sources: EngineSources {
                    crypto: Arc::new(StaticSource(payload(&[
                        ("BTC", 65000.0),
                        ("ETH", 3500.0),
                    ]))),
                    fiat: Arc::new(StaticSource(full_fiat_table())),
                    metals: Arc::new(StaticSource(payload(&[("GOLD", 65.0), ("SILVER", 0.85)]))),
                    stocks_us: Arc::new(StaticSource(payload(&[
                        ("AAPL", 150.0),
                        ("GOOGL", 140.0),
                        ("MSFT", 420.0),
                        ("TSLA", 250.0),
                    ]))),
                    stocks_in: Arc::new(StaticSource(payload(&[
                        ("RELIANCE", 2950.0),
                        ("TCS", 3800.0),
                        ("INFY", 1500.0),
                    ]))),
                },
            }
        }

        fn crypto(mut self, source: impl PriceSource + 'static) -> Self {
            self.sources.crypto = Arc::new(source);
            self
        }

        fn fiat(mut self, source: impl PriceSource + 'static) -> Self {
            self.sources.fiat = Arc::new(source);
            self
        }

        fn stocks_us(mut self, source: impl PriceSource + 'static) -> Self {
            self.sources.stocks_us = Arc::new(source);
            self
        }

        fn build(self) -> (ValuationEngine, Arc<MemoryStore>) {
            let assets = AssetsConfig::default();
            let store: Arc<dyn crate::store::Store> = self.store.clone();
            let engine = ValuationEngine::new(
                TtlCache::new(store.clone()),
                StalenessOracle::new(store),
                AssetRegistry::from_assets(&assets),
                VehicleCatalog::from_assets(&assets),
                BucketTtls {
                    crypto: Duration::from_secs(30),
                    fiat: Duration::from_secs(600),
                    metals: Duration::from_secs(900),
                    stocks: Duration::from_secs(300),
                },
                self.sources,
            );
            (engine, self.store)
        }
    }

    fn request(value: f64, asset: &str, region: Region) -> ConversionRequest {
        ConversionRequest {
            value,
            asset: asset.to_string(),
            region,
            mode: Mode::Short,
        }
    }

    #[tokio::test]
    async fn test_fiat_to_base_divides_by_rate() {
        let (engine, _) = EngineBuilder::new().build();
        let usd = engine.to_base(90.0, "EUR", Region::Us).await.unwrap();
        assert!((usd - 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_fiat_from_base_multiplies_by_rate() {
        let (engine, _) = EngineBuilder::new().build();
        let eur = engine.from_base(100.0, "EUR", Region::Us).await.unwrap();
        assert!((eur - 90.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_identity_round_trip() {
        let (engine, _) = EngineBuilder::new().build();
        for asset in ["BTC", "EUR", "GOLD", "AAPL", "Tesla Model 3"] {
            let usd = engine.to_base(2.5, asset, Region::Us).await.unwrap();
            let back = engine.from_base(usd, asset, Region::Us).await.unwrap();
            assert!((back - 2.5).abs() < 1e-9, "round trip failed for {asset}");
        }
    }

    #[tokio::test]
    async fn test_crypto_uses_unit_price() {
        let (engine, _) = EngineBuilder::new().build();
        let usd = engine.to_base(2.0, "BTC", Region::Us).await.unwrap();
        assert!((usd - 130000.0).abs() < 1e-9);

        let btc = engine.from_base(130000.0, "BTC", Region::Us).await.unwrap();
        assert!((btc - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_equity_resolves_through_its_own_region_bucket() {
        let (engine, _) = EngineBuilder::new().build();
        // RELIANCE is region-scoped to IN; 2950 INR-listed price is stored in
        // USD by the adapter, so the value is used as-is.
        let usd = engine.to_base(1.0, "RELIANCE", Region::In).await.unwrap();
        assert!((usd - 2950.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_vehicle_in_routes_through_inr_rate() {
        let (engine, _) = EngineBuilder::new().build();
        let usd = engine
            .to_base(1.0, "Maruti Swift", Region::In)
            .await
            .unwrap();
        assert!((usd - 850000.0 / 83.0).abs() < 1e-6);
        assert!((usd - 10240.96).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_vehicle_us_is_usd_denominated() {
        let (engine, _) = EngineBuilder::new().build();
        let usd = engine
            .to_base(2.0, "Tesla Model 3", Region::Us)
            .await
            .unwrap();
        assert!((usd - 76000.0).abs() < 1e-9);

        let cars = engine
            .from_base(76000.0, "Tesla Model 3", Region::Us)
            .await
            .unwrap();
        assert!((cars - 2.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_vehicle_without_fiat_rate_is_unavailable() {
        let (engine, _) = EngineBuilder::new().fiat(FailingSource).build();

        let result = engine.to_base(1.0, "Maruti Swift", Region::In).await;
        assert_eq!(
            result,
            Err(ValuationError::Unavailable("Maruti Swift".to_string()))
        );

        assert!(
            engine
                .from_base(10000.0, "Maruti Swift", Region::In)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unknown_source_falls_back_to_identity() {
        let (engine, _) = EngineBuilder::new().build();
        let usd = engine.to_base(55.0, "ZZZ", Region::Us).await.unwrap();
        assert_eq!(usd, 55.0);
    }

    #[tokio::test]
    async fn test_unknown_target_is_omitted_not_an_error() {
        let (engine, _) = EngineBuilder::new().build();
        assert!(engine.from_base(100.0, "ZZZ", Region::Us).await.is_none());
    }

    #[tokio::test]
    async fn test_crypto_source_down_without_cache_degrades_to_identity() {
        let (engine, _) = EngineBuilder::new().crypto(FailingSource).build();
        // Nothing cached and the upstream is down: the permissive default
        // treats the amount as USD.
        let usd = engine.to_base(1.0, "BTC", Region::Us).await.unwrap();
        assert_eq!(usd, 1.0);
    }

    #[tokio::test]
    async fn test_convert_rejects_non_positive_amounts() {
        let (engine, _) = EngineBuilder::new().build();
        for bad in [0.0, -5.0, f64::NAN] {
            let result = engine.convert(&request(bad, "USD", Region::Us)).await;
            assert_eq!(result.unwrap_err(), ValuationError::InvalidAmount);
        }
    }

    #[tokio::test]
    async fn test_convert_excludes_the_source_asset() {
        let (engine, _) = EngineBuilder::new().build();
        let results = engine
            .convert(&request(100.0, "USD", Region::Us))
            .await
            .unwrap();
        assert!(results.iter().all(|e| e.asset != "USD"));
        assert!(results.iter().any(|e| e.asset == "EUR"));
    }

    #[tokio::test]
    async fn test_convert_produces_region_scoped_targets() {
        let (engine, _) = EngineBuilder::new().build();
        let results = engine
            .convert(&request(100.0, "USD", Region::In))
            .await
            .unwrap();

        let assets: Vec<&str> = results.iter().map(|e| e.asset.as_str()).collect();
        assert!(assets.contains(&"RELIANCE"));
        assert!(assets.contains(&"Maruti Swift"));
        assert!(!assets.contains(&"AAPL"));
        assert!(!assets.contains(&"Tesla Model 3"));

        let eur = results.iter().find(|e| e.asset == "EUR").unwrap();
        assert!((eur.value - 90.0).abs() < 1e-9);
        assert_eq!(eur.equiv, "$100.00 ≈ 90.00 €");
        assert!(!eur.stale);
        assert_eq!(eur.sparkline.len(), 31);
    }

    #[tokio::test]
    async fn test_convert_omits_unreachable_targets_and_keeps_the_rest() {
        let (engine, _) = EngineBuilder::new().stocks_us(FailingSource).build();
        let results = engine
            .convert(&request(100.0, "USD", Region::Us))
            .await
            .unwrap();

        let assets: Vec<&str> = results.iter().map(|e| e.asset.as_str()).collect();
        assert!(!assets.contains(&"AAPL"));
        assert!(assets.contains(&"BTC"));
        assert!(assets.contains(&"EUR"));
        assert!(assets.contains(&"GOLD"));
    }

    #[tokio::test]
    async fn test_convert_serves_stale_payload_with_stale_flag() {
        let builder = EngineBuilder::new().fiat(FailingSource);
        let now = Utc::now().timestamp();
        builder.store.write(
            FIAT_BUCKET,
            &CacheEntry::new(now - 3600, full_fiat_table()),
        );
        let (engine, _) = builder.build();

        let results = engine
            .convert(&request(100.0, "USD", Region::Us))
            .await
            .unwrap();

        let eur = results.iter().find(|e| e.asset == "EUR").unwrap();
        assert!((eur.value - 90.0).abs() < 1e-9);
        assert!(eur.stale);

        // Fresh buckets are not flagged.
        let btc = results.iter().find(|e| e.asset == "BTC").unwrap();
        assert!(!btc.stale);
    }

    #[tokio::test]
    async fn test_refresh_all_reports_per_bucket_outcomes() {
        let (engine, store) = EngineBuilder::new().crypto(FailingSource).build();
        let outcomes = engine.refresh_all(|_| {}).await;

        assert_eq!(outcomes.len(), 5);
        let by_bucket: HashMap<&str, bool> =
            outcomes.iter().map(|o| (o.bucket, o.ok)).collect();
        assert!(!by_bucket["crypto"]);
        assert!(by_bucket["fiat"]);
        assert!(by_bucket["stocks_in"]);

        assert!(store.read("fiat").is_some());
        assert!(store.read("crypto").is_none());
    }
}
