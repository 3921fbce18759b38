pub mod asset;
pub mod cache;
pub mod config;
pub mod convert;
pub mod engine;
pub mod format;
pub mod log;
pub mod overview;
pub mod price_source;
pub mod providers;
pub mod refresh;
pub mod series;
pub mod staleness;
pub mod store;
pub mod ui;

use crate::asset::{AssetRegistry, Mode, Region, VehicleCatalog};
use crate::cache::TtlCache;
use crate::config::AppConfig;
use crate::engine::{BucketTtls, ConversionRequest, EngineSources, ValuationEngine};
use crate::providers::coingecko::CoinGeckoProvider;
use crate::providers::exchange_rate::ExchangeRateProvider;
use crate::providers::metals_live::MetalsProvider;
use crate::providers::yahoo_finance::YahooEquityProvider;
use crate::staleness::StalenessOracle;
use crate::store::Store;
use crate::store::disk::DiskStore;
use crate::store::memory::MemoryStore;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub enum AppCommand {
    Convert {
        value: f64,
        asset: String,
        region: Region,
        mode: Mode,
    },
    Overview {
        asset: String,
        mode: Mode,
    },
    Refresh,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("equiv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let engine = build_engine(&config)?;

    match command {
        AppCommand::Convert {
            value,
            asset,
            region,
            mode,
        } => {
            convert::run_convert(
                &engine,
                ConversionRequest {
                    value,
                    asset,
                    region,
                    mode,
                },
            )
            .await
        }
        AppCommand::Overview { asset, mode } => convert::run_overview(&engine, &asset, mode).await,
        AppCommand::Refresh => refresh::run_refresh(&engine).await,
    }
}

/// Wires the store, cache, registry and upstream adapters into an engine.
pub fn build_engine(config: &AppConfig) -> Result<ValuationEngine> {
    let store = open_store(config);
    let cache = TtlCache::new(Arc::clone(&store));
    let oracle = StalenessOracle::new(store);

    let coingecko_url = config
        .providers
        .coingecko
        .as_ref()
        .map_or("https://api.coingecko.com", |p| &p.base_url);
    let exchange_rate_url = config
        .providers
        .exchange_rate
        .as_ref()
        .map_or("https://api.exchangerate.host", |p| &p.base_url);
    let metals_url = config
        .providers
        .metals
        .as_ref()
        .map_or("https://api.metals.live", |p| &p.base_url);
    let yahoo_url = config
        .providers
        .yahoo
        .as_ref()
        .map_or("https://query2.finance.yahoo.com", |p| &p.base_url);

    let sources = EngineSources {
        crypto: Arc::new(CoinGeckoProvider::new(coingecko_url)),
        fiat: Arc::new(ExchangeRateProvider::new(exchange_rate_url)),
        metals: Arc::new(MetalsProvider::new(metals_url)),
        stocks_us: Arc::new(YahooEquityProvider::new(
            yahoo_url,
            config.assets.stocks_us.clone(),
            "",
        )),
        stocks_in: Arc::new(YahooEquityProvider::new(
            yahoo_url,
            config.assets.stocks_in.clone(),
            ".NS",
        )),
    };

    Ok(ValuationEngine::new(
        cache,
        oracle,
        AssetRegistry::from_assets(&config.assets),
        VehicleCatalog::from_assets(&config.assets),
        BucketTtls::from_config(&config.cache),
        sources,
    ))
}

fn open_store(config: &AppConfig) -> Arc<dyn Store> {
    let disk = config
        .default_data_path()
        .and_then(|path| DiskStore::open(&path.join("cache")));
    match disk {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Could not open on-disk cache ({e}), falling back to in-memory cache");
            Arc::new(MemoryStore::new())
        }
    }
}
