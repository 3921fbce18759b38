use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    pub coingecko: Option<ProviderEndpoint>,
    pub exchange_rate: Option<ProviderEndpoint>,
    pub metals: Option<ProviderEndpoint>,
    pub yahoo: Option<ProviderEndpoint>,
}

/// Cache refresh intervals, per bucket, in seconds.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CacheConfig {
    #[serde(default = "default_crypto_ttl")]
    pub crypto_ttl: u64,
    #[serde(default = "default_fiat_ttl")]
    pub fiat_ttl: u64,
    #[serde(default = "default_metals_ttl")]
    pub metals_ttl: u64,
    #[serde(default = "default_stocks_ttl")]
    pub stocks_ttl: u64,
}

fn default_crypto_ttl() -> u64 {
    30
}

fn default_fiat_ttl() -> u64 {
    600
}

fn default_metals_ttl() -> u64 {
    900
}

fn default_stocks_ttl() -> u64 {
    300
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            crypto_ttl: default_crypto_ttl(),
            fiat_ttl: default_fiat_ttl(),
            metals_ttl: default_metals_ttl(),
            stocks_ttl: default_stocks_ttl(),
        }
    }
}

/// A vehicle model and its sticker price in the region's local currency.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Vehicle {
    pub model: String,
    pub price: f64,
}

/// The supported asset universe. Equities and vehicles are region scoped,
/// everything else is global.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetsConfig {
    #[serde(default = "default_stocks_us")]
    pub stocks_us: Vec<String>,
    #[serde(default = "default_stocks_in")]
    pub stocks_in: Vec<String>,
    #[serde(default = "default_vehicles_us")]
    pub vehicles_us: Vec<Vehicle>,
    #[serde(default = "default_vehicles_in")]
    pub vehicles_in: Vec<Vehicle>,
}

fn default_stocks_us() -> Vec<String> {
    ["AAPL", "GOOGL", "MSFT", "TSLA"]
        .map(String::from)
        .to_vec()
}

fn default_stocks_in() -> Vec<String> {
    ["RELIANCE", "TCS", "INFY"].map(String::from).to_vec()
}

fn default_vehicles_us() -> Vec<Vehicle> {
    vec![
        Vehicle {
            model: "Tesla Model 3".to_string(),
            price: 38000.0,
        },
        Vehicle {
            model: "Toyota Camry".to_string(),
            price: 26000.0,
        },
        Vehicle {
            model: "Honda Accord".to_string(),
            price: 27000.0,
        },
        Vehicle {
            model: "Ford F-150".to_string(),
            price: 35000.0,
        },
    ]
}

fn default_vehicles_in() -> Vec<Vehicle> {
    vec![
        Vehicle {
            model: "Maruti Swift".to_string(),
            price: 850000.0,
        },
        Vehicle {
            model: "Hyundai Creta".to_string(),
            price: 1200000.0,
        },
        Vehicle {
            model: "Mahindra XUV700".to_string(),
            price: 1500000.0,
        },
        Vehicle {
            model: "Tata Nexon".to_string(),
            price: 800000.0,
        },
    ]
}

impl Default for AssetsConfig {
    fn default() -> Self {
        AssetsConfig {
            stocks_us: default_stocks_us(),
            stocks_in: default_stocks_in(),
            vehicles_us: default_vehicles_us(),
            vehicles_in: default_vehicles_in(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    pub data_path: Option<String>,
}

impl AppConfig {
    /// Loads the default config file, falling back to built-in defaults when
    /// no config file has been set up yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file found, using defaults");
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "codito", "equiv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("in", "codito", "equiv")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
