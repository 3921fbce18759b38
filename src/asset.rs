//! Asset classification and the identifier registry

use crate::config::{AssetsConfig, Vehicle};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

pub const CRYPTO_ASSETS: [&str; 2] = ["BTC", "ETH"];
pub const FIAT_ASSETS: [&str; 5] = ["USD", "EUR", "GBP", "INR", "JPY"];
pub const METAL_ASSETS: [&str; 2] = ["GOLD", "SILVER"];

/// Determines which price bucket an asset resolves through and the decimal
/// precision used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetClass {
    Crypto,
    Fiat,
    Metal,
    Equity,
    Vehicle,
}

impl AssetClass {
    /// Decimal places used when rendering a converted value.
    pub fn display_decimals(&self) -> usize {
        match self {
            AssetClass::Crypto => 8,
            _ => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    Us,
    In,
}

impl Region {
    /// The currency region-scoped price lists are denominated in.
    pub fn local_currency(&self) -> &'static str {
        match self {
            Region::Us => "USD",
            Region::In => "INR",
        }
    }

    /// The cache bucket holding this region's equity prices.
    pub fn stocks_bucket(&self) -> &'static str {
        match self {
            Region::Us => "stocks_us",
            Region::In => "stocks_in",
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Region::Us => "US",
                Region::In => "IN",
            }
        )
    }
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "US" => Ok(Region::Us),
            "IN" => Ok(Region::In),
            _ => Err(anyhow::anyhow!("Invalid region: {}", s)),
        }
    }
}

/// Requested horizon. Only affects presentation, never conversion math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Short,
    Long,
}

impl Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Mode::Short => "short",
                Mode::Long => "long",
            }
        )
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(Mode::Short),
            "long" => Ok(Mode::Long),
            _ => Err(anyhow::anyhow!("Invalid horizon mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
struct RegistryEntry {
    id: String,
    class: AssetClass,
    region: Option<Region>,
}

/// Maps asset identifiers to their class and region affinity.
///
/// Dispatch in the valuation engine is a single lookup here plus a pattern
/// match, instead of chained identifier comparisons.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    entries: Vec<RegistryEntry>,
}

impl AssetRegistry {
    pub fn from_assets(assets: &AssetsConfig) -> Self {
        let mut entries = Vec::new();
        for id in CRYPTO_ASSETS {
            entries.push(RegistryEntry {
                id: id.to_string(),
                class: AssetClass::Crypto,
                region: None,
            });
        }
        for id in FIAT_ASSETS {
            entries.push(RegistryEntry {
                id: id.to_string(),
                class: AssetClass::Fiat,
                region: None,
            });
        }
        for id in METAL_ASSETS {
            entries.push(RegistryEntry {
                id: id.to_string(),
                class: AssetClass::Metal,
                region: None,
            });
        }
        for symbol in &assets.stocks_us {
            entries.push(RegistryEntry {
                id: symbol.clone(),
                class: AssetClass::Equity,
                region: Some(Region::Us),
            });
        }
        for symbol in &assets.stocks_in {
            entries.push(RegistryEntry {
                id: symbol.clone(),
                class: AssetClass::Equity,
                region: Some(Region::In),
            });
        }
        for vehicle in &assets.vehicles_us {
            entries.push(RegistryEntry {
                id: vehicle.model.clone(),
                class: AssetClass::Vehicle,
                region: Some(Region::Us),
            });
        }
        for vehicle in &assets.vehicles_in {
            entries.push(RegistryEntry {
                id: vehicle.model.clone(),
                class: AssetClass::Vehicle,
                region: Some(Region::In),
            });
        }
        AssetRegistry { entries }
    }

    pub fn class_of(&self, id: &str) -> Option<AssetClass> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.class)
    }

    /// Region affinity for region-scoped assets; `None` for global ones.
    pub fn region_of(&self, id: &str) -> Option<Region> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .and_then(|e| e.region)
    }

    /// All conversion targets for a request region, in display order:
    /// crypto, fiat, metals, then the region's equities and vehicles.
    pub fn targets(&self, region: Region) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| e.region.is_none() || e.region == Some(region))
            .map(|e| e.id.clone())
            .collect()
    }
}

/// Static vehicle price lists, keyed by region and denominated in the
/// region's local currency.
#[derive(Debug, Clone)]
pub struct VehicleCatalog {
    us: Vec<Vehicle>,
    india: Vec<Vehicle>,
}

impl VehicleCatalog {
    pub fn from_assets(assets: &AssetsConfig) -> Self {
        VehicleCatalog {
            us: assets.vehicles_us.clone(),
            india: assets.vehicles_in.clone(),
        }
    }

    /// Sticker price of a model in the region's local currency.
    pub fn local_price(&self, region: Region, model: &str) -> Option<f64> {
        let list = match region {
            Region::Us => &self.us,
            Region::In => &self.india,
        };
        list.iter().find(|v| v.model == model).map(|v| v.price)
    }
}
