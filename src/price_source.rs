//! Upstream price source abstraction

use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A snapshot of USD-relative prices for one bucket: asset identifier to unit
/// price in USD, or fiat code to USD-to-code rate.
pub type PricePayload = HashMap<String, f64>;

/// Fetches current prices for a fixed asset set from one upstream provider.
///
/// Implementations signal expected absence (HTTP non-200, timeout, missing
/// fields) with `Ok(None)` and reserve `Err` for unexpected failures; the
/// cache layer logs either and falls back to stale data.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self) -> Result<Option<PricePayload>>;
}
