//! Narrative asset overviews
//!
//! Opinionated per-asset copy plus a simulated chart series. Purely
//! presentational; none of this feeds back into conversion math.

use crate::asset::{AssetClass, Mode, Region};
use crate::engine::ValuationEngine;
use crate::series::{self, SeriesPoint};
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Confidence::Low => "low",
                Confidence::Medium => "medium",
                Confidence::High => "high",
            }
        )
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Overview {
    pub summary: String,
    pub bullets: Vec<String>,
    pub confidence: Confidence,
    pub chart_data: Vec<SeriesPoint>,
}

pub async fn generate(engine: &ValuationEngine, asset: &str, mode: Mode) -> Overview {
    let short_term = mode == Mode::Short;
    let (days, points) = if short_term { (180, 30) } else { (1825, 60) };

    let base_price = engine.chart_base_price(asset).await.unwrap_or(100.0);
    let chart_data = series::chart_series(base_price, days, points, short_term);

    let registry = engine.registry();
    let (summary, bullets, confidence) = narrative(
        asset,
        registry.class_of(asset),
        registry.region_of(asset),
        short_term,
    );

    Overview {
        summary: summary.to_string(),
        bullets: bullets.iter().map(|b| b.to_string()).collect(),
        confidence,
        chart_data,
    }
}

fn narrative(
    asset: &str,
    class: Option<AssetClass>,
    region: Option<Region>,
    short_term: bool,
) -> (&'static str, [&'static str; 4], Confidence) {
    match (asset, class) {
        ("BTC", _) if short_term => (
            "Bitcoin shows strong momentum with increasing institutional adoption and ETF inflows.",
            [
                "ETF demand continues to support price stability and growth.",
                "Halving cycle effects expected to impact supply dynamics.",
                "Short-term volatility may persist due to macroeconomic factors.",
                "Regulatory clarity improving in major markets.",
            ],
            Confidence::Medium,
        ),
        ("BTC", _) => (
            "Bitcoin's long-term outlook remains positive with growing mainstream acceptance.",
            [
                "Store of value narrative gaining traction among institutions.",
                "Limited supply and increasing adoption support long-term appreciation.",
                "Technological improvements enhance scalability and utility.",
                "Potential for significant price appreciation over 5-year horizon.",
            ],
            Confidence::High,
        ),
        ("ETH", _) if short_term => (
            "Ethereum benefits from network upgrades and DeFi ecosystem growth.",
            [
                "Layer 2 solutions improving transaction efficiency.",
                "Staking rewards attracting long-term holders.",
                "DeFi and NFT markets driving utility demand.",
                "Upcoming upgrades may impact short-term volatility.",
            ],
            Confidence::Medium,
        ),
        ("ETH", _) => (
            "Ethereum's transition to proof-of-stake positions it well for long-term growth.",
            [
                "Sustainable tokenomics with deflationary mechanism.",
                "Dominant platform for smart contracts and dApps.",
                "Growing enterprise adoption and institutional interest.",
                "Strong developer community and continuous innovation.",
            ],
            Confidence::High,
        ),
        (_, Some(AssetClass::Fiat)) if short_term => (
            "Currency markets influenced by central bank policies and economic indicators.",
            [
                "Interest rate decisions impact currency strength.",
                "Inflation data drives monetary policy expectations.",
                "Geopolitical events create short-term volatility.",
                "Trade balance and economic growth affect valuation.",
            ],
            Confidence::Low,
        ),
        (_, Some(AssetClass::Fiat)) => (
            "Long-term currency trends depend on economic fundamentals and policy stability.",
            [
                "Economic growth rates determine currency appreciation potential.",
                "Central bank credibility and policy consistency matter.",
                "Demographic trends and productivity affect long-term value.",
                "Currency diversification remains important for portfolios.",
            ],
            Confidence::Medium,
        ),
        ("GOLD", _) if short_term => (
            "Gold prices respond to inflation expectations and dollar strength.",
            [
                "Central bank buying supports demand.",
                "Inflation hedge characteristics attract investors.",
                "Dollar strength inversely correlates with gold prices.",
                "Geopolitical tensions increase safe-haven demand.",
            ],
            Confidence::Medium,
        ),
        ("GOLD", _) => (
            "Gold maintains its role as a long-term store of value and portfolio diversifier.",
            [
                "Historical preservation of purchasing power over decades.",
                "Limited supply and mining constraints support prices.",
                "Central bank reserves continue to accumulate gold.",
                "Inflation protection remains relevant long-term.",
            ],
            Confidence::High,
        ),
        ("SILVER", _) if short_term => (
            "Silver prices influenced by industrial demand and gold correlation.",
            [
                "Industrial applications drive significant demand.",
                "Solar panel and electronics manufacturing support prices.",
                "Higher volatility than gold due to smaller market.",
                "Investment demand complements industrial usage.",
            ],
            Confidence::Medium,
        ),
        ("SILVER", _) => (
            "Silver benefits from both investment and industrial demand over long term.",
            [
                "Green energy transition increases industrial demand.",
                "Affordable alternative to gold for investors.",
                "Supply constraints in mining sector.",
                "Dual role as precious and industrial metal.",
            ],
            Confidence::Medium,
        ),
        (_, Some(AssetClass::Equity)) if region == Some(Region::In) && short_term => (
            "Indian stocks reflect economic growth and sector-specific trends.",
            [
                "Domestic consumption and infrastructure spending support growth.",
                "IT sector benefits from digital transformation.",
                "Regulatory reforms and policy stability matter.",
                "Currency fluctuations impact export-oriented companies.",
            ],
            Confidence::Medium,
        ),
        (_, Some(AssetClass::Equity)) if region == Some(Region::In) => (
            "Indian equities offer long-term growth potential with demographic advantages.",
            [
                "Young population and rising middle class drive consumption.",
                "Infrastructure development creates investment opportunities.",
                "Technology and services sectors show strong fundamentals.",
                "Economic reforms support sustainable growth.",
            ],
            Confidence::High,
        ),
        (_, Some(AssetClass::Equity)) if short_term => (
            "Tech stocks face market volatility but maintain strong fundamentals.",
            [
                "Earnings growth and innovation drive performance.",
                "Market sentiment and interest rates impact valuations.",
                "Regulatory environment affects sector outlook.",
                "Product cycles and competitive dynamics matter.",
            ],
            Confidence::Medium,
        ),
        (_, Some(AssetClass::Equity)) => (
            "Leading tech companies positioned for long-term growth with strong moats.",
            [
                "Market leadership and competitive advantages.",
                "Continuous innovation and R&D investments.",
                "Global expansion and market penetration.",
                "Dividend growth and shareholder returns.",
            ],
            Confidence::High,
        ),
        _ => (
            "Asset performance depends on market conditions and fundamental factors.",
            [
                "Market trends and economic indicators influence prices.",
                "Supply and demand dynamics determine valuation.",
                "External factors create short-term volatility.",
                "Long-term outlook based on fundamental analysis.",
            ],
            Confidence::Low,
        ),
    }
}
