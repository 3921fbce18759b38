//! Synthetic time series for sparklines and overview charts
//!
//! Pseudo-random walks, not real history; used purely as visual filler.

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use serde::Serialize;

pub const SPARKLINE_DAYS: usize = 30;

/// A daily random walk starting from a nominal base of 100, rounded to two
/// decimals per point. Returns `days + 1` points, oldest first.
pub fn sparkline(days: usize) -> Vec<f64> {
    let mut rng = rand::thread_rng();
    let mut price = 100.0;
    let mut data = Vec::with_capacity(days + 1);
    for _ in 0..=days {
        let variation = rng.gen_range(-100..=100) as f64 / 1000.0;
        price *= 1.0 + variation;
        data.push((price * 100.0).round() / 100.0);
    }
    data
}

#[derive(Debug, Clone, Serialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// A dated walk over `points + 1` samples spread across `days`, seeded at
/// `base_price` with a slight upward trend (stronger for short horizons).
pub fn chart_series(base_price: f64, days: i64, points: usize, short_term: bool) -> Vec<SeriesPoint> {
    let mut rng = rand::thread_rng();
    let trend = if short_term { 0.001 } else { 0.0005 };
    let interval = days as f64 / points as f64;
    let today = Utc::now().date_naive();

    let mut price = base_price;
    let mut data = Vec::with_capacity(points + 1);
    for i in (0..=points).rev() {
        let days_ago = (i as f64 * interval).round() as i64;
        let volatility = rng.gen_range(-500..=500) as f64 / 10000.0;
        price *= 1.0 + trend + volatility;
        data.push(SeriesPoint {
            date: today - Duration::days(days_ago),
            value: (price * 100.0).round() / 100.0,
        });
    }
    data
}
