//! Multi-day driver and per-day aggregate statistics.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agents::Population;
use crate::inflation::{InflationDrift, apply_inflation};
use crate::market::{Transaction, run_day};
use crate::rules::TradingRules;
use crate::types::Price;

// === STATISTICS ===

/// Aggregates for one trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct DayStats {
    pub day: u64,
    pub transactions: usize,
    pub seller_surplus: f64,
    pub buyer_surplus: f64,
    /// `None` on days without a single trade.
    pub average_price: Option<Price>,
    pub unsold_sellers: usize,
    pub unsatisfied_buyers: usize,
}

impl DayStats {
    pub fn summarize(day: u64, population: &Population, transactions: &[Transaction]) -> Self {
        let seller_surplus = transactions.iter().map(|t| t.seller_surplus).sum();
        let buyer_surplus = transactions.iter().map(|t| t.buyer_surplus).sum();
        let average_price = if transactions.is_empty() {
            None
        } else {
            let total: Price = transactions.iter().map(|t| t.price).sum();
            Some(total / transactions.len() as f64)
        };

        Self {
            day,
            transactions: transactions.len(),
            seller_surplus,
            buyer_surplus,
            average_price,
            unsold_sellers: population.unsold_sellers(),
            unsatisfied_buyers: population.unsatisfied_buyers(),
        }
    }
}

/// Day-indexed columns, one entry per simulated day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct DailySeries {
    pub average_price: Vec<Option<Price>>,
    pub seller_surplus: Vec<f64>,
    pub buyer_surplus: Vec<f64>,
    pub unsold_sellers: Vec<usize>,
    pub unsatisfied_buyers: Vec<usize>,
    pub transactions: Vec<usize>,
}

impl DailySeries {
    pub fn with_capacity(days: usize) -> Self {
        Self {
            average_price: Vec::with_capacity(days),
            seller_surplus: Vec::with_capacity(days),
            buyer_surplus: Vec::with_capacity(days),
            unsold_sellers: Vec::with_capacity(days),
            unsatisfied_buyers: Vec::with_capacity(days),
            transactions: Vec::with_capacity(days),
        }
    }

    pub fn push(&mut self, stats: &DayStats) {
        self.average_price.push(stats.average_price);
        self.seller_surplus.push(stats.seller_surplus);
        self.buyer_surplus.push(stats.buyer_surplus);
        self.unsold_sellers.push(stats.unsold_sellers);
        self.unsatisfied_buyers.push(stats.unsatisfied_buyers);
        self.transactions.push(stats.transactions);
    }

    /// Append every day of `other`, in order.
    pub fn extend(&mut self, other: &DailySeries) {
        self.average_price.extend_from_slice(&other.average_price);
        self.seller_surplus.extend_from_slice(&other.seller_surplus);
        self.buyer_surplus.extend_from_slice(&other.buyer_surplus);
        self.unsold_sellers.extend_from_slice(&other.unsold_sellers);
        self.unsatisfied_buyers.extend_from_slice(&other.unsatisfied_buyers);
        self.transactions.extend_from_slice(&other.transactions);
    }

    pub fn len(&self) -> usize {
        self.average_price.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reassemble the aggregates of day `index`.
    pub fn day(&self, index: usize) -> Option<DayStats> {
        Some(DayStats {
            day: index as u64,
            transactions: *self.transactions.get(index)?,
            seller_surplus: *self.seller_surplus.get(index)?,
            buyer_surplus: *self.buyer_surplus.get(index)?,
            average_price: *self.average_price.get(index)?,
            unsold_sellers: *self.unsold_sellers.get(index)?,
            unsatisfied_buyers: *self.unsatisfied_buyers.get(index)?,
        })
    }
}

// === DRIVER ===

/// Run a single day: inflation (if configured), trading, aggregation.
pub fn advance_day<R: Rng>(
    day: u64,
    population: &mut Population,
    inflation: Option<&InflationDrift>,
    rules: &TradingRules,
    rng: &mut R,
) -> DayStats {
    if let Some(drift) = inflation {
        apply_inflation(population, drift, rng);
    }

    let transactions = run_day(population, rules, rng);
    let stats = DayStats::summarize(day, population, &transactions);

    #[cfg(feature = "instrument")]
    {
        use crate::types::KeyToU64;

        for t in &transactions {
            tracing::info!(
                target: "trade",
                day = day,
                seller_id = t.seller.to_u64(),
                buyer_id = t.buyer.to_u64(),
                price = t.price,
                seller_surplus = t.seller_surplus,
                buyer_surplus = t.buyer_surplus,
            );
        }
        tracing::info!(
            target: "day",
            day = day,
            transactions = stats.transactions as u64,
            seller_surplus = stats.seller_surplus,
            buyer_surplus = stats.buyer_surplus,
            average_price = stats.average_price.unwrap_or(f64::NAN),
            unsold_sellers = stats.unsold_sellers as u64,
            unsatisfied_buyers = stats.unsatisfied_buyers as u64,
        );
    }

    stats
}

/// Run `days` consecutive trading days and collect their aggregates.
///
/// The returned series is built fresh on every call and has exactly `days`
/// entries. Same precondition on `rules` as [`run_day`].
pub fn simulate<R: Rng>(
    population: &mut Population,
    days: usize,
    inflation: Option<&InflationDrift>,
    rules: &TradingRules,
    rng: &mut R,
) -> DailySeries {
    let mut series = DailySeries::with_capacity(days);
    for day in 0..days {
        let stats = advance_day(day as u64, population, inflation, rules, rng);
        series.push(&stats);
    }
    series
}
