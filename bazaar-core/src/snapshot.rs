use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agents::Population;
use crate::types::{KeyToU64, Price};

// ============================================================================
// Snapshot Types (for rendering agent state in JS)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct SellerSnapshot {
    pub id: u64,
    pub min_price: Price,
    pub expected_price: Price,
    pub sold_today: bool,
    pub days_without_sale: u32,
    pub total_surplus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct BuyerSnapshot {
    pub id: u64,
    pub max_price: Price,
    pub expected_price: Price,
    pub days_without_buying: u32,
    pub total_surplus: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct AgentsSnapshot {
    pub day: u64,
    pub sellers: Vec<SellerSnapshot>,
    pub buyers: Vec<BuyerSnapshot>,
}

impl AgentsSnapshot {
    pub fn capture(day: u64, population: &Population) -> Self {
        Self {
            day,
            sellers: population
                .sellers()
                .map(|(id, s)| SellerSnapshot {
                    id: id.to_u64(),
                    min_price: s.min_price(),
                    expected_price: s.expected_price(),
                    sold_today: s.sold_today(),
                    days_without_sale: s.days_without_sale(),
                    total_surplus: s.total_surplus(),
                })
                .collect(),
            buyers: population
                .buyers()
                .map(|(id, b)| BuyerSnapshot {
                    id: id.to_u64(),
                    max_price: b.max_price(),
                    expected_price: b.expected_price(),
                    days_without_buying: b.days_without_buying(),
                    total_surplus: b.total_surplus(),
                })
                .collect(),
        }
    }
}
