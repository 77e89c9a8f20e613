//! Initial population generation.
//!
//! Reservation bounds and starting expectations are drawn from triangular
//! distributions. The default shapes overlap, so a drawn expectation can land
//! on the wrong side of its agent's bound; it is clamped onto the bound before
//! the agent is constructed.

use rand::Rng;
use rand_distr::{Distribution, Triangular};
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agents::{Buyer, Population, Seller};
use crate::error::{MarketError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct TriangularSpec {
    pub low: f64,
    pub high: f64,
    pub mode: f64,
}

impl TriangularSpec {
    pub const fn new(low: f64, high: f64, mode: f64) -> Self {
        Self { low, high, mode }
    }

    fn distribution(&self) -> Result<Triangular<f64>> {
        let invalid = || MarketError::InvalidDistribution {
            low: self.low,
            high: self.high,
            mode: self.mode,
        };
        let ordered = self.low < self.high && self.low <= self.mode && self.mode <= self.high;
        if !ordered || self.low < 0.0 || !self.high.is_finite() {
            return Err(invalid());
        }
        Triangular::new(self.low, self.high, self.mode).map_err(|_| invalid())
    }
}

/// How to generate one side of the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct SideSpec {
    pub count: usize,
    /// Reservation bound: `min_price` for sellers, `max_price` for buyers.
    pub bound: TriangularSpec,
    pub expected: TriangularSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct PopulationSpec {
    pub sellers: SideSpec,
    pub buyers: SideSpec,
}

impl Default for PopulationSpec {
    fn default() -> Self {
        // Side sizes differ by one so the unsold and unsatisfied series stay distinguishable.
        Self {
            sellers: SideSpec {
                count: 105,
                bound: TriangularSpec::new(10.0, 50.0, 20.0),
                expected: TriangularSpec::new(5.0, 55.0, 30.0),
            },
            buyers: SideSpec {
                count: 104,
                bound: TriangularSpec::new(20.0, 60.0, 50.0),
                expected: TriangularSpec::new(5.0, 50.0, 30.0),
            },
        }
    }
}

impl PopulationSpec {
    pub fn validate(&self) -> Result<()> {
        for side in [&self.sellers, &self.buyers] {
            side.bound.distribution()?;
            side.expected.distribution()?;
        }
        Ok(())
    }
}

/// Draw a fresh population.
///
/// Per agent the bound is drawn before the expectation; all sellers are drawn
/// before any buyer.
pub fn bootstrap<R: Rng>(spec: &PopulationSpec, rng: &mut R) -> Result<Population> {
    let mut population = Population::new();

    let min_price = spec.sellers.bound.distribution()?;
    let seller_expected = spec.sellers.expected.distribution()?;
    for _ in 0..spec.sellers.count {
        let min = min_price.sample(rng);
        let expected = seller_expected.sample(rng).max(min);
        population.add_seller(Seller::new(min, expected)?);
    }

    let max_price = spec.buyers.bound.distribution()?;
    let buyer_expected = spec.buyers.expected.distribution()?;
    for _ in 0..spec.buyers.count {
        let max = max_price.sample(rng);
        let expected = buyer_expected.sample(rng).min(max);
        population.add_buyer(Buyer::new(max, expected)?);
    }

    #[cfg(feature = "instrument")]
    tracing::debug!(
        sellers = population.seller_count(),
        buyers = population.buyer_count(),
        "population bootstrapped"
    );

    Ok(population)
}
