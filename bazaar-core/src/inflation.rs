//! Market-wide inflation drift.
//!
//! Each agent's bound and expectation are scaled by the same per-agent factor
//! `1 + base_rate + noise`, so the ordering between them is preserved.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::agents::Population;
use crate::error::{MarketError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct InflationDrift {
    /// Daily rate added to every agent's factor.
    pub base_rate: f64,
    /// Half-width of the uniform per-agent noise term.
    #[serde(default = "InflationDrift::default_noise_range")]
    pub noise_range: f64,
}

impl Default for InflationDrift {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BASE_RATE)
    }
}

impl InflationDrift {
    /// Daily rate of the reference run; also the config default.
    pub const DEFAULT_BASE_RATE: f64 = 0.00006;
    pub const DEFAULT_NOISE_RANGE: f64 = 0.0005;

    pub fn new(base_rate: f64) -> Self {
        Self {
            base_rate,
            noise_range: Self::DEFAULT_NOISE_RANGE,
        }
    }

    pub fn with_noise_range(mut self, noise_range: f64) -> Self {
        self.noise_range = noise_range;
        self
    }

    fn default_noise_range() -> f64 {
        Self::DEFAULT_NOISE_RANGE
    }

    pub fn validate(&self) -> Result<()> {
        if !self.base_rate.is_finite() || !self.noise_range.is_finite() || self.noise_range < 0.0 {
            return Err(MarketError::InvalidConfig(format!(
                "inflation needs a finite base_rate and non-negative noise_range (got {self:?})"
            )));
        }
        // The smallest possible factor must stay positive.
        if 1.0 + self.base_rate - self.noise_range <= 0.0 {
            return Err(MarketError::InvalidConfig(format!(
                "inflation factor can reach zero (base_rate={}, noise_range={})",
                self.base_rate, self.noise_range
            )));
        }
        Ok(())
    }
}

/// Scale every agent's prices by an independently drawn inflation factor.
///
/// One draw per agent: sellers first in population order, then buyers.
pub fn apply_inflation<R: Rng>(population: &mut Population, drift: &InflationDrift, rng: &mut R) {
    let width = drift.noise_range;

    for seller in population.sellers.values_mut() {
        let noise = rng.random_range(-width..=width);
        seller.scale_prices(1.0 + drift.base_rate + noise);
    }

    for buyer in population.buyers.values_mut() {
        let noise = rng.random_range(-width..=width);
        buyer.scale_prices(1.0 + drift.base_rate + noise);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Buyer, Seller};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_noise_free_inflation_scales_exactly() {
        let mut population = Population::new()
            .with_sellers([Seller::new(10.0, 20.0).unwrap()])
            .with_buyers([Buyer::new(30.0, 25.0).unwrap()]);
        let drift = InflationDrift::new(0.01).with_noise_range(0.0);
        let mut rng = StdRng::seed_from_u64(0);

        apply_inflation(&mut population, &drift, &mut rng);

        let (_, seller) = population.sellers().next().unwrap();
        let (_, buyer) = population.buyers().next().unwrap();
        assert!((seller.min_price() - 10.1).abs() < 1e-12);
        assert!((seller.expected_price() - 20.2).abs() < 1e-12);
        assert!((buyer.max_price() - 30.3).abs() < 1e-12);
        assert!((buyer.expected_price() - 25.25).abs() < 1e-12);
    }

    #[test]
    fn test_noisy_inflation_stays_in_band_and_keeps_invariants() {
        let mut population = Population::new()
            .with_sellers((0..50).map(|_| Seller::new(10.0, 10.0).unwrap()))
            .with_buyers((0..50).map(|_| Buyer::new(30.0, 30.0).unwrap()));
        let drift = InflationDrift::default();
        let mut rng = StdRng::seed_from_u64(8);

        apply_inflation(&mut population, &drift, &mut rng);

        let lo = 1.0 + drift.base_rate - drift.noise_range;
        let hi = 1.0 + drift.base_rate + drift.noise_range;
        for (_, s) in population.sellers() {
            assert!(s.min_price() >= 10.0 * lo - 1e-12 && s.min_price() <= 10.0 * hi + 1e-12);
            assert!(s.expected_price() >= s.min_price());
        }
        for (_, b) in population.buyers() {
            assert!(b.max_price() >= 30.0 * lo - 1e-12 && b.max_price() <= 30.0 * hi + 1e-12);
            assert!(b.expected_price() <= b.max_price());
        }
    }

    #[test]
    fn test_noise_range_defaults_when_omitted() {
        let drift: InflationDrift = serde_json::from_str(r#"{"base_rate": 0.00006}"#).unwrap();
        assert_eq!(drift.noise_range, InflationDrift::DEFAULT_NOISE_RANGE);
        assert!(drift.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_collapsing_factor() {
        assert!(InflationDrift::new(-1.0).validate().is_err());
        assert!(InflationDrift::new(0.0).with_noise_range(-0.1).validate().is_err());
    }
}
