use rand::Rng;

use crate::agents::{Buyer, Seller};
use crate::rules::TradingRules;
use crate::types::Price;

/// An agent whose price expectation adapts to trading outcomes.
pub trait AdaptivePricing {
    fn expectation(&self) -> Price;

    /// Center of the multiplicative drift applied after a day without a deal.
    fn drift_center(rules: &TradingRules) -> f64;

    /// Store a new expectation, clamped to the agent's reservation bound.
    fn set_expectation(&mut self, price: Price);
}

impl AdaptivePricing for Seller {
    fn expectation(&self) -> Price {
        self.expected_price()
    }

    fn drift_center(rules: &TradingRules) -> f64 {
        rules.seller_drift
    }

    fn set_expectation(&mut self, price: Price) {
        self.set_expected_price(price);
    }
}

impl AdaptivePricing for Buyer {
    fn expectation(&self) -> Price {
        self.expected_price()
    }

    fn drift_center(rules: &TradingRules) -> f64 {
        rules.buyer_drift
    }

    fn set_expectation(&mut self, price: Price) {
        self.set_expected_price(price);
    }
}

/// Revise an agent's expectation after a trading outcome.
///
/// After a deal the expectation closes `learning_rate` of the gap to the deal
/// price and no randomness is drawn. Without a deal two factors are drawn, the
/// directional drift first and the jitter second, and compounded onto the
/// expectation. Either way the result is clamped to the agent's bound.
///
/// # Panics
///
/// If `rules` has not passed [`TradingRules::validate`], e.g. a negative
/// `jitter` makes the sampling range empty.
pub fn adjust_expectation<A: AdaptivePricing, R: Rng>(
    agent: &mut A,
    deal: Option<Price>,
    rules: &TradingRules,
    rng: &mut R,
) {
    let current = agent.expectation();
    let next = match deal {
        Some(price) => current + rules.learning_rate * (price - current),
        None => {
            let center = A::drift_center(rules);
            let drift = rng.random_range(center - rules.drift_spread..=center + rules.drift_spread);
            let jitter = rng.random_range(1.0 - rules.jitter..=1.0 + rules.jitter);
            current * drift * jitter
        }
    };
    agent.set_expectation(next);
}
