//! Behavioral constants of the negotiation and price-adjustment rules.

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::error::{MarketError, Result};

// === DEFAULTS ===

pub const NEGOTIATION_NOISE: f64 = 0.05;
pub const SELLER_COMPLIANCE: f64 = 0.9;
pub const BUYER_COMPLIANCE: f64 = 1.1;
pub const LEARNING_RATE: f64 = 0.3;
pub const SELLER_DRIFT: f64 = 0.95;
pub const BUYER_DRIFT: f64 = 1.05;
pub const DRIFT_SPREAD: f64 = 0.01;
pub const JITTER: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(default)]
pub struct TradingRules {
    /// Half-width of the uniform noise fraction applied to the midpoint price.
    pub negotiation_noise: f64,
    /// Sellers refuse prices below `expected_price * seller_compliance`.
    pub seller_compliance: f64,
    /// Buyers refuse prices above `expected_price * buyer_compliance`.
    pub buyer_compliance: f64,
    /// Fraction of the gap to the deal price closed after a trade.
    pub learning_rate: f64,
    /// Center of the multiplicative drift for a seller who did not sell.
    pub seller_drift: f64,
    /// Center of the multiplicative drift for a buyer who did not buy.
    pub buyer_drift: f64,
    /// Half-width of the drift factor around its center.
    pub drift_spread: f64,
    /// Half-width of the second, undirected jitter factor around 1.0.
    pub jitter: f64,
}

impl Default for TradingRules {
    fn default() -> Self {
        Self {
            negotiation_noise: NEGOTIATION_NOISE,
            seller_compliance: SELLER_COMPLIANCE,
            buyer_compliance: BUYER_COMPLIANCE,
            learning_rate: LEARNING_RATE,
            seller_drift: SELLER_DRIFT,
            buyer_drift: BUYER_DRIFT,
            drift_spread: DRIFT_SPREAD,
            jitter: JITTER,
        }
    }
}

impl TradingRules {
    /// Rules with negotiation noise switched off: every pair is offered the
    /// exact midpoint of the two expectations.
    pub fn noiseless() -> Self {
        Self {
            negotiation_noise: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("negotiation_noise", self.negotiation_noise),
            ("seller_compliance", self.seller_compliance),
            ("buyer_compliance", self.buyer_compliance),
            ("learning_rate", self.learning_rate),
            ("seller_drift", self.seller_drift),
            ("buyer_drift", self.buyer_drift),
            ("drift_spread", self.drift_spread),
            ("jitter", self.jitter),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(MarketError::InvalidConfig(format!(
                    "{name} must be finite and non-negative (got {value})"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(MarketError::InvalidConfig(format!(
                "learning_rate must lie in [0, 1] (got {})",
                self.learning_rate
            )));
        }
        // Factors must stay positive or the clamp is the only thing holding prices up.
        if self.negotiation_noise >= 1.0 || self.jitter >= 1.0 {
            return Err(MarketError::InvalidConfig(
                "negotiation_noise and jitter must be below 1".to_string(),
            ));
        }
        if self.seller_drift <= self.drift_spread || self.buyer_drift <= self.drift_spread {
            return Err(MarketError::InvalidConfig(
                "drift centers must exceed drift_spread".to_string(),
            ));
        }
        if self.seller_compliance == 0.0 || self.buyer_compliance == 0.0 {
            return Err(MarketError::InvalidConfig(
                "compliance factors must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
