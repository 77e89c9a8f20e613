use thiserror::Error;

use crate::types::Price;

/// Errors raised while building a market. Trading itself never fails:
/// a pair that cannot agree on a price is a normal outcome, not an error.
#[derive(Debug, Error)]
pub enum MarketError {
    #[error("seller expected price {expected_price} is below its minimum price {min_price}")]
    InvalidSeller {
        min_price: Price,
        expected_price: Price,
    },

    #[error("buyer expected price {expected_price} is above its maximum price {max_price}")]
    InvalidBuyer {
        max_price: Price,
        expected_price: Price,
    },

    #[error("{field} must be a finite, non-negative price (got {value})")]
    NonFinitePrice { field: &'static str, value: f64 },

    #[error("triangular distribution needs low <= mode <= high and low < high (got low={low}, high={high}, mode={mode})")]
    InvalidDistribution { low: f64, high: f64, mode: f64 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MarketError>;

pub(crate) fn check_price(field: &'static str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MarketError::NonFinitePrice { field, value })
    }
}
