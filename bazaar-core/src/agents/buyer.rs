use crate::error::{MarketError, Result, check_price};
use crate::types::Price;

// === BUYER ===

/// An agent wanting one unit per day.
/// `expected_price` never rises above `max_price`.
#[derive(Debug, Clone, PartialEq)]
pub struct Buyer {
    max_price: Price,
    expected_price: Price,
    days_without_buying: u32,
    total_surplus: f64,
}

impl Buyer {
    pub fn new(max_price: Price, expected_price: Price) -> Result<Self> {
        let max_price = check_price("max_price", max_price)?;
        let expected_price = check_price("expected_price", expected_price)?;
        if expected_price > max_price {
            return Err(MarketError::InvalidBuyer {
                max_price,
                expected_price,
            });
        }
        Ok(Self {
            max_price,
            expected_price,
            days_without_buying: 0,
            total_surplus: 0.0,
        })
    }

    pub fn max_price(&self) -> Price {
        self.max_price
    }

    pub fn expected_price(&self) -> Price {
        self.expected_price
    }

    pub fn days_without_buying(&self) -> u32 {
        self.days_without_buying
    }

    pub fn total_surplus(&self) -> f64 {
        self.total_surplus
    }

    /// Is this buyer still waiting for a purchase?
    pub fn is_unsatisfied(&self) -> bool {
        self.days_without_buying > 0
    }

    /// Surplus realized by buying at `price`.
    pub fn surplus_at(&self, price: Price) -> f64 {
        self.max_price - price
    }

    /// Book a purchase. Returns the surplus it realized.
    pub(crate) fn record_purchase(&mut self, price: Price) -> f64 {
        let surplus = self.surplus_at(price);
        self.total_surplus += surplus;
        self.days_without_buying = 0;
        surplus
    }

    pub(crate) fn record_missed_day(&mut self) {
        self.days_without_buying += 1;
    }

    pub(crate) fn set_expected_price(&mut self, price: Price) {
        self.expected_price = price.min(self.max_price);
    }

    pub(crate) fn scale_prices(&mut self, factor: f64) {
        self.max_price *= factor;
        self.set_expected_price(self.expected_price * factor);
    }
}
