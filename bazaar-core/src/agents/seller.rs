use crate::error::{MarketError, Result, check_price};
use crate::types::Price;

// === SELLER ===

/// An agent with one unit to sell per day.
/// `expected_price` never drops below `min_price`.
#[derive(Debug, Clone, PartialEq)]
pub struct Seller {
    min_price: Price,
    expected_price: Price,
    sold_today: bool,
    days_without_sale: u32,
    total_surplus: f64,
}

impl Seller {
    pub fn new(min_price: Price, expected_price: Price) -> Result<Self> {
        let min_price = check_price("min_price", min_price)?;
        let expected_price = check_price("expected_price", expected_price)?;
        if expected_price < min_price {
            return Err(MarketError::InvalidSeller {
                min_price,
                expected_price,
            });
        }
        Ok(Self {
            min_price,
            expected_price,
            sold_today: false,
            days_without_sale: 0,
            total_surplus: 0.0,
        })
    }

    pub fn min_price(&self) -> Price {
        self.min_price
    }

    pub fn expected_price(&self) -> Price {
        self.expected_price
    }

    pub fn sold_today(&self) -> bool {
        self.sold_today
    }

    pub fn days_without_sale(&self) -> u32 {
        self.days_without_sale
    }

    pub fn total_surplus(&self) -> f64 {
        self.total_surplus
    }

    /// Surplus realized by selling at `price`.
    pub fn surplus_at(&self, price: Price) -> f64 {
        price - self.min_price
    }

    pub(crate) fn begin_day(&mut self) {
        self.sold_today = false;
    }

    /// Book a sale. Returns the surplus it realized.
    pub(crate) fn record_sale(&mut self, price: Price) -> f64 {
        let surplus = self.surplus_at(price);
        self.total_surplus += surplus;
        self.sold_today = true;
        surplus
    }

    /// Update the idle-day counter once all buyers have been served.
    pub(crate) fn close_day(&mut self) {
        if self.sold_today {
            self.days_without_sale = 0;
        } else {
            self.days_without_sale += 1;
        }
    }

    pub(crate) fn set_expected_price(&mut self, price: Price) {
        self.expected_price = price.max(self.min_price);
    }

    pub(crate) fn scale_prices(&mut self, factor: f64) {
        self.min_price *= factor;
        self.set_expected_price(self.expected_price * factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_expectation_below_floor() {
        let err = Seller::new(10.0, 9.0).unwrap_err();
        assert!(matches!(err, MarketError::InvalidSeller { .. }));
        assert!(Seller::new(10.0, 10.0).is_ok());
    }

    #[test]
    fn test_rejects_non_finite_prices() {
        assert!(matches!(
            Seller::new(f64::NAN, 10.0),
            Err(MarketError::NonFinitePrice { field: "min_price", .. })
        ));
        assert!(matches!(
            Seller::new(1.0, f64::INFINITY),
            Err(MarketError::NonFinitePrice { field: "expected_price", .. })
        ));
        assert!(Seller::new(-1.0, 5.0).is_err());
    }

    #[test]
    fn test_sale_books_surplus_and_resets_idle_counter() {
        let mut seller = Seller::new(10.0, 20.0).unwrap();
        seller.begin_day();
        seller.close_day();
        seller.begin_day();
        seller.close_day();
        assert_eq!(seller.days_without_sale(), 2);

        seller.begin_day();
        let surplus = seller.record_sale(22.5);
        seller.close_day();
        assert_eq!(surplus, 12.5);
        assert_eq!(seller.total_surplus(), 12.5);
        assert!(seller.sold_today());
        assert_eq!(seller.days_without_sale(), 0);
    }

    #[test]
    fn test_expectation_is_clamped_to_floor() {
        let mut seller = Seller::new(10.0, 20.0).unwrap();
        seller.set_expected_price(3.0);
        assert_eq!(seller.expected_price(), 10.0);
    }

    #[test]
    fn test_scale_prices_moves_floor_and_expectation() {
        let mut seller = Seller::new(10.0, 20.0).unwrap();
        seller.scale_prices(1.1);
        assert!((seller.min_price() - 11.0).abs() < 1e-12);
        assert!((seller.expected_price() - 22.0).abs() < 1e-12);
    }
}
