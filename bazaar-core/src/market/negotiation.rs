use rand::Rng;

use crate::agents::{Buyer, Seller};
use crate::rules::TradingRules;
use crate::types::Price;

/// Bargain once between a seller and a buyer.
///
/// Always consumes exactly one draw from `rng` (the noise fraction), whether
/// or not the deal clears. Returns `None` when either side refuses.
pub fn negotiate<R: Rng>(
    seller: &Seller,
    buyer: &Buyer,
    rules: &TradingRules,
    rng: &mut R,
) -> Option<Price> {
    let width = rules.negotiation_noise;
    let noise = rng.random_range(-width..=width);
    negotiate_with_noise(seller, buyer, rules, noise)
}

/// Acceptance rule with the noise fraction supplied by the caller.
///
/// The offer is the midpoint of both expectations scaled by `1 + noise`. It
/// clears only if it is at or above the seller's floor and compliance level,
/// and at or below the buyer's ceiling and compliance level.
pub fn negotiate_with_noise(
    seller: &Seller,
    buyer: &Buyer,
    rules: &TradingRules,
    noise: f64,
) -> Option<Price> {
    let start_price = (seller.expected_price() + buyer.expected_price()) / 2.0;
    let price = start_price * (1.0 + noise);

    let seller_accepts = price >= seller.min_price()
        && price >= seller.expected_price() * rules.seller_compliance;
    let buyer_accepts =
        price <= buyer.max_price() && price <= buyer.expected_price() * rules.buyer_compliance;

    (seller_accepts && buyer_accepts).then_some(price)
}
