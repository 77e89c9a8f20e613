use rand::Rng;
use rand::seq::SliceRandom;

use crate::agents::Population;
use crate::rules::TradingRules;
use crate::types::{BuyerId, Price, SellerId};

use super::adjustment::adjust_expectation;
use super::negotiation::negotiate;

/// One executed trade. Only lives for the day it was made on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transaction {
    pub seller: SellerId,
    pub buyer: BuyerId,
    pub price: Price,
    pub seller_surplus: f64,
    pub buyer_surplus: f64,
}

/// Run one trading day over the whole population.
///
/// Buyers are visited in a random order and each scans the sellers in an
/// independent random order, trading with the first unsold seller who agrees
/// on a price. Every agent trades at most once. Unmatched agents get a no-deal
/// adjustment once matching is over.
///
/// Randomness is consumed in this order:
/// 1. seller shuffle, then buyer shuffle;
/// 2. per buyer: one negotiation draw per seller tried, then (if no seller
///    agreed) the buyer's two no-deal draws;
/// 3. per unsold seller, in population order: two no-deal draws.
///
/// `rules` must have passed [`TradingRules::validate`]; [`crate::Market`]
/// checks this on construction. Unvalidated rules can panic while sampling.
pub fn run_day<R: Rng>(
    population: &mut Population,
    rules: &TradingRules,
    rng: &mut R,
) -> Vec<Transaction> {
    let mut seller_order: Vec<SellerId> = population.sellers.keys().collect();
    let mut buyer_order: Vec<BuyerId> = population.buyers.keys().collect();
    seller_order.shuffle(rng);
    buyer_order.shuffle(rng);

    for seller in population.sellers.values_mut() {
        seller.begin_day();
    }

    let mut transactions = Vec::new();

    for &buyer_id in &buyer_order {
        let mut deal: Option<(SellerId, Price)> = None;
        for &seller_id in &seller_order {
            let seller = &population.sellers[seller_id];
            if seller.sold_today() {
                continue;
            }
            if let Some(price) = negotiate(seller, &population.buyers[buyer_id], rules, rng) {
                deal = Some((seller_id, price));
                break;
            }
        }

        let buyer = &mut population.buyers[buyer_id];
        match deal {
            Some((seller_id, price)) => {
                let seller = &mut population.sellers[seller_id];
                let seller_surplus = seller.record_sale(price);
                let buyer_surplus = buyer.record_purchase(price);
                adjust_expectation(seller, Some(price), rules, rng);
                adjust_expectation(buyer, Some(price), rules, rng);

                transactions.push(Transaction {
                    seller: seller_id,
                    buyer: buyer_id,
                    price,
                    seller_surplus,
                    buyer_surplus,
                });
            }
            None => {
                adjust_expectation(buyer, None, rules, rng);
                buyer.record_missed_day();
            }
        }
    }

    for seller in population.sellers.values_mut() {
        if !seller.sold_today() {
            adjust_expectation(seller, None, rules, rng);
        }
        seller.close_day();
    }

    #[cfg(feature = "instrument")]
    tracing::debug!(
        sellers = population.seller_count(),
        buyers = population.buyer_count(),
        trades = transactions.len(),
        "trading day complete"
    );

    transactions
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::agents::{Buyer, Seller};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn single_pair(min: f64, ask: f64, max: f64, bid: f64) -> (Population, SellerId, BuyerId) {
        let mut population = Population::new();
        let s = population.add_seller(Seller::new(min, ask).unwrap());
        let b = population.add_buyer(Buyer::new(max, bid).unwrap());
        (population, s, b)
    }

    #[test]
    fn test_noiseless_pair_trades_at_midpoint() {
        let (mut population, s, b) = single_pair(10.0, 20.0, 30.0, 25.0);
        let mut rng = StdRng::seed_from_u64(42);

        let trades = run_day(&mut population, &TradingRules::noiseless(), &mut rng);

        assert_eq!(trades.len(), 1);
        let trade = trades[0];
        assert_eq!((trade.seller, trade.buyer), (s, b));
        assert_eq!(trade.price, 22.5);
        assert_eq!(trade.seller_surplus, 12.5);
        assert_eq!(trade.buyer_surplus, 7.5);

        let seller = population.seller(s).unwrap();
        let buyer = population.buyer(b).unwrap();
        assert!(seller.sold_today());
        assert_eq!(seller.days_without_sale(), 0);
        assert_eq!(buyer.days_without_buying(), 0);
        // 20 + 0.3 * 2.5 and 25 - 0.3 * 2.5
        assert!((seller.expected_price() - 20.75).abs() < 1e-12);
        assert!((buyer.expected_price() - 24.25).abs() < 1e-12);
    }

    #[test]
    fn test_crossed_pair_never_trades() {
        let (mut population, s, b) = single_pair(50.0, 60.0, 40.0, 35.0);
        let mut rng = StdRng::seed_from_u64(42);

        let trades = run_day(&mut population, &TradingRules::default(), &mut rng);

        assert!(trades.is_empty());
        let seller = population.seller(s).unwrap();
        let buyer = population.buyer(b).unwrap();
        assert_eq!(seller.days_without_sale(), 1);
        assert_eq!(buyer.days_without_buying(), 1);
        assert!(!seller.sold_today());
        assert!(seller.expected_price() >= 50.0);
        assert!(buyer.expected_price() <= 40.0);
    }

    #[test]
    fn test_empty_side_leaves_everyone_unmatched() {
        let mut rng = StdRng::seed_from_u64(1);
        let rules = TradingRules::default();

        let mut only_sellers = Population::new().with_sellers([
            Seller::new(10.0, 12.0).unwrap(),
            Seller::new(11.0, 15.0).unwrap(),
        ]);
        assert!(run_day(&mut only_sellers, &rules, &mut rng).is_empty());
        assert_eq!(only_sellers.unsold_sellers(), 2);
        assert!(only_sellers.sellers().all(|(_, s)| s.days_without_sale() == 1));

        let mut only_buyers = Population::new().with_buyers([Buyer::new(30.0, 20.0).unwrap()]);
        assert!(run_day(&mut only_buyers, &rules, &mut rng).is_empty());
        assert_eq!(only_buyers.unsatisfied_buyers(), 1);
    }

    #[test]
    fn test_each_agent_trades_at_most_once() {
        let mut population = Population::new()
            .with_sellers((0..30).map(|i| Seller::new(10.0, 15.0 + i as f64 * 0.1).unwrap()))
            .with_buyers((0..20).map(|i| Buyer::new(40.0, 18.0 + i as f64 * 0.1).unwrap()));
        let rules = TradingRules::default();
        let mut rng = StdRng::seed_from_u64(99);

        for _ in 0..20 {
            let trades = run_day(&mut population, &rules, &mut rng);
            assert!(trades.len() <= 20);

            let sellers: HashSet<_> = trades.iter().map(|t| t.seller).collect();
            let buyers: HashSet<_> = trades.iter().map(|t| t.buyer).collect();
            assert_eq!(sellers.len(), trades.len(), "a seller traded twice");
            assert_eq!(buyers.len(), trades.len(), "a buyer traded twice");

            let sold = population.sellers().filter(|(_, s)| s.sold_today()).count();
            assert_eq!(sold, trades.len());
        }
    }

    #[test]
    fn test_draw_order_replays_by_hand() {
        // Every pair is crossed, so each agent takes the no-deal path.
        let rules = TradingRules::default();
        let mut population = Population::new();
        let sellers: Vec<SellerId> = [(50.0, 60.0), (55.0, 66.0), (52.0, 58.0)]
            .into_iter()
            .map(|(min, ask)| population.add_seller(Seller::new(min, ask).unwrap()))
            .collect();
        let buyers: Vec<BuyerId> = [(40.0, 35.0), (38.0, 30.0)]
            .into_iter()
            .map(|(max, bid)| population.add_buyer(Buyer::new(max, bid).unwrap()))
            .collect();
        let before = population.clone();

        let mut rng = StdRng::seed_from_u64(9);
        assert!(run_day(&mut population, &rules, &mut rng).is_empty());

        let mut replay = StdRng::seed_from_u64(9);
        let no_deal = |replay: &mut StdRng, price: f64, center: f64| {
            let drift =
                replay.random_range(center - rules.drift_spread..=center + rules.drift_spread);
            let jitter = replay.random_range(1.0 - rules.jitter..=1.0 + rules.jitter);
            price * drift * jitter
        };

        let mut seller_order = sellers.clone();
        let mut buyer_order = buyers.clone();
        seller_order.shuffle(&mut replay);
        buyer_order.shuffle(&mut replay);

        for &buyer_id in &buyer_order {
            for _ in &seller_order {
                let noise = rules.negotiation_noise;
                let _: f64 = replay.random_range(-noise..=noise);
            }
            let buyer = before.buyer(buyer_id).unwrap();
            let want = no_deal(&mut replay, buyer.expected_price(), rules.buyer_drift)
                .min(buyer.max_price());
            assert_eq!(population.buyer(buyer_id).unwrap().expected_price(), want);
        }

        // Unsold sellers adjust in population order, not shuffled order.
        for &seller_id in &sellers {
            let seller = before.seller(seller_id).unwrap();
            let want = no_deal(&mut replay, seller.expected_price(), rules.seller_drift)
                .max(seller.min_price());
            assert_eq!(population.seller(seller_id).unwrap().expected_price(), want);
        }

        // Nothing else was drawn.
        let mut next = rng;
        assert_eq!(next.random::<u64>(), replay.random::<u64>());
    }

    #[test]
    fn test_same_seed_same_day() {
        let build = || {
            Population::new()
                .with_sellers((0..10).map(|i| Seller::new(5.0 + i as f64, 20.0 + i as f64).unwrap()))
                .with_buyers((0..10).map(|i| Buyer::new(40.0 - i as f64, 18.0 + i as f64).unwrap()))
        };
        let rules = TradingRules::default();
        let (mut a, mut b) = (build(), build());
        let mut rng_a = StdRng::seed_from_u64(2024);
        let mut rng_b = StdRng::seed_from_u64(2024);

        for _ in 0..5 {
            let ta = run_day(&mut a, &rules, &mut rng_a);
            let tb = run_day(&mut b, &rules, &mut rng_b);
            assert_eq!(ta, tb);
        }
    }
}
