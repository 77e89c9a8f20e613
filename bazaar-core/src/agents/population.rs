use slotmap::SlotMap;

use crate::agents::{Buyer, Seller};
use crate::types::{BuyerId, SellerId};

// === POPULATION ===

/// Both sides of the market. Agents are added once and never removed, so
/// slot order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub(crate) sellers: SlotMap<SellerId, Seller>,
    pub(crate) buyers: SlotMap<BuyerId, Buyer>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sellers(mut self, sellers: impl IntoIterator<Item = Seller>) -> Self {
        for seller in sellers {
            self.add_seller(seller);
        }
        self
    }

    pub fn with_buyers(mut self, buyers: impl IntoIterator<Item = Buyer>) -> Self {
        for buyer in buyers {
            self.add_buyer(buyer);
        }
        self
    }

    pub fn add_seller(&mut self, seller: Seller) -> SellerId {
        self.sellers.insert(seller)
    }

    pub fn add_buyer(&mut self, buyer: Buyer) -> BuyerId {
        self.buyers.insert(buyer)
    }

    pub fn seller(&self, id: SellerId) -> Option<&Seller> {
        self.sellers.get(id)
    }

    pub fn buyer(&self, id: BuyerId) -> Option<&Buyer> {
        self.buyers.get(id)
    }

    pub fn sellers(&self) -> impl Iterator<Item = (SellerId, &Seller)> {
        self.sellers.iter()
    }

    pub fn buyers(&self) -> impl Iterator<Item = (BuyerId, &Buyer)> {
        self.buyers.iter()
    }

    pub fn seller_count(&self) -> usize {
        self.sellers.len()
    }

    pub fn buyer_count(&self) -> usize {
        self.buyers.len()
    }

    /// Sellers that did not sell on the most recent trading day.
    pub fn unsold_sellers(&self) -> usize {
        self.sellers.values().filter(|s| !s.sold_today()).count()
    }

    /// Buyers whose last trading day ended without a purchase.
    pub fn unsatisfied_buyers(&self) -> usize {
        self.buyers.values().filter(|b| b.is_unsatisfied()).count()
    }
}
