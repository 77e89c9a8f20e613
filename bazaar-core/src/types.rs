use slotmap::new_key_type;

// ============================================================================
// IDs - Using slotmap for generational indices
// ============================================================================

new_key_type! {
    pub struct SellerId;
    pub struct BuyerId;
}

/// Price in abstract currency units.
pub type Price = f64;

/// Trait for converting SlotMap keys to u64 for WASM boundary and event fields
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
}

impl KeyToU64 for SellerId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

impl KeyToU64 for BuyerId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}
