//! Cache types for catalog reads.

use burgershop_core::BurgerId;

use crate::models::burger::Burger;

/// Cache key for burgers and the menu listing.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    Burger(BurgerId),
    All,
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Burger(Box<Burger>),
    All(Vec<Burger>),
}
