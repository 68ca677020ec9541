//! Orders that have been customized but not yet paid for.

use chrono::{DateTime, Utc};

use burgershop_core::{BurgerId, IngredientLine, PendingOrderId, Username};

/// A customization waiting for payment.
///
/// The browser only holds the id, inside the signed `bs_pending` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOrder {
    pub id: PendingOrderId,
    /// Owner; lookups from any other user miss.
    pub username: Username,
    pub burger_id: BurgerId,
    pub ingredients: Vec<IngredientLine>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl PendingOrder {
    /// Whether the order can still be checked out at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}
