//! Session-related types.
//!
//! Everything the shop remembers between requests lives in signed cookies,
//! one cookie per [`TokenKind`]. These are the claims carried inside them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use burgershop_core::{UserId, Username};

/// Lifetime of the login token.
pub const USER_TOKEN_TTL: Duration = Duration::days(1);

/// Lifetime of the "has purchased" flag.
pub const PURCHASE_TOKEN_TTL: Duration = Duration::days(1);

/// Lifetime of a pending order, both the token and the server-side row.
pub const PENDING_ORDER_TTL: Duration = Duration::hours(1);

/// Status message shown while a delivery is in progress.
pub const DELIVERY_MESSAGE: &str = "Your order is on its way!";

/// The kinds of client-held tokens, each stored under its own cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// The logged-in user ([`CurrentUser`]).
    User,
    /// Set once an order has been paid for (`bool`).
    Purchase,
    /// The pending order being checked out ([`PendingOrderId`](burgershop_core::PendingOrderId)).
    PendingOrder,
    /// The running delivery timer ([`DeliveryStatus`]).
    Delivery,
}

impl TokenKind {
    /// Every token kind; logout clears all of them.
    pub const ALL: [Self; 4] = [Self::User, Self::Purchase, Self::PendingOrder, Self::Delivery];

    /// Cookie name the token travels under.
    #[must_use]
    pub const fn cookie_name(self) -> &'static str {
        match self {
            Self::User => "bs_user",
            Self::Purchase => "bs_purchase",
            Self::PendingOrder => "bs_pending",
            Self::Delivery => "bs_delivery",
        }
    }

    /// Look a token kind up by its cookie name.
    #[must_use]
    pub fn from_cookie_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.cookie_name() == name)
    }
}

/// Session-stored user identity.
///
/// Minimal data carried in the login token to identify the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's login name.
    pub username: Username,
}

/// Delivery timer started when an order is paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryStatus {
    /// When the order counts as delivered.
    pub expires_at: DateTime<Utc>,
    /// Human-readable status line.
    pub message: String,
}

impl DeliveryStatus {
    /// Start a timer of length `window` at `now`.
    #[must_use]
    pub fn start(now: DateTime<Utc>, window: Duration) -> Self {
        Self {
            expires_at: now + window,
            message: DELIVERY_MESSAGE.to_string(),
        }
    }

    /// Whether the delivery is still in progress at `now`.
    #[must_use]
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whole minutes until delivery, rounded up; `None` once expired.
    #[must_use]
    pub fn minutes_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        if !self.is_active(now) {
            return None;
        }
        let seconds = (self.expires_at - now).num_seconds();
        Some((seconds + 59) / 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_names_are_distinct() {
        for kind in TokenKind::ALL {
            assert_eq!(TokenKind::from_cookie_name(kind.cookie_name()), Some(kind));
        }
        assert_eq!(TokenKind::from_cookie_name("session_id"), None);
    }

    #[test]
    fn test_delivery_minutes_round_up() {
        let now = Utc::now();
        let status = DeliveryStatus::start(now, Duration::minutes(30));
        assert_eq!(status.minutes_remaining(now), Some(30));
        assert_eq!(
            status.minutes_remaining(now + Duration::seconds(61)),
            Some(29)
        );
        assert_eq!(
            status.minutes_remaining(now + Duration::minutes(29) + Duration::seconds(59)),
            Some(1)
        );
    }

    #[test]
    fn test_delivery_expires() {
        let now = Utc::now();
        let status = DeliveryStatus::start(now, Duration::minutes(5));
        assert!(status.is_active(now + Duration::minutes(4)));
        assert!(!status.is_active(now + Duration::minutes(5)));
        assert_eq!(status.minutes_remaining(now + Duration::hours(1)), None);
    }
}
