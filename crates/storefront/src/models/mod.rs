//! Domain models for the storefront.
//!
//! Validated types handed between handlers, services and repositories.
//! Database row types stay private to [`crate::db`].

pub mod burger;
pub mod pending_order;
pub mod session;
pub mod transaction;
pub mod user;

pub use burger::{Burger, BurgerForm, BurgerFormError, CustomizedBurger, NewBurger};
pub use pending_order::PendingOrder;
pub use session::{CurrentUser, DeliveryStatus, TokenKind};
pub use transaction::{PaymentForm, Transaction, TransactionDetails};
pub use user::{User, UserCredentials};
