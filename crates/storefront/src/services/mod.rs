//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration and login (argon2 password hashes)
//! - `catalog` - Cached menu reads
//! - `checkout` - Customization, pending orders, payment
//! - `transactions` - Transaction listing and owner-only edits

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod transactions;

pub use auth::{AuthError, AuthService};
pub use catalog::Catalog;
pub use checkout::{CheckoutError, CheckoutService, CompletedOrder, OrderInProgress};
pub use transactions::{TransactionError, TransactionService};
