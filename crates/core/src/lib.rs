//! Burgershop Core - Shared domain types.
//!
//! This crate provides the types used across all Burgershop components:
//! - `storefront` - The public shop (catalog, checkout, profile)
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. Validation of user input (usernames, prices, payment
//! fields, ingredient lists) lives here so every caller applies the same rules.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, usernames, payment/contact fields and
//!   ingredient lines

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
