//! Core types for Burgershop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod contact;
pub mod id;
pub mod ingredient;
pub mod payment;
pub mod price;
pub mod username;

pub use contact::{ContactError, Email, PhoneNumber};
pub use id::*;
pub use ingredient::{IngredientLine, MAX_QUANTITY, normalize_ingredients};
pub use payment::{CardNumber, Cvv, PaymentError, PaymentMethod};
pub use price::{Price, PriceError};
pub use username::{Username, UsernameError};
