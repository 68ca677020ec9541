//! Burgershop Storefront library.
//!
//! The storefront as a library, so the router can be driven from tests and
//! the integration-tests crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
