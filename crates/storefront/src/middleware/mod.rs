//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//!
//! Session state is not a layer: handlers read it through the extractors in
//! [`auth`] and [`session`] and write it back with [`SessionCookies`].

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, RequirePurchase, SessionRejection};
pub use request_id::request_id_middleware;
pub use session::{ClientSession, SessionCookies, TokenError, TokenSigner};
