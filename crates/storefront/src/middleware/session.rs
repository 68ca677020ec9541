//! Signed client-held session tokens.
//!
//! The shop keeps no server-side session table. Each piece of session state
//! ([`TokenKind`]) is a separate cookie whose value is
//!
//! ```text
//! base64url(json envelope) "." base64url(HMAC-SHA256(envelope part))
//! ```
//!
//! The envelope carries a format version, the token kind, an expiry (unix
//! seconds) and the claim itself. A token is accepted only if the signature
//! verifies under the configured secret, the version and kind match, and it
//! has not expired. Anything else is treated as if the cookie were absent.

use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderValue, header, request::Parts},
    response::{IntoResponseParts, ResponseParts},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;
use thiserror::Error;

use crate::models::session::TokenKind;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Envelope format version. Bump to invalidate every outstanding token.
const TOKEN_VERSION: u8 = 1;

/// Errors produced while issuing or reading a token.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("signing key rejected")]
    InvalidKey,
    #[error("token is malformed")]
    Malformed,
    #[error("token signature does not match")]
    BadSignature,
    #[error("token version {0} is not supported")]
    UnsupportedVersion(u8),
    #[error("token was issued for {0}")]
    WrongKind(String),
    #[error("token has expired")]
    Expired,
    #[error("claim could not be serialized: {0}")]
    Serialize(String),
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    v: u8,
    kind: String,
    exp: i64,
    data: T,
}

/// Signs and verifies session tokens with a keyed HMAC.
#[derive(Clone)]
pub struct TokenSigner {
    mac: HmacSha256,
}

impl TokenSigner {
    /// Build a signer from the session secret.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::InvalidKey` if the HMAC rejects the key.
    pub fn new(secret: &SecretString) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| TokenError::InvalidKey)?;
        Ok(Self { mac })
    }

    /// Sign `data` as a token of `kind` that expires at `expires_at`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Serialize` if the claim cannot be serialized.
    pub fn sign<T: Serialize>(
        &self,
        kind: TokenKind,
        data: &T,
        expires_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let envelope = Envelope {
            v: TOKEN_VERSION,
            kind: kind.cookie_name().to_string(),
            exp: expires_at.timestamp(),
            data,
        };
        let json = serde_json::to_vec(&envelope).map_err(|e| TokenError::Serialize(e.to_string()))?;
        let payload = URL_SAFE_NO_PAD.encode(json);

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{signature}"))
    }

    /// Verify `token` as a token of `kind` at time `now` and return its claim.
    ///
    /// # Errors
    ///
    /// Returns a `TokenError` describing why the token was rejected.
    pub fn verify<T: DeserializeOwned>(
        &self,
        kind: TokenKind,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<T, TokenError> {
        let (payload, signature) = token.split_once('.').ok_or(TokenError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| TokenError::Malformed)?;

        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::BadSignature)?;

        let json = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| TokenError::Malformed)?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&json).map_err(|_| TokenError::Malformed)?;

        if envelope.v != TOKEN_VERSION {
            return Err(TokenError::UnsupportedVersion(envelope.v));
        }
        if envelope.kind != kind.cookie_name() {
            return Err(TokenError::WrongKind(envelope.kind));
        }
        if envelope.exp <= now.timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(envelope.data)
    }
}

// =============================================================================
// Request side
// =============================================================================

/// The session tokens presented with a request.
///
/// Extracting this never fails; invalid tokens simply read as absent.
#[derive(Clone)]
pub struct ClientSession {
    signer: TokenSigner,
    raw: HashMap<TokenKind, String>,
}

impl ClientSession {
    /// Parse our cookies out of a request's `Cookie` headers.
    #[must_use]
    pub fn from_headers(signer: TokenSigner, headers: &axum::http::HeaderMap) -> Self {
        let raw = headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value.to_owned()))
            .filter_map(Result::ok)
            .filter_map(|cookie| {
                TokenKind::from_cookie_name(cookie.name())
                    .map(|kind| (kind, cookie.value().to_string()))
            })
            .collect();

        Self { signer, raw }
    }

    /// The verified claim of `kind`, if a valid token was presented.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, kind: TokenKind) -> Option<T> {
        self.get_at(kind, Utc::now())
    }

    /// Like [`get`](Self::get), evaluated at `now`.
    #[must_use]
    pub fn get_at<T: DeserializeOwned>(&self, kind: TokenKind, now: DateTime<Utc>) -> Option<T> {
        let token = self.raw.get(&kind)?;
        match self.signer.verify(kind, token, now) {
            Ok(claim) => Some(claim),
            Err(e) => {
                tracing::debug!(cookie = kind.cookie_name(), error = %e, "ignoring session token");
                None
            }
        }
    }

    /// Whether a cookie of `kind` was sent at all, valid or not.
    #[must_use]
    pub fn has_cookie(&self, kind: TokenKind) -> bool {
        self.raw.contains_key(&kind)
    }
}

impl FromRequestParts<AppState> for ClientSession {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(state.tokens().clone(), &parts.headers))
    }
}

// =============================================================================
// Response side
// =============================================================================

/// Pending `Set-Cookie` updates for a response.
///
/// Add it to a handler's response tuple to apply the updates.
pub struct SessionCookies {
    signer: TokenSigner,
    secure: bool,
    updates: Vec<Cookie<'static>>,
}

impl SessionCookies {
    /// Start an empty set of updates.
    #[must_use]
    pub fn new(state: &AppState) -> Self {
        Self::with_signer(state.tokens().clone(), state.config().secure_cookies())
    }

    /// Start an empty set of updates with an explicit signer.
    #[must_use]
    pub const fn with_signer(signer: TokenSigner, secure: bool) -> Self {
        Self {
            signer,
            secure,
            updates: Vec::new(),
        }
    }

    /// Issue a token of `kind` carrying `data`, valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Serialize` if the claim cannot be serialized.
    pub fn issue<T: Serialize>(
        &mut self,
        kind: TokenKind,
        data: &T,
        ttl: Duration,
    ) -> Result<&mut Self, TokenError> {
        let token = self.signer.sign(kind, data, Utc::now() + ttl)?;
        let cookie = self
            .base(kind, token)
            .max_age(cookie::time::Duration::seconds(ttl.num_seconds()))
            .build();
        self.updates.push(cookie);
        Ok(self)
    }

    /// Clear the cookie of `kind`.
    pub fn clear(&mut self, kind: TokenKind) -> &mut Self {
        let mut cookie = self.base(kind, String::new()).build();
        cookie.make_removal();
        self.updates.push(cookie);
        self
    }

    /// Clear every session cookie (logout).
    pub fn clear_all(&mut self) -> &mut Self {
        for kind in TokenKind::ALL {
            self.clear(kind);
        }
        self
    }

    fn base(&self, kind: TokenKind, value: String) -> cookie::CookieBuilder<'static> {
        Cookie::build((kind.cookie_name(), value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
    }
}

impl IntoResponseParts for SessionCookies {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        for cookie in self.updates {
            match HeaderValue::from_str(&cookie.to_string()) {
                Ok(value) => {
                    res.headers_mut().append(header::SET_COOKIE, value);
                }
                Err(e) => tracing::error!(cookie = cookie.name(), error = %e, "unencodable cookie"),
            }
        }
        Ok(res)
    }
}
