// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for ticket-authenticated callers.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(ticket): Auth) -> impl IntoResponse {
//!     // ticket is Ticket<serde_json::Value>
//! }
//! ```
//!
//! The extractor takes one snapshot of the registry per request and reads
//! cookies through the provider's lookup seam. It does not know which
//! provider is active.

use axum::{
    extract::FromRequestParts,
    http::{
        header::COOKIE,
        request::Parts,
        HeaderMap, HeaderName, HeaderValue,
    },
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::cookie::{find_cookie, OutboundHeader};
use super::provider::AuthProvider;
use super::registry;
use super::{AuthError, Ticket};

/// Cookie lookup over the request's `Cookie` headers.
pub fn cookie_lookup(headers: &HeaderMap) -> impl Fn(&str) -> Option<String> + '_ {
    move |name: &str| {
        find_cookie(
            headers
                .get_all(COOKIE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
            name,
        )
    }
}

/// Verify the ticket carried by `headers` with `provider`.
pub fn authenticate(headers: &HeaderMap, provider: &dyn AuthProvider) -> Option<Ticket<Value>> {
    let lookup = cookie_lookup(headers);
    provider.ticket(&lookup)
}

/// Convert provider header instructions into an axum header map.
pub fn outbound_header_map(headers: &[OutboundHeader]) -> Result<HeaderMap, axum::http::Error> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for header in headers {
        let name = HeaderName::from_bytes(header.name.as_bytes())?;
        let value = HeaderValue::from_str(&header.value)?;
        map.append(name, value);
    }
    Ok(map)
}

/// Extractor for authenticated callers.
///
/// Rejects with [`AuthError::Unauthenticated`] when no valid, unexpired
/// ticket is present.
pub struct Auth(pub Ticket<Value>);

impl Auth {
    pub fn subject(&self) -> &str {
        &self.0.subject
    }

    /// The ticket payload interpreted as `T`.
    pub fn payload<T: DeserializeOwned>(&self) -> Option<T> {
        self.0.payload_as()
    }

    /// Fail with [`AuthError::InsufficientPermissions`] unless the caller
    /// holds `role` (case-insensitive).
    pub fn require_role(&self, role: &str) -> Result<(), AuthError> {
        if self.0.has_role(role) {
            Ok(())
        } else {
            Err(AuthError::InsufficientPermissions)
        }
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // First check if a layer already authenticated the request
        if let Some(ticket) = parts.extensions.get::<Ticket<Value>>().cloned() {
            return Ok(Auth(ticket));
        }

        let provider = registry::current();
        authenticate(&parts.headers, provider.as_ref())
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Optional authentication extractor.
///
/// Returns `None` if no valid ticket is present, instead of rejecting.
pub struct OptionalAuth(pub Option<Ticket<Value>>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Auth::from_request_parts(parts, state).await {
            Ok(Auth(ticket)) => Ok(OptionalAuth(Some(ticket))),
            Err(_) => Ok(OptionalAuth(None)),
        }
    }
}
