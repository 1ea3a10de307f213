// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Symmetric-cipher cookie codec.
//!
//! ## Issue
//!
//! ```text
//! Ticket -> JSON envelope -> AES-128-GCM -> base64 -> Set-Cookie
//! ```
//!
//! ## Verify
//!
//! The reverse path. Every failure (absent cookie, bad base64, failed
//! decryption, bad JSON, expired ticket) comes out as `None`. The reason is
//! only logged at debug level and never returned.

use base64ct::{Base64, Encoding};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::cipher::{Cipher, TicketKey};
use super::cookie::{removal_cookie, OutboundHeader, SetCookie};
use super::provider::{AuthProvider, CookieLookup, IssueError};
use super::ticket::Ticket;

/// Cookie name used when none is configured.
pub const DEFAULT_COOKIE_NAME: &str = "CookieTicket";

/// Cookie path used when none is configured.
pub const DEFAULT_COOKIE_PATH: &str = "/";

/// The product of [`CookieCodec::issue`].
#[derive(Debug, Clone)]
pub struct IssuedTicket {
    /// base64 of the sealed envelope
    pub cookie_value: String,
    /// Full `Set-Cookie` header value
    pub set_cookie: String,
    pub expiry: DateTime<Utc>,
}

impl IssuedTicket {
    pub fn header(&self) -> OutboundHeader {
        OutboundHeader::set_cookie(self.set_cookie.clone())
    }
}

/// Turns tickets into cookie values and back under one fixed key.
#[derive(Debug)]
pub struct CookieCodec {
    cipher: Cipher,
    cookie_name: String,
    cookie_path: String,
    cookie_domain: Option<String>,
}

impl CookieCodec {
    pub fn new(key: &TicketKey) -> Self {
        Self {
            cipher: Cipher::new(key),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            cookie_domain: None,
        }
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn cookie_path(&self) -> &str {
        &self.cookie_path
    }

    pub fn cookie_domain(&self) -> Option<&str> {
        self.cookie_domain.as_deref()
    }

    /// Seal a new ticket expiring `ttl` from now.
    ///
    /// A non-positive `ttl` still produces a ticket; it is simply expired.
    pub fn issue<T: Serialize>(
        &self,
        subject: &str,
        roles: &[String],
        payload: &T,
        ttl: TimeDelta,
    ) -> Result<IssuedTicket, IssueError> {
        self.issue_at(subject, roles, payload, ttl, Utc::now())
    }

    pub fn issue_at<T: Serialize>(
        &self,
        subject: &str,
        roles: &[String],
        payload: &T,
        ttl: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<IssuedTicket, IssueError> {
        if subject.trim().is_empty() {
            return Err(IssueError::EmptySubject);
        }
        let expiry = now.checked_add_signed(ttl).ok_or(IssueError::InvalidTtl)?;

        let ticket = Ticket::new(subject, roles.to_vec(), payload, expiry);
        let plaintext = ticket.to_json()?;
        let sealed = self.cipher.encrypt(plaintext.as_bytes())?;
        let cookie_value = Base64::encode_string(&sealed);

        let set_cookie = SetCookie {
            name: &self.cookie_name,
            value: &cookie_value,
            expires: Some(expiry),
            path: &self.cookie_path,
            domain: self.cookie_domain.as_deref(),
        }
        .render();

        Ok(IssuedTicket {
            cookie_value,
            set_cookie,
            expiry,
        })
    }

    /// Decode a cookie value without checking expiry.
    pub fn open<T: DeserializeOwned>(&self, cookie_value: &str) -> Option<Ticket<T>> {
        let cookie_value = cookie_value.trim();
        if cookie_value.is_empty() {
            return None;
        }

        let sealed = match Base64::decode_vec(cookie_value) {
            Ok(sealed) => sealed,
            Err(_) => {
                debug!(cookie = %self.cookie_name, "ticket cookie is not valid base64");
                return None;
            }
        };

        let plaintext = match self.cipher.decrypt(&sealed) {
            Ok(plaintext) => plaintext,
            Err(_) => {
                debug!(cookie = %self.cookie_name, "ticket cookie failed to decrypt");
                return None;
            }
        };

        Ticket::from_slice(&plaintext)
    }

    /// Decode a cookie value and require an unexpired ticket.
    pub fn verify<T: DeserializeOwned>(&self, cookie_value: &str) -> Option<Ticket<T>> {
        self.verify_at(cookie_value, Utc::now())
    }

    pub fn verify_at<T: DeserializeOwned>(
        &self,
        cookie_value: &str,
        now: DateTime<Utc>,
    ) -> Option<Ticket<T>> {
        let ticket = self.open::<T>(cookie_value)?;
        if ticket.is_expired_at(now) {
            debug!(cookie = %self.cookie_name, "ticket has expired");
            return None;
        }
        Some(ticket)
    }

    pub fn subject(&self, cookie_value: &str) -> Option<String> {
        self.verify::<Value>(cookie_value).map(|t| t.subject)
    }

    pub fn payload<T: DeserializeOwned>(&self, cookie_value: &str) -> Option<T> {
        self.verify::<T>(cookie_value).map(|t| t.payload)
    }

    pub fn is_authenticated(&self, cookie_value: &str) -> bool {
        self.verify::<Value>(cookie_value).is_some()
    }

    pub fn has_role(&self, cookie_value: &str, role: &str) -> bool {
        self.verify::<Value>(cookie_value)
            .is_some_and(|t| t.has_role(role))
    }

    /// A header that clears the ticket cookie.
    pub fn sign_out(&self) -> OutboundHeader {
        removal_cookie(
            &self.cookie_name,
            &self.cookie_path,
            self.cookie_domain.as_deref(),
        )
    }
}

impl AuthProvider for CookieCodec {
    fn name(&self) -> &str {
        "cookie-codec"
    }

    fn issue(
        &self,
        subject: &str,
        roles: &[String],
        payload: &Value,
        ttl: TimeDelta,
    ) -> Result<Vec<OutboundHeader>, IssueError> {
        let issued = CookieCodec::issue(self, subject, roles, payload, ttl)?;
        info!(
            cookie = %self.cookie_name,
            expires_at = %issued.expiry,
            "issued ticket"
        );
        Ok(vec![issued.header()])
    }

    fn ticket(&self, lookup: CookieLookup<'_>) -> Option<Ticket<Value>> {
        let cookie_value = lookup(&self.cookie_name)?;
        self.verify::<Value>(&cookie_value)
    }

    fn sign_out(&self) -> Vec<OutboundHeader> {
        vec![CookieCodec::sign_out(self)]
    }
}
