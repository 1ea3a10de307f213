// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! The authentication provider capability set.
//!
//! A provider issues tickets and inspects the ticket a request carries. It
//! never reads or writes a transport object directly:
//!
//! - cookies are read through a caller-supplied [`CookieLookup`];
//! - issuance and sign-out return [`OutboundHeader`]s for the caller to apply.
//!
//! Every verification failure collapses to `None`/`false`. Callers cannot
//! tell a forged cookie from an expired one.

use chrono::TimeDelta;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::cipher::CipherError;
use super::cookie::OutboundHeader;
use super::ticket::Ticket;

/// Maps a cookie name to its value, or `None` when absent.
pub type CookieLookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Why a ticket could not be issued.
#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("ticket subject must not be empty")]
    EmptySubject,

    #[error("ticket lifetime is out of range")]
    InvalidTtl,

    #[error("ticket payload could not be serialized: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("ticket could not be sealed: {0}")]
    Cipher(#[from] CipherError),

    #[error("platform ticket facility refused to seal the ticket")]
    Platform,
}

/// A strategy for issuing and inspecting identity tickets.
pub trait AuthProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Issue a ticket for `subject` valid for `ttl`.
    fn issue(
        &self,
        subject: &str,
        roles: &[String],
        payload: &Value,
        ttl: TimeDelta,
    ) -> Result<Vec<OutboundHeader>, IssueError>;

    /// The verified, unexpired ticket carried by the request.
    fn ticket(&self, lookup: CookieLookup<'_>) -> Option<Ticket<Value>>;

    /// Headers that clear the ticket on the client.
    fn sign_out(&self) -> Vec<OutboundHeader>;

    fn subject(&self, lookup: CookieLookup<'_>) -> Option<String> {
        self.ticket(lookup).map(|t| t.subject)
    }

    fn is_authenticated(&self, lookup: CookieLookup<'_>) -> bool {
        self.ticket(lookup).is_some()
    }

    fn has_role(&self, lookup: CookieLookup<'_>, role: &str) -> bool {
        self.ticket(lookup).is_some_and(|t| t.has_role(role))
    }
}

impl dyn AuthProvider {
    /// The request's payload interpreted as `T`.
    pub fn payload<T: DeserializeOwned>(&self, lookup: CookieLookup<'_>) -> Option<T> {
        self.ticket(lookup)?.payload_as()
    }

    /// Issue a ticket with a typed payload valid for `ttl_days` days.
    pub fn sign_in<T: Serialize>(
        &self,
        subject: &str,
        roles: &[String],
        payload: &T,
        ttl_days: i64,
    ) -> Result<Vec<OutboundHeader>, IssueError> {
        let ttl = TimeDelta::try_days(ttl_days).ok_or(IssueError::InvalidTtl)?;
        let payload = serde_json::to_value(payload)?;
        self.issue(subject, roles, &payload, ttl)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::auth::{CookieCodec, TicketKey};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Profile {
        tier: u32,
    }

    fn provider() -> Box<dyn AuthProvider> {
        Box::new(CookieCodec::new(&TicketKey::from_text("0123456789abcdef").unwrap()))
    }

    /// Pull the `name=value` pair out of a `Set-Cookie` header into a jar.
    fn jar_from(headers: &[OutboundHeader]) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|h| h.value.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn sign_in_then_inspect() {
        let provider = provider();
        let headers = provider
            .sign_in("u1", &["Editor".to_string()], &json!({"tier": 2}), 1)
            .unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].name, "Set-Cookie");

        let jar = jar_from(&headers);
        let lookup = |name: &str| jar.get(name).cloned();

        assert!(provider.is_authenticated(&lookup));
        assert_eq!(provider.subject(&lookup), Some("u1".to_string()));
        assert_eq!(provider.payload::<Profile>(&lookup), Some(Profile { tier: 2 }));
        assert!(provider.has_role(&lookup, "editor"));
        assert!(provider.has_role(&lookup, "EDITOR"));
        assert!(!provider.has_role(&lookup, "viewer"));
    }

    #[test]
    fn absent_cookie_is_unauthenticated() {
        let provider = provider();
        let lookup = |_: &str| -> Option<String> { None };

        assert!(provider.ticket(&lookup).is_none());
        assert!(provider.subject(&lookup).is_none());
        assert!(provider.payload::<Profile>(&lookup).is_none());
        assert!(!provider.is_authenticated(&lookup));
        assert!(!provider.has_role(&lookup, "admin"));
    }

    #[test]
    fn empty_role_set_never_matches() {
        let provider = provider();
        let headers = provider.sign_in("u1", &[], &Value::Null, 1).unwrap();
        let jar = jar_from(&headers);
        let lookup = |name: &str| jar.get(name).cloned();

        assert!(provider.is_authenticated(&lookup));
        assert!(!provider.has_role(&lookup, ""));
        assert!(!provider.has_role(&lookup, "admin"));
    }

    #[test]
    fn expired_sign_in_is_unauthenticated() {
        let provider = provider();
        let headers = provider
            .sign_in("u1", &["Admin".to_string()], &Value::Null, 0)
            .unwrap();
        let jar = jar_from(&headers);
        let lookup = |name: &str| jar.get(name).cloned();

        assert!(!provider.is_authenticated(&lookup));
        assert!(!provider.has_role(&lookup, "admin"));
    }

    #[test]
    fn out_of_range_days_are_rejected() {
        let err = provider()
            .sign_in("u1", &[], &Value::Null, i64::MAX)
            .unwrap_err();
        assert!(matches!(err, IssueError::InvalidTtl));
    }

    #[test]
    fn sign_out_repeats_the_same_instruction() {
        let provider = provider();
        let first = provider.sign_out();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let second = provider.sign_out();
        assert_eq!(first.len(), 1);
        assert_eq!(first, second);
        assert!(first[0].value.starts_with("CookieTicket=; Expires=Thu, 01 Jan 1970"));
    }
}
