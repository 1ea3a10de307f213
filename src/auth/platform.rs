// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Provider that delegates sealing to an external platform ticket facility.
//!
//! The facility is a black box: it seals a [`PlatformTicket`] into an
//! opaque token and unseals it again. This module only wraps the ticket
//! envelope into the platform ticket's `user_data` and applies the same
//! capability set as the cookie codec.
//!
//! The platform ticket carries its own `name`. When it differs from the
//! envelope's `UserId`, the platform name wins.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::cookie::{removal_cookie, OutboundHeader, SetCookie};
use super::provider::{AuthProvider, CookieLookup, IssueError};
use super::ticket::Ticket;

/// The ticket a platform facility seals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformTicket {
    /// Principal name as the platform sees it
    pub name: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Whether the cookie should outlive the browser session
    pub persistent: bool,
    /// The JSON ticket envelope
    pub user_data: String,
}

impl PlatformTicket {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// An external ticket facility.
pub trait TicketFacility: Send + Sync {
    fn cookie_name(&self) -> &str;

    fn cookie_path(&self) -> &str {
        "/"
    }

    fn cookie_domain(&self) -> Option<&str> {
        None
    }

    /// Seal a ticket into an opaque cookie-safe token.
    fn seal(&self, ticket: &PlatformTicket) -> Option<String>;

    /// Open a token, or `None` if the facility rejects it.
    fn unseal(&self, token: &str) -> Option<PlatformTicket>;
}

/// [`AuthProvider`] backed by a [`TicketFacility`].
#[derive(Debug)]
pub struct PlatformProvider<F> {
    facility: F,
}

impl<F: TicketFacility> PlatformProvider<F> {
    pub fn new(facility: F) -> Self {
        Self { facility }
    }

    pub fn facility(&self) -> &F {
        &self.facility
    }

    fn ticket_at(&self, lookup: CookieLookup<'_>, now: DateTime<Utc>) -> Option<Ticket<Value>> {
        let token = lookup(self.facility.cookie_name())?;
        if token.trim().is_empty() {
            return None;
        }

        let Some(outer) = self.facility.unseal(&token) else {
            debug!(cookie = %self.facility.cookie_name(), "platform facility rejected token");
            return None;
        };
        if outer.is_expired_at(now) {
            debug!(cookie = %self.facility.cookie_name(), "platform ticket has expired");
            return None;
        }

        let mut ticket = Ticket::<Value>::from_json(&outer.user_data)?;
        if ticket.is_expired_at(now) {
            debug!(cookie = %self.facility.cookie_name(), "ticket envelope has expired");
            return None;
        }
        if !outer.name.trim().is_empty() {
            ticket.subject = outer.name;
        }
        Some(ticket)
    }
}

impl<F: TicketFacility> AuthProvider for PlatformProvider<F> {
    fn name(&self) -> &str {
        "platform"
    }

    fn issue(
        &self,
        subject: &str,
        roles: &[String],
        payload: &Value,
        ttl: TimeDelta,
    ) -> Result<Vec<OutboundHeader>, IssueError> {
        if subject.trim().is_empty() {
            return Err(IssueError::EmptySubject);
        }
        let now = Utc::now();
        let expiry = now.checked_add_signed(ttl).ok_or(IssueError::InvalidTtl)?;

        let envelope = Ticket::new(subject, roles.to_vec(), payload, expiry).to_json()?;
        let outer = PlatformTicket {
            name: subject.to_string(),
            issued_at: now,
            expires_at: expiry,
            persistent: true,
            user_data: envelope,
        };
        let token = self.facility.seal(&outer).ok_or(IssueError::Platform)?;

        let set_cookie = SetCookie {
            name: self.facility.cookie_name(),
            value: &token,
            expires: None,
            path: self.facility.cookie_path(),
            domain: self.facility.cookie_domain(),
        }
        .render();

        info!(cookie = %self.facility.cookie_name(), expires_at = %expiry, "issued platform ticket");
        Ok(vec![OutboundHeader::set_cookie(set_cookie)])
    }

    fn ticket(&self, lookup: CookieLookup<'_>) -> Option<Ticket<Value>> {
        self.ticket_at(lookup, Utc::now())
    }

    fn sign_out(&self) -> Vec<OutboundHeader> {
        vec![removal_cookie(
            self.facility.cookie_name(),
            self.facility.cookie_path(),
            self.facility.cookie_domain(),
        )]
    }
}
