// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Self-contained encrypted identity tickets carried in an HTTP cookie.
//!
//! ## Ticket Flow
//!
//! 1. The service calls `issue(subject, roles, payload, ttl)` on the active
//!    provider and applies the returned `Set-Cookie` header.
//! 2. The browser sends the cookie back on every request.
//! 3. The provider reads it through a cookie lookup function:
//!    - base64-decodes and opens the AES-128-GCM envelope
//!    - parses the JSON ticket
//!    - rejects it once `now >= expiry`
//!
//! ## Security
//!
//! - No server-side session state; the key and the clock are all that is
//!   consulted
//! - Every verification failure collapses to "not authenticated"
//! - The cookie's `Expires` attribute is advisory; the ticket expiry is
//!   authoritative

pub mod cipher;
pub mod codec;
pub mod cookie;
pub mod error;
pub mod extractor;
pub mod platform;
pub mod provider;
pub mod registry;
pub mod ticket;

pub use cipher::{Cipher, CipherError, KeyError, TicketKey};
pub use codec::{CookieCodec, IssuedTicket, DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH};
pub use cookie::OutboundHeader;
pub use error::AuthError;
pub use extractor::{Auth, OptionalAuth};
pub use platform::{PlatformProvider, PlatformTicket, TicketFacility};
pub use provider::{AuthProvider, CookieLookup, IssueError};
pub use ticket::Ticket;
