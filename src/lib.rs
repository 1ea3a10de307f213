// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cookie Ticket - encrypted cookie authentication
//!
//! This crate issues and verifies authentication tickets carried in an
//! HTTP cookie. A ticket holds a subject, role labels, caller data and an
//! expiry, sealed with AES-GCM so clients can neither read nor forge it.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Ticket codec, providers and request extractors
//! - `config` - Environment configuration
//! - `error` - HTTP error mapping

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;
