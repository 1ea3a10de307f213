// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use crate::config::{TicketConfig, DEFAULT_LIFETIME_DAYS};

/// Request-independent settings shared by the HTTP handlers.
///
/// The ticket provider itself lives in the process-wide registry, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppState {
    /// Lifetime of tickets issued without an explicit one
    pub lifetime_days: i64,
    /// Whether the placeholder key is in use
    pub placeholder_key: bool,
}

impl AppState {
    pub fn from_config(config: &TicketConfig) -> Self {
        Self {
            lifetime_days: config.lifetime_days,
            placeholder_key: config.placeholder_key,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            lifetime_days: DEFAULT_LIFETIME_DAYS,
            placeholder_key: true,
        }
    }
}
