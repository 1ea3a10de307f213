// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! throughout the application. Configuration is loaded from the environment
//! at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `TICKET_AES_KEY` | 16-byte ticket key | placeholder (never use in production) |
//! | `TICKET_COOKIE_NAME` | Ticket cookie name | `CookieTicket` |
//! | `TICKET_COOKIE_PATH` | Ticket cookie path | `/` |
//! | `TICKET_COOKIE_DOMAIN` | Ticket cookie domain | unset |
//! | `TICKET_LIFETIME_DAYS` | Default ticket lifetime in days | `1` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use crate::auth::{CookieCodec, KeyError, TicketKey, DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH};

/// Environment variable name for the ticket key.
pub const TICKET_AES_KEY_ENV: &str = "TICKET_AES_KEY";

pub const TICKET_COOKIE_NAME_ENV: &str = "TICKET_COOKIE_NAME";

pub const TICKET_COOKIE_PATH_ENV: &str = "TICKET_COOKIE_PATH";

pub const TICKET_COOKIE_DOMAIN_ENV: &str = "TICKET_COOKIE_DOMAIN";

pub const TICKET_LIFETIME_DAYS_ENV: &str = "TICKET_LIFETIME_DAYS";

pub const HOST_ENV: &str = "HOST";

pub const PORT_ENV: &str = "PORT";

pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Fallback key used when `TICKET_AES_KEY` is not set.
///
/// Anyone can read this value. Operators must override it.
pub const PLACEHOLDER_AES_KEY: &str = "0a2667792b5a9027";

pub const DEFAULT_LIFETIME_DAYS: i64 = 1;

pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Configuration errors surfaced at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("TICKET_AES_KEY: {0}")]
    Key(#[from] KeyError),

    #[error("TICKET_COOKIE_NAME must be a non-empty cookie token, got {0:?}")]
    CookieName(String),

    #[error("TICKET_COOKIE_PATH must not contain ';' or control characters, got {0:?}")]
    CookiePath(String),

    #[error("TICKET_COOKIE_DOMAIN must not contain ';' or control characters, got {0:?}")]
    CookieDomain(String),

    #[error("TICKET_LIFETIME_DAYS must be a positive number of days, got {0:?}")]
    Lifetime(String),
}

/// Ticket settings resolved from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketConfig {
    pub key: TicketKey,
    pub cookie_name: String,
    pub cookie_path: String,
    pub cookie_domain: Option<String>,
    pub lifetime_days: i64,
    /// True when [`PLACEHOLDER_AES_KEY`] is in use
    pub placeholder_key: bool,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            key: placeholder_key(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            cookie_domain: None,
            lifetime_days: DEFAULT_LIFETIME_DAYS,
            placeholder_key: true,
        }
    }
}

fn placeholder_key() -> TicketKey {
    match TicketKey::from_text(PLACEHOLDER_AES_KEY) {
        Ok(key) => key,
        Err(_) => unreachable!("placeholder key is 16 bytes"),
    }
}

impl TicketConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = var(TICKET_AES_KEY_ENV) {
            config.key = TicketKey::from_text(&key)?;
            config.placeholder_key = false;
        }

        if let Some(name) = var(TICKET_COOKIE_NAME_ENV) {
            let name = name.trim().to_string();
            if !is_cookie_token(&name) {
                return Err(ConfigError::CookieName(name));
            }
            config.cookie_name = name;
        }

        if let Some(path) = var(TICKET_COOKIE_PATH_ENV) {
            let path = path.trim().to_string();
            if !is_attribute_value(&path) {
                return Err(ConfigError::CookiePath(path));
            }
            config.cookie_path = path;
        }

        if let Some(domain) = var(TICKET_COOKIE_DOMAIN_ENV) {
            let domain = domain.trim().to_string();
            if !is_attribute_value(&domain) {
                return Err(ConfigError::CookieDomain(domain));
            }
            config.cookie_domain = Some(domain);
        }

        if let Some(days) = var(TICKET_LIFETIME_DAYS_ENV) {
            config.lifetime_days = days
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|d| *d > 0)
                .ok_or(ConfigError::Lifetime(days))?;
        }

        Ok(config)
    }

    /// Build the cookie codec described by this configuration.
    pub fn codec(&self) -> CookieCodec {
        let codec = CookieCodec::new(&self.key)
            .with_cookie_name(self.cookie_name.as_str())
            .with_cookie_path(self.cookie_path.as_str());
        match &self.cookie_domain {
            Some(domain) => codec.with_cookie_domain(domain.as_str()),
            None => codec,
        }
    }
}

/// RFC 6265 token characters, without separators or controls.
fn is_cookie_token(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"'
                        | b'/' | b'[' | b']' | b'?' | b'=' | b'{' | b'}'
                )
        })
}

/// `Path`/`Domain` attribute values: printable ASCII without `;`.
fn is_attribute_value(value: &str) -> bool {
    value.bytes().all(|b| b.is_ascii_graphic() && b != b';')
}
