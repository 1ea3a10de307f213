// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Process-wide selection of the active [`AuthProvider`].
//!
//! ## Initialization Order
//!
//! 1. `main` calls [`inject`] with the configured provider before the
//!    server starts accepting requests.
//! 2. If [`current`] runs before any injection, a [`CookieCodec`] built from
//!    [`TicketConfig::default`] is installed. It uses the placeholder key and
//!    logs a warning.
//!
//! [`inject`] may also run while requests are in flight. The swap is a
//! single assignment under a write lock, and each request works on the
//! snapshot returned by [`current`].

use std::sync::{Arc, RwLock};

use tracing::{info, warn};

use super::provider::AuthProvider;
use super::CookieCodec;
use crate::config::TicketConfig;

static CURRENT: RwLock<Option<Arc<dyn AuthProvider>>> = RwLock::new(None);

/// The provider installed before any injection.
pub fn default_provider() -> Arc<dyn AuthProvider> {
    warn!("no ticket provider injected; using the placeholder key, do not use in production");
    let codec: CookieCodec = TicketConfig::default().codec();
    Arc::new(codec)
}

/// Snapshot of the active provider.
pub fn current() -> Arc<dyn AuthProvider> {
    // The guarded value is a single Arc and is never left half-written.
    let guard = CURRENT.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(provider) = guard.as_ref() {
        return Arc::clone(provider);
    }
    drop(guard);

    let mut guard = CURRENT.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    Arc::clone(guard.get_or_insert_with(default_provider))
}

/// Replace the active provider.
pub fn inject(provider: Arc<dyn AuthProvider>) {
    let name = provider.name().to_string();
    let mut guard = CURRENT.write().unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = Some(provider);
    drop(guard);
    info!(provider = %name, "ticket provider installed");
}

/// Serializes tests that touch the process-wide provider.
#[cfg(test)]
pub(crate) fn test_lock() -> std::sync::MutexGuard<'static, ()> {
    static LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
    LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Forget any injected provider. Callers hold [`test_lock`].
#[cfg(test)]
fn reset() {
    *CURRENT.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::TimeDelta;
    use serde_json::Value;
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    use super::*;
    use crate::auth::TicketKey;

    /// Counts WARN events seen on the current thread.
    #[derive(Clone, Default)]
    struct WarnCounter(Arc<AtomicUsize>);

    impl WarnCounter {
        fn count(&self) -> usize {
            self.0.load(Ordering::SeqCst)
        }
    }

    impl<S: Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_warnings(f: impl FnOnce()) -> usize {
        let counter = WarnCounter::default();
        let subscriber = tracing_subscriber::registry().with(counter.clone());
        tracing::subscriber::with_default(subscriber, f);
        counter.count()
    }

    #[test]
    fn injecting_first_emits_no_placeholder_warning() {
        let _lock = test_lock();
        reset();

        let warnings = count_warnings(|| {
            inject(Arc::new(CookieCodec::new(
                &TicketKey::from_text("real-prod-key-16").unwrap(),
            )));
            assert_eq!(current().name(), "cookie-codec");
        });
        assert_eq!(warnings, 0);
    }

    #[test]
    fn reading_before_inject_warns_once() {
        let _lock = test_lock();
        reset();

        let warnings = count_warnings(|| {
            let first = current();
            let second = current();
            assert!(Arc::ptr_eq(&first, &second));
        });
        assert_eq!(warnings, 1);
    }

    #[test]
    fn default_provider_is_the_cookie_codec() {
        let provider = default_provider();
        assert_eq!(provider.name(), "cookie-codec");
        let headers = provider.sign_out();
        assert!(headers[0].value.starts_with("CookieTicket=;"));
    }

    #[test]
    fn inject_swaps_and_old_snapshots_survive() {
        let _lock = test_lock();

        let first = CookieCodec::new(&TicketKey::from_text("first-key-16byte").unwrap())
            .with_cookie_name("first");
        inject(Arc::new(first));
        let snapshot = current();

        let second = CookieCodec::new(&TicketKey::from_text("secnd-key-16byte").unwrap())
            .with_cookie_name("second");
        inject(Arc::new(second));

        assert!(snapshot.sign_out()[0].value.starts_with("first=;"));
        assert!(current().sign_out()[0].value.starts_with("second=;"));
    }

    #[test]
    fn tickets_from_a_replaced_key_no_longer_verify() {
        let _lock = test_lock();

        inject(Arc::new(CookieCodec::new(
            &TicketKey::from_text("first-key-16byte").unwrap(),
        )));
        let headers = current()
            .issue("u1", &[], &Value::Null, TimeDelta::days(1))
            .unwrap();
        let cookie = headers[0].value.clone();
        let value = cookie
            .split(';')
            .next()
            .and_then(|pair| pair.split_once('='))
            .map(|(_, v)| v.to_string())
            .unwrap();
        let lookup = |_: &str| Some(value.clone());
        assert!(current().is_authenticated(&lookup));

        inject(Arc::new(CookieCodec::new(
            &TicketKey::from_text("secnd-key-16byte").unwrap(),
        )));
        assert!(!current().is_authenticated(&lookup));
    }
}
