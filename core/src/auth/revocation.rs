//! Token revocation registry
//!
//! In-process blacklist of logged-out tokens. Constructed once at startup
//! and cloned into whatever needs it; clones share one map, so revocation
//! is process-wide. For multi-instance deployments, replace with shared
//! storage.
//!
//! Entries are keyed by the raw token string and retained until the
//! token's own expiry, after which a periodic sweep drops them. There is
//! no per-entry timer.

use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

/// Shared registry of revoked tokens
#[derive(Clone, Default)]
pub struct RevocationRegistry {
    inner: Arc<Mutex<HashMap<String, i64>>>,
}

impl RevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Recover the map even if a holder panicked
    fn entries(&self) -> MutexGuard<'_, HashMap<String, i64>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Revoke a token until `expires_at` (Unix seconds, the token's own
    /// `exp` claim)
    pub fn invalidate(&self, token: &str, expires_at: i64) {
        self.entries().insert(token.to_string(), expires_at);
    }

    /// Check whether a token has been revoked
    pub fn is_revoked(&self, token: &str) -> bool {
        self.entries().contains_key(token)
    }

    /// Drop entries whose token has expired, returning how many were
    /// removed
    pub fn sweep(&self) -> usize {
        let now = Utc::now().timestamp();
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, expires_at| *expires_at > now);
        before - entries.len()
    }

    /// Number of revoked tokens currently held
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Spawn a background task sweeping this registry at `interval`
    ///
    /// The handle can be aborted at shutdown; entries are in-process
    /// only, so nothing needs flushing.
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let registry = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = registry.sweep();
                if removed > 0 {
                    debug!(removed, remaining = registry.len(), "Swept revocation registry");
                }
            }
        })
    }
}
