//! Freshness and single-use checks for inbound signed requests.
//!
//! [`ReplayWindow`] bounds how far a request timestamp may drift from the verifier's clock, in either direction. On
//! its own it still lets a captured request be replayed until the window closes. A [`ReplayGuard`] closes that gap by
//! remembering which signature and digest pairs it has already accepted.
use std::{collections::HashMap, sync::Mutex};

use chrono::{DateTime, Duration, Utc};
use log::*;

use crate::errors::VerificationError;

pub const DEFAULT_REPLAY_WINDOW_SECS: i64 = 300;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayWindow {
    max_skew: Duration,
}

impl Default for ReplayWindow {
    fn default() -> Self {
        Self::from_secs(DEFAULT_REPLAY_WINDOW_SECS)
    }
}

impl ReplayWindow {
    pub fn new(max_skew: Duration) -> Self {
        Self { max_skew }
    }

    pub fn from_secs(secs: i64) -> Self {
        Self { max_skew: Duration::seconds(secs) }
    }

    pub fn max_skew(&self) -> Duration {
        self.max_skew
    }

    /// Accepts a timestamp whose distance from `now` is at most the window, inclusive. Timestamps from the future are
    /// tolerated up to the same bound to allow for clock drift.
    pub fn check(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), VerificationError> {
        let skew = now.signed_duration_since(timestamp);
        if skew.num_milliseconds().abs() <= self.max_skew.num_milliseconds() {
            Ok(())
        } else {
            Err(VerificationError::StaleOrFutureTimestamp { skew_secs: skew.num_seconds() })
        }
    }
}

/// Remembers accepted requests so that each one can be used only once.
///
/// Implementations are consulted after every other check has passed, and must be safe to call from many threads.
pub trait ReplayGuard: Send + Sync {
    /// Records the request and returns `true` if it has not been seen before, or `false` for a replay.
    ///
    /// The signature does not cover the body, so two requests to the same endpoint in the same second share one. The
    /// `digest` tells them apart.
    fn check_and_record(
        &self,
        merchant_id: &str,
        signature: &str,
        digest: &str,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool;
}

/// Stateless verification: every fresh request is accepted, including replays inside the window.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoReplayGuard;

impl ReplayGuard for NoReplayGuard {
    fn check_and_record(&self, _: &str, _: &str, _: &str, _: DateTime<Utc>, _: DateTime<Utc>) -> bool {
        true
    }
}

/// A process-local cache of seen signatures. Entries are dropped once they fall out of the replay window, since the
/// freshness check rejects those requests anyway.
#[derive(Debug, Default)]
pub struct InMemoryReplayGuard {
    window: ReplayWindow,
    seen: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl InMemoryReplayGuard {
    pub fn new(window: ReplayWindow) -> Self {
        Self { window, seen: Mutex::new(HashMap::new()) }
    }

    pub fn len(&self) -> usize {
        match self.seen.lock() {
            Ok(seen) => seen.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ReplayGuard for InMemoryReplayGuard {
    fn check_and_record(
        &self,
        merchant_id: &str,
        signature: &str,
        digest: &str,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> bool {
        let mut seen = match self.seen.lock() {
            Ok(seen) => seen,
            Err(poisoned) => {
                warn!("🔐️ Replay cache lock was poisoned. Recovering the cache contents.");
                poisoned.into_inner()
            },
        };
        let before = seen.len();
        seen.retain(|_, ts| self.window.check(*ts, now).is_ok());
        if seen.len() < before {
            trace!("🔐️ Purged {} expired entries from the replay cache", before - seen.len());
        }
        let key = format!("{merchant_id}|{signature}|{digest}");
        if seen.contains_key(&key) {
            return false;
        }
        seen.insert(key, timestamp);
        true
    }
}
