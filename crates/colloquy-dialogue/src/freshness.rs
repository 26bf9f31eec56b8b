// SPDX-FileCopyrightText: 2026 Colloquy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stale-redelivery guard.
//!
//! Events older than the freshness window are dropped so that a gateway
//! replaying its backlog after an outage does not trigger a burst of late
//! answers.

use std::time::Duration;

use colloquy_config::model::DialogueConfig;

/// Verdict for one event timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// Within the window; answer it.
    Fresh { age_secs: i64 },
    /// Older than the window; do not answer.
    Stale { age_secs: i64 },
    /// Further in the future than the skew tolerance; answered anyway.
    Future { age_secs: i64 },
    /// No timestamp on the event; answered.
    Unknown,
}

impl Freshness {
    pub fn should_answer(&self) -> bool {
        !matches!(self, Freshness::Stale { .. })
    }
}

/// Applies the freshness window to raw event timestamps.
#[derive(Debug, Clone, Copy)]
pub struct FreshnessGuard {
    window: Duration,
    skew_tolerance: Duration,
}

impl FreshnessGuard {
    pub fn new(window: Duration, skew_tolerance: Duration) -> Self {
        Self {
            window,
            skew_tolerance,
        }
    }

    pub fn from_config(config: &DialogueConfig) -> Self {
        Self::new(
            Duration::from_secs(config.freshness_window_secs),
            Duration::from_secs(config.future_skew_tolerance_secs),
        )
    }

    /// Classifies `timestamp` (seconds or milliseconds) against `now_secs`.
    pub fn check(&self, timestamp: Option<i64>, now_secs: i64) -> Freshness {
        let Some(ts) = timestamp else {
            return Freshness::Unknown;
        };

        let ts_secs = normalize_to_secs(ts, now_secs);
        let age_secs = now_secs.saturating_sub(ts_secs);

        if age_secs > self.window.as_secs() as i64 {
            Freshness::Stale { age_secs }
        } else if age_secs < -(self.skew_tolerance.as_secs() as i64) {
            Freshness::Future { age_secs }
        } else {
            Freshness::Fresh { age_secs }
        }
    }
}

/// A timestamp larger than `now * 100` can only be in milliseconds.
fn normalize_to_secs(ts: i64, now_secs: i64) -> i64 {
    if ts > now_secs.saturating_mul(100) {
        ts / 1000
    } else {
        ts
    }
}
