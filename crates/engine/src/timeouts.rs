// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bounded waits for process start and stop

use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTimeouts {
    /// Wait for the process to report started
    pub start: Duration,
    /// Wait after SIGTERM before escalating to SIGKILL
    pub grace: Duration,
    /// Wait after SIGKILL, and for output to drain after exit
    pub kill: Duration,
}

impl Default for ProcessTimeouts {
    fn default() -> Self {
        Self {
            start: Duration::from_secs(5),
            grace: Duration::from_secs(5),
            kill: Duration::from_secs(1),
        }
    }
}

impl ProcessTimeouts {
    /// Defaults overridden by `AV_TIMEOUT_START_MS`, `AV_TIMEOUT_GRACE_MS`
    /// and `AV_TIMEOUT_KILL_MS`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            start: parse_duration_ms("AV_TIMEOUT_START_MS").unwrap_or(defaults.start),
            grace: parse_duration_ms("AV_TIMEOUT_GRACE_MS").unwrap_or(defaults.grace),
            kill: parse_duration_ms("AV_TIMEOUT_KILL_MS").unwrap_or(defaults.kill),
        }
    }
}

#[cfg(test)]
#[path = "timeouts_tests.rs"]
mod tests;
