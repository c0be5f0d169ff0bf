// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect delay schedule.
//!
//! The first retry after a healthy connection drops is immediate. Consecutive
//! failures then wait `floor`, growing by `factor` each time up to `max`.

use std::time::Duration;

use crate::config::ClientConfig;

#[derive(Debug, Clone)]
pub(crate) struct Backoff {
    floor: Duration,
    factor: f64,
    max: Duration,
    current: Duration,
}

impl Backoff {
    pub fn new(floor: Duration, factor: f64, max: Duration) -> Self {
        Self { floor, factor: factor.max(1.0), max: max.max(floor), current: Duration::ZERO }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.retry_floor, config.retry_factor, config.retry_max)
    }

    /// Delay before the next attempt; advances the schedule.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = if delay.is_zero() {
            self.floor
        } else {
            scale(delay, self.factor).clamp(self.floor, self.max)
        };
        delay
    }

    /// Back to an immediate retry, after a connection opened.
    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
    }
}

/// Multiply in whole nanoseconds so the schedule stays exact.
fn scale(delay: Duration, factor: f64) -> Duration {
    let nanos = (delay.as_nanos() as f64 * factor).round();
    if nanos >= u64::MAX as f64 {
        Duration::from_nanos(u64::MAX)
    } else {
        Duration::from_nanos(nanos as u64)
    }
}

#[cfg(test)]
#[path = "backoff_tests.rs"]
mod tests;
