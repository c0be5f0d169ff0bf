// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-request phase timings attached to audit and error events.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// One completed phase, measured from the moment the line was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub name: String,
    pub elapsed_micros: u64,
}

/// Timing breakdown of one request: `{total, steps}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timings {
    /// Microseconds from line receipt to completion.
    pub total: u64,
    pub steps: Vec<Step>,
}

impl Timings {
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Records phase boundaries relative to a fixed start instant.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start: Instant,
    steps: Vec<Step>,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self::started_at(Instant::now())
    }

    pub fn started_at(start: Instant) -> Self {
        Self { start, steps: Vec::new() }
    }

    /// Close the named phase now.
    pub fn mark(&mut self, name: &str) {
        let elapsed_micros = micros(self.start.elapsed());
        self.steps.push(Step { name: name.to_string(), elapsed_micros });
    }

    pub fn finish(self) -> Timings {
        Timings { total: micros(self.start.elapsed()), steps: self.steps }
    }
}

fn micros(d: Duration) -> u64 {
    u64::try_from(d.as_micros()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[path = "timing_tests.rs"]
mod tests;
