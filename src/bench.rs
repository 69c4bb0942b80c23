//! Timed-loop helper for comparing "build a context per call" against
//! "reuse one context".
//!
//! Warm-up iterations run first and are not timed. The closure receives a
//! running index (warm-up iterations included) so it can walk a prepared
//! input list of `warmup + runs` items.

use std::time::{Duration, Instant};

use crate::errors::{CipherKitError, Result};

/// A named loop with a warm-up phase and a timed phase.
#[derive(Debug, Clone)]
pub struct TimedLoop {
    label: String,
    runs: usize,
    warmup: usize,
}

/// Timing for one finished [`TimedLoop`].
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub label: String,
    pub runs: usize,
    pub total: Duration,
}

impl BenchReport {
    /// Mean duration of one timed iteration.
    pub fn mean(&self) -> Duration {
        match u32::try_from(self.runs) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(n) => self.total / n,
        }
    }
}

impl TimedLoop {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            runs: 100,
            warmup: 3,
        }
    }

    /// Number of timed iterations.
    pub fn runs(mut self, runs: usize) -> Self {
        self.runs = runs;
        self
    }

    /// Number of untimed iterations before timing starts.
    pub fn warmup(mut self, warmup: usize) -> Self {
        self.warmup = warmup;
        self
    }

    /// Total iterations the closure will see.
    pub fn iterations(&self) -> usize {
        self.warmup + self.runs
    }

    /// Run the loop. Stops at the first error.
    pub fn run<F>(&self, mut body: F) -> Result<BenchReport>
    where
        F: FnMut(usize) -> Result<()>,
    {
        if self.runs == 0 {
            return Err(CipherKitError::CommandFailed(format!(
                "benchmark '{}' needs at least one run",
                self.label
            )));
        }

        tracing::debug!(label = %self.label, warmup = self.warmup, "warming up");
        for i in 0..self.warmup {
            body(i)?;
        }

        let start = Instant::now();
        for i in self.warmup..self.iterations() {
            body(i)?;
        }
        let total = start.elapsed();

        tracing::debug!(label = %self.label, runs = self.runs, ?total, "finished");
        Ok(BenchReport {
            label: self.label.clone(),
            runs: self.runs,
            total,
        })
    }
}
