//! # scheduler
//!
//! Drives the cycle body on a fixed cadence.
//!
//! [`run_loop`] owns the "never exit on a cycle error" rule: a panic inside a
//! cycle is caught, logged, and the loop waits for the next tick.  The
//! cadence itself lives behind [`Ticker`] so the loop can be tested without
//! wall-clock sleeps.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use tracing::{error, info};

/// Source of cycle-start events.
#[async_trait]
pub trait Ticker: Send {
    /// Waits until the next cycle should start and returns its start instant.
    /// `None` ends the loop.
    async fn tick(&mut self) -> Option<DateTime<Utc>>;
}

/// Fires immediately, then once per `interval` measured from the end of the
/// previous cycle.  Never ends.
pub struct IntervalTicker {
    interval: Duration,
    started:  bool,
}

impl IntervalTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval, started: false }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> Option<DateTime<Utc>> {
        if self.started {
            info!(interval = ?self.interval, "💤 Sleeping until next cycle...");
            tokio::time::sleep(self.interval).await;
        }
        self.started = true;
        Some(Utc::now())
    }
}

/// Runs `cycle` on every tick until the ticker ends.  Returns the number of
/// cycles started.
///
/// The cycle future is infallible: every broker failure is degraded where it
/// happens, so its output is only a summary to log.  Panics are the one
/// failure left, and they are caught here.
pub async fn run_loop<T, F, Fut>(ticker: &mut T, mut cycle: F) -> u64
where
    T: Ticker + ?Sized,
    F: FnMut(DateTime<Utc>) -> Fut,
    Fut: Future,
    Fut::Output: Display,
{
    let mut cycles = 0;

    while let Some(now) = ticker.tick().await {
        cycles += 1;
        info!(cycle = cycles, %now, "🔁 Cycle starting");

        match AssertUnwindSafe(cycle(now)).catch_unwind().await {
            Ok(outcome) => info!(cycle = cycles, %outcome, "✅ Cycle complete"),
            Err(panic) => error!(
                cycle = cycles,
                panic = %panic_message(panic.as_ref()),
                "❌ Cycle error; will retry next interval"
            ),
        }
    }

    cycles
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
