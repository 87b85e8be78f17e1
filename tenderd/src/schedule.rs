//! Scheduler for the periodic auto-close runs.
//!
//! The scheduler can be configured with a start time and execution frequency,
//! and will align execution times with the configured schedule. A tick that
//! falls behind (a slow run, a suspended host) is skipped rather than
//! replayed in a burst.

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use tender_engine::autoclose::DEFAULT_BATCH_SIZE;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tokio::time::MissedTickBehavior;
use tracing::{Instrument as _, Level, event, span};

/// Configuration for scheduling the auto-close runs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Scheduler {
    /// An RFC3339 timestamp to align the schedule to (if omitted, defaults to now)
    #[serde(with = "time::serde::rfc3339::option", default)]
    pub from: Option<time::OffsetDateTime>,
    /// How often to run; no runs at all when omitted
    #[serde(with = "humantime_serde::option", default)]
    pub every: Option<Duration>,
    /// The most tenders a single run considers
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
}

fn default_batch_size() -> u32 {
    DEFAULT_BATCH_SIZE
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            from: None,
            every: Some(Duration::from_secs(60)),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl Scheduler {
    /// Execute `f` at regular intervals, forever.
    ///
    /// Returns immediately if no interval is configured. A failing run is
    /// logged and the schedule carries on with the next tick.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use tenderd::Scheduler;
    ///
    /// # async fn example() {
    /// let scheduler = Scheduler {
    ///     from: None,
    ///     every: Some(Duration::from_secs(60)),
    ///     batch_size: 100,
    /// };
    ///
    /// scheduler
    ///     .schedule(async |tick| {
    ///         println!("closing tenders due at {tick}");
    ///         Ok::<(), String>(())
    ///     })
    ///     .await;
    /// # }
    /// ```
    pub async fn schedule<T, E: fmt::Display>(
        &self,
        f: impl AsyncFn(OffsetDateTime) -> Result<T, E>,
    ) {
        // extract the duration or return immediately
        let Some(delta) = self.every else {
            return;
        };

        let now = OffsetDateTime::now_utc();
        let mut anchor = self.from.map_or(now, |from| first_tick(from, now, delta));

        // align the clocks as best we can
        let sleepy: Duration = (anchor - now).try_into().unwrap_or(Duration::ZERO);
        tokio::time::sleep(sleepy).await;

        let mut interval = tokio::time::interval(delta);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;

            let span = span!(Level::INFO, "auto_close_tick");
            async {
                event!(
                    Level::INFO,
                    tick = anchor.format(&Rfc3339).unwrap_or_default()
                );
                if let Err(error) = f(anchor).await {
                    event!(Level::WARN, %error, "scheduled run failed");
                }
            }
            .instrument(span)
            .await;

            anchor += delta;
        }
    }
}

/// The first instant of the schedule anchored at `from` that is not before `now`.
fn first_tick(from: OffsetDateTime, now: OffsetDateTime, every: Duration) -> OffsetDateTime {
    if from >= now || every.is_zero() {
        return from;
    }
    let periods = ((now - from) / every).ceil() as u32;
    from + every * periods
}
