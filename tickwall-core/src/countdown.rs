/// Wall-clock-aligned candle countdown
///
/// Tracks the time remaining until the next interval boundary, where a
/// boundary is an exact multiple of the interval length since the Unix
/// epoch. The countdown is independent of the data stream: it keeps running
/// whether or not the feed delivers anything.
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::types::Timeframe;

/// Milliseconds until the next epoch-aligned boundary
///
/// Exactly on a boundary the full interval remains, never zero.
/// `interval_minutes` must be nonzero; there is no boundary spacing to
/// count down to otherwise.
pub fn remaining_ms(interval_minutes: u64, now_ms: i64) -> i64 {
    debug_assert!(interval_minutes > 0, "interval_minutes must be nonzero");
    let interval_ms = interval_minutes as i64 * 60_000;
    interval_ms - now_ms.rem_euclid(interval_ms)
}

/// Render a remaining-time value as zero-padded `MM:SS`
pub fn format_remaining(remaining_ms: i64) -> String {
    let minutes = remaining_ms / 60_000;
    let seconds = (remaining_ms % 60_000) / 1_000;
    format!("{:02}:{:02}", minutes, seconds)
}

/// Handle to the countdown task for one timeframe
///
/// The task recomputes once immediately and then on a fixed one-second poll;
/// a display staleness of up to ~1s is expected. Reconfiguration is
/// replacement: drop the old handle (aborting its task) before spawning a
/// new one, so two polls never run concurrently.
#[derive(Debug)]
pub struct CandleCountdown {
    handle: JoinHandle<()>,
    rx: watch::Receiver<String>,
}

impl CandleCountdown {
    /// Spawn the one-second poll for `timeframe`
    pub fn spawn(timeframe: Timeframe) -> Self {
        let minutes = timeframe.minutes();
        let initial = format_remaining(remaining_ms(minutes, Utc::now().timestamp_millis()));
        let (tx, rx) = watch::channel(initial);

        let handle = tokio::spawn(async move {
            let mut poll = tokio::time::interval(Duration::from_secs(1));
            loop {
                poll.tick().await;
                let now_ms = Utc::now().timestamp_millis();
                let display = format_remaining(remaining_ms(minutes, now_ms));
                if tx.send(display).is_err() {
                    debug!("countdown receiver dropped, stopping poll");
                    break;
                }
            }
        });

        Self { handle, rx }
    }

    /// Current `MM:SS` display value
    pub fn display(&self) -> String {
        self.rx.borrow().clone()
    }
}

impl Drop for CandleCountdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
