//! Watch command: live elapsed time, one line per tick.

use std::future::Future;
use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use br_core::{Clock, EventStore, Tracker};
use tokio::time::MissedTickBehavior;

/// Prints the elapsed time every `period` until `shutdown` resolves or
/// `ticks` lines were printed.
///
/// The log is reloaded on every tick so entries recorded by another process
/// move the anchor; the interval restarts whenever the engine re-arms its
/// timer. Returns how many times it restarted.
pub async fn run<W, S, C, F>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    period: Duration,
    ticks: Option<u64>,
    shutdown: F,
) -> Result<u64>
where
    W: Write,
    S: EventStore,
    C: Clock,
    F: Future<Output = ()>,
{
    tokio::pin!(shutdown);
    tracker.mount();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut generation = tracker.engine().timer().generation();
    let mut remaining = ticks;
    let mut waiting = false;
    let mut restarts = 0;

    while remaining != Some(0) {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                tracing::debug!("watch interrupted");
                break;
            }
            _ = interval.tick() => {}
        }

        if let Err(err) = tracker.load() {
            writeln!(writer, "{} (showing last known state)", err.user_message())?;
        }
        let timer = tracker.engine().timer();
        if timer.generation() != generation {
            generation = timer.generation();
            restarts += 1;
            interval.reset();
            tracing::debug!(generation, "anchor changed, tick timer re-armed");
        }

        match tracker.tick() {
            Some(snapshot) => {
                waiting = false;
                writeln!(writer, "{snapshot}")?;
            }
            None if !waiting => {
                waiting = true;
                writeln!(writer, "Waiting for the origin entry (`br start`)...")?;
            }
            None => {}
        }
        writer.flush()?;
        remaining = remaining.map(|n| n.saturating_sub(1));
    }

    tracker.unmount();
    Ok(restarts)
}
