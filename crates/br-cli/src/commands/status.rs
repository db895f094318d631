//! Status command: time since the last entry.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use br_core::{Clock, EventStore, Tracker, TrackerStatus};
use chrono::TimeZone;

use super::util::format_local;

pub fn run<W, S, C, Tz>(writer: &mut W, tracker: &Tracker<S, C>, json: bool, tz: &Tz) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let status = tracker.status();
    if json {
        serde_json::to_writer_pretty(&mut *writer, &status)?;
        writeln!(writer)?;
        return Ok(());
    }

    match status {
        TrackerStatus::Setup => {
            writeln!(writer, "No entries yet. Run `br start` to record the origin.")?;
        }
        TrackerStatus::Running {
            anchor,
            elapsed,
            count,
        } => {
            writeln!(writer, "Since last BR: {elapsed}")?;
            writeln!(writer, "Last entry: {}", format_local(anchor, tz))?;
            writeln!(writer, "Count: {count}")?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use br_core::{Category, ManualClock, MemoryStore, OwnerId};
    use chrono::{Duration, FixedOffset, Utc};
    use insta::assert_snapshot;

    fn tracker(clock: &ManualClock) -> Tracker<MemoryStore, &ManualClock> {
        Tracker::new(OwnerId::new("alice").unwrap(), MemoryStore::new(), clock)
    }

    fn render(tracker: &Tracker<MemoryStore, &ManualClock>, json: bool) -> String {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let mut output = Vec::new();
        run(&mut output, tracker, json, &tz).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn status_without_entries_points_at_start() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        let mut tracker = tracker(&clock);
        tracker.load().unwrap();

        assert_snapshot!(render(&tracker, false), @"No entries yet. Run `br start` to record the origin.");
    }

    #[test]
    fn status_shows_elapsed_since_latest_entry() {
        let origin = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(origin);
        let mut tracker = tracker(&clock);
        let owner = tracker.owner().clone();
        let store = tracker.store_mut();
        store.append(&owner, origin, Category::Origin).unwrap();
        store
            .append(&owner, origin + Duration::hours(3), Category::TikTok)
            .unwrap();
        tracker.load().unwrap();
        clock.set(origin + Duration::days(1) + Duration::hours(5) + Duration::seconds(7));
        tracker.tick();

        assert_snapshot!(render(&tracker, false), @r"
        Since last BR: 1d 02h 00m 07s
        Last entry: 2024-01-01 12:00
        Count: 1
        ");
    }

    #[test]
    fn status_json() {
        let origin = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let clock = ManualClock::new(origin + Duration::minutes(90));
        let mut tracker = tracker(&clock);
        let owner = tracker.owner().clone();
        tracker
            .store_mut()
            .append(&owner, origin, Category::Origin)
            .unwrap();
        tracker.load().unwrap();

        assert_snapshot!(render(&tracker, true), @r#"
        {
          "state": "running",
          "anchor": "2024-01-01T08:00:00Z",
          "elapsed": {
            "days": 0,
            "hours": 1,
            "minutes": 30,
            "seconds": 0
          },
          "count": 0
        }
        "#);
    }
}
