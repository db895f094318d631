//! History command: every entry, most recent first.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use br_core::{Clock, EventStore, Tracker};
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
    let history = tracker.history();
    if json {
        serde_json::to_writer_pretty(&mut *writer, &history)?;
        writeln!(writer)?;
        return Ok(());
    }

    if history.is_empty() {
        writeln!(writer, "No entries.")?;
        return Ok(());
    }

    for entry in history {
        let number = entry
            .number
            .map_or_else(|| "--".to_string(), |number| format!("#{number}"));
        writeln!(
            writer,
            "{number}  {}  {}  {}",
            format_local(entry.event.timestamp, tz),
            entry.event.category,
            entry.event.id
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use br_core::{Category, ManualClock, MemoryStore, OwnerId};
    use chrono::{Duration, FixedOffset, Utc};
    use insta::assert_snapshot;

    fn loaded(clock: &ManualClock) -> Tracker<MemoryStore, &ManualClock> {
        let owner = OwnerId::new("alice").unwrap();
        let origin = Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let mut store = MemoryStore::new();
        store.append(&owner, origin, Category::Origin).unwrap();
        store
            .append(&owner, origin + Duration::days(2), Category::Porno)
            .unwrap();
        store
            .append(&owner, origin + Duration::days(1), Category::TikTok)
            .unwrap();
        let mut tracker = Tracker::new(owner, store, clock);
        tracker.load().unwrap();
        tracker
    }

    fn render(tracker: &Tracker<MemoryStore, &ManualClock>, json: bool) -> String {
        let tz = FixedOffset::east_opt(0).unwrap();
        let mut output = Vec::new();
        run(&mut output, tracker, json, &tz).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn history_numbers_entries_after_the_origin() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let tracker = loaded(&clock);

        assert_snapshot!(render(&tracker, false), @r"
        #2  2024-01-03 08:00  Porno  mem-2
        #1  2024-01-02 08:00  TikTok  mem-3
        --  2024-01-01 08:00  Départ  mem-1
        ");
    }

    #[test]
    fn history_json_flattens_entries() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let tracker = loaded(&clock);
        let output = render(&tracker, true);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed[0]["number"], 2);
        assert_eq!(parsed[0]["category"], "Porno");
        assert_eq!(parsed[2]["number"], serde_json::Value::Null);
        assert_eq!(parsed[2]["category"], "Départ");
        assert_eq!(parsed[2]["id"], "mem-1");
    }

    #[test]
    fn empty_history() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        let mut tracker = Tracker::new(OwnerId::new("bob").unwrap(), MemoryStore::new(), &clock);
        tracker.load().unwrap();

        assert_snapshot!(render(&tracker, false), @"No entries.");
    }
}
