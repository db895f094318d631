//! Delete command.

use std::io::Write;

use anyhow::{Context, Result};
use br_core::{Clock, EventId, EventStore, Tracker};

pub fn run<W, S, C>(writer: &mut W, tracker: &mut Tracker<S, C>, id: &str) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
{
    let id = EventId::new(id).context("invalid entry id")?;
    if !tracker.log().iter().any(|event| event.id == id) {
        writeln!(writer, "No entry with id {id}.")?;
        return Ok(());
    }
    if let Err(err) = tracker.delete(&id) {
        let message = err.user_message();
        return Err(anyhow::Error::new(err).context(message));
    }
    writeln!(writer, "Deleted entry {id}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use br_core::{Category, ManualClock, MemoryStore, OwnerId};
    use chrono::{TimeZone, Utc};

    fn tracker(clock: &ManualClock) -> Tracker<MemoryStore, &ManualClock> {
        let owner = OwnerId::new("alice").unwrap();
        let mut store = MemoryStore::new();
        for day in 1..=2 {
            let at = Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap();
            store.append(&owner, at, Category::TikTok).unwrap();
        }
        let mut tracker = Tracker::new(owner, store, clock);
        tracker.load().unwrap();
        tracker
    }

    #[test]
    fn deleting_latest_entry_moves_the_anchor_back() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
        let mut tracker = tracker(&clock);
        let mut out = Vec::new();
        run(&mut out, &mut tracker, "mem-2").unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "Deleted entry mem-2\n");
        assert_eq!(
            tracker.engine().anchor(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn unknown_id_is_reported_not_failed() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
        let mut tracker = tracker(&clock);
        let mut out = Vec::new();
        run(&mut out, &mut tracker, "mem-9").unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "No entry with id mem-9.\n");
        assert_eq!(tracker.log().len(), 2);
    }

    #[test]
    fn blank_id_is_rejected() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
        let mut tracker = tracker(&clock);
        let mut out = Vec::new();
        assert!(run(&mut out, &mut tracker, "  ").is_err());
    }

    #[test]
    fn store_failure_keeps_the_entry() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap());
        let mut tracker = tracker(&clock);
        tracker.store_mut().set_offline(true);
        let mut out = Vec::new();
        let err = run(&mut out, &mut tracker, "mem-1").unwrap_err();

        assert_eq!(err.to_string(), "Could not delete the entry");
        assert_eq!(tracker.log().len(), 2);
    }
}
