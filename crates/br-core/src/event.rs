//! Logged entries and the owner-scoped ordered log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::types::{EventId, OwnerId};

/// A single logged entry.
///
/// Created on form submission and deleted by id; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned identifier.
    pub id: EventId,
    /// Owner of the log this entry belongs to.
    pub owner: OwnerId,
    /// When the entry happened.
    pub timestamp: DateTime<Utc>,
    /// What kind of entry this is.
    pub category: Category,
}

impl Event {
    /// Whether this entry marks the start of tracking.
    pub const fn is_anchor_marker(&self) -> bool {
        self.category.is_origin()
    }
}

/// Sorts a log so the most recent entry comes first.
///
/// Ties on timestamp fall back to id so the order is stable across reloads.
pub fn sort_descending(log: &mut [Event]) {
    log.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then_with(|| b.id.as_str().cmp(a.id.as_str()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event(id: &str, hour: u32, category: Category) -> Event {
        Event {
            id: EventId::new(id).unwrap(),
            owner: OwnerId::new("owner").unwrap(),
            timestamp: Utc.with_ymd_and_hms(2024, 1, 1, hour, 0, 0).unwrap(),
            category,
        }
    }

    #[test]
    fn event_serialization_roundtrip() {
        let event = event("e-1", 3, Category::Porno);

        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, event);
    }

    #[test]
    fn event_rejects_empty_ids() {
        let json = r#"{
            "id": "",
            "owner": "owner",
            "timestamp": "2024-01-01T00:00:00Z",
            "category": "TikTok"
        }"#;
        let result: Result<Event, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn sort_descending_puts_latest_first() {
        let mut log = vec![
            event("a", 1, Category::Origin),
            event("b", 5, Category::TikTok),
            event("c", 3, Category::Imagination),
        ];
        sort_descending(&mut log);
        let ids: Vec<_> = log.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
        assert!(log[2].is_anchor_marker());
    }
}
