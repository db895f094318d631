//! Event log store contract.
//!
//! The core never owns persistence: it lists, appends and deletes through
//! [`EventStore`]. [`MemoryStore`] is the in-process implementation used by
//! tests and ephemeral sessions.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::category::Category;
use crate::event::{Event, sort_descending};
use crate::types::{EventId, OwnerId};

/// Store operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Append,
    Delete,
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::List => "list",
            Self::Append => "append",
            Self::Delete => "delete",
        })
    }
}

/// Store errors.
///
/// Failures are never retried; the user resubmits.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not complete the operation.
    #[error("store unavailable during {operation}: {reason}")]
    Unavailable { operation: StoreOp, reason: String },
}

impl StoreError {
    pub fn unavailable(operation: StoreOp, reason: impl fmt::Display) -> Self {
        Self::Unavailable {
            operation,
            reason: reason.to_string(),
        }
    }

    /// Short message suitable for a dismissible notification.
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::Unavailable {
                operation: StoreOp::List,
                ..
            } => "Could not load history",
            Self::Unavailable {
                operation: StoreOp::Append,
                ..
            } => "Could not save the entry",
            Self::Unavailable {
                operation: StoreOp::Delete,
                ..
            } => "Could not delete the entry",
        }
    }
}

/// Owner-scoped, append/delete keyed log of entries.
pub trait EventStore {
    /// Lists the owner's entries, most recent first.
    fn list(&self, owner: &OwnerId) -> Result<Vec<Event>, StoreError>;

    /// Appends an entry and returns it with its store-assigned id.
    fn append(
        &mut self,
        owner: &OwnerId,
        timestamp: DateTime<Utc>,
        category: Category,
    ) -> Result<Event, StoreError>;

    /// Deletes one of the owner's entries. Unknown ids are not an error.
    fn delete(&mut self, owner: &OwnerId, id: &EventId) -> Result<(), StoreError>;
}

/// In-memory store keyed by owner.
#[derive(Debug, Default)]
pub struct MemoryStore {
    logs: HashMap<OwnerId, Vec<Event>>,
    next_id: u64,
    offline: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following operation fail with [`StoreError::Unavailable`].
    pub const fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    fn check(&self, operation: StoreOp) -> Result<(), StoreError> {
        if self.offline {
            return Err(StoreError::unavailable(operation, "store is offline"));
        }
        Ok(())
    }
}

impl EventStore for MemoryStore {
    fn list(&self, owner: &OwnerId) -> Result<Vec<Event>, StoreError> {
        self.check(StoreOp::List)?;
        let mut log = self.logs.get(owner).cloned().unwrap_or_default();
        sort_descending(&mut log);
        Ok(log)
    }

    fn append(
        &mut self,
        owner: &OwnerId,
        timestamp: DateTime<Utc>,
        category: Category,
    ) -> Result<Event, StoreError> {
        self.check(StoreOp::Append)?;
        self.next_id += 1;
        let id = EventId::new(format!("mem-{}", self.next_id))
            .map_err(|err| StoreError::unavailable(StoreOp::Append, err))?;
        let event = Event {
            id,
            owner: owner.clone(),
            timestamp,
            category,
        };
        self.logs
            .entry(owner.clone())
            .or_default()
            .push(event.clone());
        Ok(event)
    }

    fn delete(&mut self, owner: &OwnerId, id: &EventId) -> Result<(), StoreError> {
        self.check(StoreOp::Delete)?;
        if let Some(log) = self.logs.get_mut(owner) {
            log.retain(|event| &event.id != id);
        }
        Ok(())
    }
}
