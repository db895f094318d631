//! Tracker session for one owner.
//!
//! Holds the owner's log as last acknowledged by the store and the interval
//! engine derived from it. Mutations go to the store first; the cached log
//! and the anchor only change once the store has acknowledged them.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::category::Category;
use crate::clock::Clock;
use crate::entry::{DateSource, EntryError, EntryForm};
use crate::event::{Event, sort_descending};
use crate::interval::{
    EngineState, IntervalEngine, IntervalSnapshot, derive_count, number_entries,
};
use crate::store::{EventStore, StoreError};
use crate::types::{EventId, OwnerId};

/// Errors from submitting an entry form.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Entry(#[from] EntryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What the tracker view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TrackerStatus {
    Setup,
    Running {
        anchor: DateTime<Utc>,
        elapsed: IntervalSnapshot,
        count: usize,
    },
}

/// A log entry with its display number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// `None` for origin entries.
    pub number: Option<usize>,
    #[serde(flatten)]
    pub event: Event,
}

/// One owner's log, its interval engine and the store behind them.
#[derive(Debug)]
pub struct Tracker<S, C> {
    owner: OwnerId,
    store: S,
    engine: IntervalEngine<C>,
    log: Vec<Event>,
}

impl<S: EventStore, C: Clock> Tracker<S, C> {
    pub fn new(owner: OwnerId, store: S, clock: C) -> Self {
        Self {
            owner,
            store,
            engine: IntervalEngine::new(clock),
            log: Vec::new(),
        }
    }

    /// Reads the owner's log and re-derives the anchor.
    ///
    /// On failure the previously loaded log stays in place.
    pub fn load(&mut self) -> Result<(), StoreError> {
        let log = self.store.list(&self.owner).inspect_err(|err| {
            tracing::warn!(owner = %self.owner, error = %err, "failed to load log");
        })?;
        tracing::debug!(owner = %self.owner, entries = log.len(), "log loaded");
        self.replace_log(log);
        Ok(())
    }

    /// Submits a form.
    ///
    /// The form is reset to the current time and the anchor re-derived only
    /// after the store acknowledged the append. On failure neither changes.
    pub fn submit<Tz: TimeZone>(
        &mut self,
        form: &mut EntryForm,
        source: DateSource<'_>,
        tz: &Tz,
    ) -> Result<Event, SubmitError> {
        let submission = form.submission(&self.owner, source, tz)?;
        let event = self
            .store
            .append(&submission.owner, submission.timestamp, submission.category)
            .inspect_err(|err| {
                tracing::warn!(owner = %self.owner, error = %err, "append failed");
            })?;
        tracing::debug!(
            id = %event.id,
            timestamp = %submission.iso_timestamp(),
            category = %event.category,
            "entry appended"
        );

        form.reset(self.local_now(tz));
        let mut log = std::mem::take(&mut self.log);
        log.push(event.clone());
        self.replace_log(log);
        Ok(event)
    }

    /// Deletes one of the owner's entries.
    pub fn delete(&mut self, id: &EventId) -> Result<(), StoreError> {
        self.store.delete(&self.owner, id).inspect_err(|err| {
            tracing::warn!(owner = %self.owner, %id, error = %err, "delete failed");
        })?;
        tracing::debug!(%id, "entry deleted");
        let mut log = std::mem::take(&mut self.log);
        log.retain(|event| &event.id != id);
        self.replace_log(log);
        Ok(())
    }

    fn replace_log(&mut self, mut log: Vec<Event>) {
        sort_descending(&mut log);
        self.log = log;
        self.engine.rederive(&self.log);
    }

    /// Advances the live display by one tick.
    pub fn tick(&mut self) -> Option<IntervalSnapshot> {
        self.engine.tick()
    }

    /// Stops the tick timer when the view is torn down.
    ///
    /// The cached log and anchor stay, so status and form stay accurate.
    pub fn unmount(&mut self) {
        self.engine.unmount();
    }

    /// Restarts the tick timer for a view shown again.
    pub fn mount(&mut self) {
        self.engine.mount();
    }

    pub fn status(&self) -> TrackerStatus {
        match self.engine.state() {
            EngineState::Setup => TrackerStatus::Setup,
            EngineState::Running { anchor, snapshot } => TrackerStatus::Running {
                anchor,
                elapsed: snapshot,
                count: self.count(),
            },
        }
    }

    /// Number of non-origin entries.
    pub fn count(&self) -> usize {
        derive_count(&self.log, Category::Origin)
    }

    /// The log, most recent first, with display numbers.
    pub fn history(&self) -> Vec<HistoryEntry> {
        number_entries(&self.log, Category::Origin)
            .into_iter()
            .zip(&self.log)
            .map(|(number, event)| HistoryEntry {
                number,
                event: event.clone(),
            })
            .collect()
    }

    /// A fresh form matching the current state: the start form while the
    /// log is empty, the add form otherwise.
    pub fn form<Tz: TimeZone>(&self, tz: &Tz) -> EntryForm {
        let now = self.local_now(tz);
        match self.engine.state() {
            EngineState::Setup => EntryForm::start(now),
            EngineState::Running { .. } => EntryForm::add(now),
        }
    }

    fn local_now<Tz: TimeZone>(&self, tz: &Tz) -> chrono::NaiveDateTime {
        self.engine.clock().now().with_timezone(tz).naive_local()
    }

    pub fn log(&self) -> &[Event] {
        &self.log
    }

    pub const fn engine(&self) -> &IntervalEngine<C> {
        &self.engine
    }

    pub const fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
