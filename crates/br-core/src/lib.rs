//! Core domain logic for the BR interval tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Interval engine: live "time since the last entry" derived from the log
//! - Picker: binding a scroll offset to one value of a discrete domain
//! - Entry form: six pickers composed into one timestamp + category
//! - Tracker: one owner's log, store round-trips and re-anchoring

pub mod category;
pub mod clock;
pub mod entry;
pub mod event;
pub mod interval;
pub mod picker;
pub mod store;
pub mod tracker;
pub mod types;

pub use category::{Category, UnknownCategory};
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{DateSource, EntryError, EntryForm, EntryMode, Field, FieldValue, Submission};
pub use event::Event;
pub use interval::{EngineState, IntervalEngine, IntervalSnapshot, TICK_INTERVAL, TickTimer};
pub use picker::{Gesture, PickerBinding, PickerInput, ScrollCommand, UpdateSource};
pub use store::{EventStore, MemoryStore, StoreError, StoreOp};
pub use tracker::{HistoryEntry, SubmitError, Tracker, TrackerStatus};
pub use types::{EventId, OwnerId, ValidationError};
