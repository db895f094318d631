//! Start and add commands: record an entry through the picker form.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Result, bail};
use br_core::{
    Category, Clock, DateSource, EntryForm, EntryMode, EventStore, Field, SubmitError, Tracker,
};
use chrono::TimeZone;

use super::util::{format_local, native_at};
use crate::WhenArgs;

/// Records the origin entry. Only valid while the log is empty.
pub fn start<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    when: &WhenArgs,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut form = tracker.form(tz);
    if form.mode() != EntryMode::Start {
        bail!("an origin is already recorded; use `br add` to log an entry");
    }
    record(writer, tracker, &mut form, when, tz)
}

/// Records a non-origin entry. Requires an origin.
pub fn add<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    category: Option<Category>,
    when: &WhenArgs,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut form = tracker.form(tz);
    if form.mode() != EntryMode::Add {
        bail!("no origin recorded yet; run `br start` first");
    }
    if let Some(category) = category {
        form.select_category(category);
        if form.category() != category {
            bail!("category {category} cannot be added to an existing log");
        }
    }
    record(writer, tracker, &mut form, when, tz)
}

fn record<W, S, C, Tz>(
    writer: &mut W,
    tracker: &mut Tracker<S, C>,
    form: &mut EntryForm,
    when: &WhenArgs,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    S: EventStore,
    C: Clock,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    for (field, value) in [
        (Field::Day, when.day),
        (Field::Month, when.month),
        (Field::Year, when.year),
        (Field::Hour, when.hour),
        (Field::Minute, when.minute),
    ] {
        if let Some(value) = value {
            form.select(field, value);
        }
    }
    if when.at.is_none() && form.overflows() {
        writeln!(
            writer,
            "Note: the selected day does not exist in that month and rolls over into the next one."
        )?;
    }

    let native = when
        .at
        .as_deref()
        .map(|at| native_at(at, tracker.engine().clock().now(), tz))
        .transpose()?;
    let source = native
        .as_deref()
        .map_or(DateSource::Pickers, DateSource::Native);

    let event = match tracker.submit(form, source, tz) {
        Ok(event) => event,
        Err(SubmitError::Store(err)) => {
            let message = err.user_message();
            return Err(anyhow::Error::new(err).context(message));
        }
        Err(err) => return Err(err.into()),
    };

    writeln!(
        writer,
        "Recorded {} at {}",
        event.category,
        format_local(event.timestamp, tz)
    )?;
    writeln!(writer, "Id: {}", event.id)?;
    Ok(())
}
