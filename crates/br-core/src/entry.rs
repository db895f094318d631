//! Composite entry form.
//!
//! Five numeric pickers (day, month, year, hour, minute) and one categorical
//! picker build a single local date-time plus category. A native
//! `datetime-local` string is accepted as an alternative date source.
//!
//! # Calendar overflow
//!
//! Day values are not validated against the month: day 31 in a 30-day month
//! rolls over into the first day of the next month, the same way a lenient
//! date constructor normalizes it. Callers relying on strict dates must check
//! [`EntryForm::overflows`] themselves.

use std::fmt;
use std::ops::RangeInclusive;

use chrono::{
    DateTime, Datelike, Days, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime,
    SecondsFormat, TimeZone, Timelike, Utc,
};
use thiserror::Error;

use crate::category::Category;
use crate::picker::{Effects, Gesture, PickerBinding, PickerInput, ScrollCommand};
use crate::types::OwnerId;

pub const DAY_RANGE: RangeInclusive<u32> = 1..=31;
pub const MONTH_RANGE: RangeInclusive<u32> = 1..=12;
pub const YEAR_RANGE: RangeInclusive<u32> = 2000..=2100;
pub const HOUR_RANGE: RangeInclusive<u32> = 0..=23;
pub const MINUTE_RANGE: RangeInclusive<u32> = 0..=59;

const NATIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Entry form errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The native input was left empty where it is the only date source.
    #[error("no date selected")]
    MissingDate,
    /// The native input did not match `YYYY-MM-DDTHH:MM[:SS]`.
    #[error("invalid date input: {input}")]
    InvalidInput { input: String },
    /// The selected values do not map onto an instant.
    #[error("cannot represent {local} in the configured time zone")]
    Unrepresentable { local: String },
}

/// Which flow the form belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMode {
    /// First entry of an empty log; always logs an origin entry.
    Start,
    /// Additional entry with a user-chosen category.
    Add,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Day,
    Month,
    Year,
    Hour,
    Minute,
    Category,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
            Self::Hour => "hour",
            Self::Minute => "minute",
            Self::Category => "category",
        })
    }
}

/// Value reported by one of the form's pickers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldValue {
    Number(u32),
    Category(Category),
}

/// Where the submitted date comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource<'a> {
    Pickers,
    /// Raw `datetime-local` value from a constrained-viewport layout.
    Native(&'a str),
}

/// A candidate entry ready for the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub owner: OwnerId,
    pub timestamp: DateTime<Utc>,
    pub category: Category,
}

impl Submission {
    /// ISO-8601 instant as handed to the store.
    pub fn iso_timestamp(&self) -> String {
        self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Six pickers composed into one entry.
#[derive(Debug, Clone)]
pub struct EntryForm {
    mode: EntryMode,
    day: PickerBinding<u32>,
    month: PickerBinding<u32>,
    year: PickerBinding<u32>,
    hour: PickerBinding<u32>,
    minute: PickerBinding<u32>,
    category: PickerBinding<Category>,
}

impl EntryForm {
    /// Form for the first, origin entry.
    pub fn start(now: NaiveDateTime) -> Self {
        Self::mounted(EntryMode::Start, now)
    }

    /// Form for adding an entry to an existing log.
    pub fn add(now: NaiveDateTime) -> Self {
        Self::mounted(EntryMode::Add, now)
    }

    fn mounted(mode: EntryMode, now: NaiveDateTime) -> Self {
        let categories = match mode {
            EntryMode::Start => vec![Category::Origin],
            EntryMode::Add => Category::ENTRY_CHOICES.to_vec(),
        };
        let mut form = Self {
            mode,
            day: PickerBinding::new(DAY_RANGE.collect()),
            month: PickerBinding::new(MONTH_RANGE.collect()),
            year: PickerBinding::new(YEAR_RANGE.collect()),
            hour: PickerBinding::new(HOUR_RANGE.collect()),
            minute: PickerBinding::new(MINUTE_RANGE.collect()),
            category: PickerBinding::new(categories),
        };
        form.place(now, true);
        form
    }

    /// Resets every picker to `now` and the default category.
    ///
    /// Programmatic, so no change is reported back.
    pub fn reset(&mut self, now: NaiveDateTime) {
        self.place(now, false);
    }

    fn place(&mut self, now: NaiveDateTime, mount: bool) {
        fn input<T>(value: T, mount: bool) -> PickerInput<T> {
            if mount {
                PickerInput::Mount(value)
            } else {
                PickerInput::Reset(value)
            }
        }

        let year = u32::try_from(now.year()).unwrap_or_default();
        self.day.apply(input(now.day(), mount));
        self.month.apply(input(now.month(), mount));
        self.year.apply(input(year, mount));
        self.hour.apply(input(now.hour(), mount));
        self.minute.apply(input(now.minute(), mount));
        let category = self.default_category();
        self.category.apply(input(category, mount));
    }

    /// Mounts every picker again at `now` after [`Self::unmount`].
    pub fn mount(&mut self, now: NaiveDateTime) {
        self.place(now, true);
    }

    /// Unmounts every picker. Gestures are ignored until [`Self::mount`].
    pub fn unmount(&mut self) {
        for picker in [
            &mut self.day,
            &mut self.month,
            &mut self.year,
            &mut self.hour,
            &mut self.minute,
        ] {
            picker.apply(PickerInput::Unmount);
        }
        self.category.apply(PickerInput::Unmount);
    }

    const fn default_category(&self) -> Category {
        match self.mode {
            EntryMode::Start => Category::Origin,
            EntryMode::Add => Category::DEFAULT_ENTRY,
        }
    }

    pub const fn mode(&self) -> EntryMode {
        self.mode
    }

    /// Routes a gesture to one picker.
    pub fn apply(&mut self, field: Field, gesture: Gesture) -> Effects<FieldValue> {
        let effects = match self.numeric_mut(field) {
            Some(picker) => {
                let Effects { emitted, scroll } = picker.apply(gesture.into());
                Effects {
                    emitted: emitted.map(FieldValue::Number),
                    scroll,
                }
            }
            None => {
                let Effects { emitted, scroll } = self.category.apply(gesture.into());
                Effects {
                    emitted: emitted.map(FieldValue::Category),
                    scroll,
                }
            }
        };
        if let Some(value) = effects.emitted {
            tracing::debug!(%field, ?value, "picker changed");
        }
        effects
    }

    /// Selects `value` as if its row had been clicked.
    ///
    /// Values outside the field's domain leave the selection unchanged.
    pub fn select(&mut self, field: Field, value: u32) -> Option<ScrollCommand> {
        let picker = self.numeric_mut(field)?;
        let Some(row) = picker.position_of(&value) else {
            tracing::debug!(%field, value, "value outside picker domain, ignoring");
            return None;
        };
        picker.apply(PickerInput::Click(row)).scroll
    }

    /// Selects a category as if its row had been clicked.
    pub fn select_category(&mut self, category: Category) -> Option<ScrollCommand> {
        let Some(row) = self.category.position_of(&category) else {
            tracing::debug!(%category, "category not offered by this form, ignoring");
            return None;
        };
        self.category.apply(PickerInput::Click(row)).scroll
    }

    fn numeric_mut(&mut self, field: Field) -> Option<&mut PickerBinding<u32>> {
        match field {
            Field::Day => Some(&mut self.day),
            Field::Month => Some(&mut self.month),
            Field::Year => Some(&mut self.year),
            Field::Hour => Some(&mut self.hour),
            Field::Minute => Some(&mut self.minute),
            Field::Category => None,
        }
    }

    pub fn picker(&self, field: Field) -> Option<&PickerBinding<u32>> {
        match field {
            Field::Day => Some(&self.day),
            Field::Month => Some(&self.month),
            Field::Year => Some(&self.year),
            Field::Hour => Some(&self.hour),
            Field::Minute => Some(&self.minute),
            Field::Category => None,
        }
    }

    fn number(&self, field: Field) -> u32 {
        self.picker(field)
            .and_then(PickerBinding::selected)
            .copied()
            .unwrap_or_default()
    }

    pub fn category(&self) -> Category {
        self.category
            .selected()
            .copied()
            .unwrap_or_else(|| self.default_category())
    }

    /// Whether the selected day does not exist in the selected month.
    pub fn overflows(&self) -> bool {
        let year = i32::try_from(self.number(Field::Year)).unwrap_or_default();
        NaiveDate::from_ymd_opt(year, self.number(Field::Month), self.number(Field::Day))
            .is_none()
    }

    /// Local date-time selected by the pickers, seconds zeroed.
    ///
    /// Out-of-month days roll over into the following month.
    pub fn local_datetime(&self) -> Result<NaiveDateTime, EntryError> {
        let (year, month, day) = (
            self.number(Field::Year),
            self.number(Field::Month),
            self.number(Field::Day),
        );
        let (hour, minute) = (self.number(Field::Hour), self.number(Field::Minute));
        let unrepresentable = || EntryError::Unrepresentable {
            local: format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}"),
        };

        let first_of_month = i32::try_from(year)
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, month, 1))
            .ok_or_else(unrepresentable)?;
        let date = first_of_month
            .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
            .ok_or_else(unrepresentable)?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(unrepresentable)?;
        if self.overflows() {
            tracing::debug!(%date, "day overflowed the month and was normalized");
        }
        Ok(date.and_time(time))
    }

    /// Instant selected by the pickers, read in `tz`.
    pub fn timestamp_in<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Utc>, EntryError> {
        resolve_local(tz, self.local_datetime()?)
    }

    /// Builds the candidate entry from the chosen date source.
    ///
    /// On the start form an empty native value falls back to the pickers; on
    /// the add form it is an error.
    pub fn submission<Tz: TimeZone>(
        &self,
        owner: &OwnerId,
        source: DateSource<'_>,
        tz: &Tz,
    ) -> Result<Submission, EntryError> {
        let timestamp = match source {
            DateSource::Pickers => self.timestamp_in(tz)?,
            DateSource::Native(input) => match parse_native_datetime(input) {
                Ok(local) => resolve_local(tz, local)?,
                Err(EntryError::MissingDate) if self.mode == EntryMode::Start => {
                    self.timestamp_in(tz)?
                }
                Err(err) => return Err(err),
            },
        };
        Ok(Submission {
            owner: owner.clone(),
            timestamp,
            category: self.category(),
        })
    }
}

/// Parses a `datetime-local` value (`YYYY-MM-DDTHH:MM`, optional seconds).
pub fn parse_native_datetime(input: &str) -> Result<NaiveDateTime, EntryError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(EntryError::MissingDate);
    }
    NATIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .ok_or_else(|| EntryError::InvalidInput {
            input: input.to_string(),
        })
}

/// Resolves a local date-time in `tz`.
///
/// Ambiguous times take the earlier instant; times skipped by a DST jump move
/// forward one hour.
pub fn resolve_local<Tz: TimeZone>(
    tz: &Tz,
    local: NaiveDateTime,
) -> Result<DateTime<Utc>, EntryError> {
    let resolved = match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt),
        LocalResult::None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest(),
    };
    resolved
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| EntryError::Unrepresentable {
            local: local.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn local(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    fn owner() -> OwnerId {
        OwnerId::new("owner").unwrap()
    }

    #[test]
    fn mounts_pickers_at_now() {
        let form = EntryForm::add(local(2024, 3, 15, 9, 41));
        assert_eq!(form.local_datetime().unwrap(), local(2024, 3, 15, 9, 41));
        assert_eq!(form.category(), Category::TikTok);
        assert!(form.picker(Field::Day).unwrap().is_mounted());
        assert!(
            (form.picker(Field::Minute).unwrap().offset() - 41.0 * 40.0).abs() < f64::EPSILON
        );
    }

    #[test]
    fn start_form_always_logs_origin() {
        let mut form = EntryForm::start(local(2024, 3, 15, 9, 41));
        assert_eq!(form.category(), Category::Origin);
        assert!(form.select_category(Category::Porno).is_none());
        assert_eq!(form.category(), Category::Origin);
    }

    #[test]
    fn gestures_update_the_selected_field() {
        let mut form = EntryForm::add(local(2024, 3, 15, 9, 41));
        let effects = form.apply(Field::Hour, Gesture::Click(22));
        assert_eq!(effects.emitted, Some(FieldValue::Number(22)));

        let effects = form.apply(Field::Category, Gesture::Click(2));
        assert_eq!(effects.emitted, Some(FieldValue::Category(Category::Imagination)));

        assert_eq!(form.local_datetime().unwrap(), local(2024, 3, 15, 22, 41));
        assert_eq!(form.category(), Category::Imagination);
    }

    #[test]
    fn unmounted_form_ignores_gestures_until_remounted() {
        let mut form = EntryForm::add(local(2024, 3, 15, 9, 41));
        form.unmount();
        for field in [Field::Day, Field::Month, Field::Year, Field::Hour, Field::Minute] {
            assert!(!form.picker(field).unwrap().is_mounted());
        }

        assert_eq!(form.apply(Field::Hour, Gesture::Click(22)).emitted, None);
        assert_eq!(form.apply(Field::Category, Gesture::Click(2)).emitted, None);
        assert!(form.select(Field::Day, 1).is_none());
        form.reset(local(2024, 6, 2, 18, 45));
        assert_eq!(form.local_datetime().unwrap(), local(2024, 3, 15, 9, 41));
        assert_eq!(form.category(), Category::TikTok);

        form.mount(local(2024, 6, 2, 18, 45));
        assert_eq!(form.local_datetime().unwrap(), local(2024, 6, 2, 18, 45));
        assert_eq!(
            form.apply(Field::Hour, Gesture::Click(22)).emitted,
            Some(FieldValue::Number(22))
        );
    }

    #[test]
    fn day_overflow_rolls_into_next_month() {
        let mut form = EntryForm::add(local(2024, 4, 1, 10, 0));
        form.select(Field::Day, 31);
        assert!(form.overflows());
        assert_eq!(form.local_datetime().unwrap(), local(2024, 5, 1, 10, 0));

        form.select(Field::Month, 2);
        form.select(Field::Day, 30);
        assert_eq!(form.local_datetime().unwrap(), local(2024, 3, 1, 10, 0));
    }

    #[test]
    fn select_outside_domain_is_ignored() {
        let mut form = EntryForm::add(local(2024, 4, 1, 10, 0));
        assert!(form.select(Field::Year, 1999).is_none());
        assert_eq!(form.local_datetime().unwrap(), local(2024, 4, 1, 10, 0));
    }

    #[test]
    fn year_outside_picker_range_defaults_to_first_year() {
        let form = EntryForm::add(local(2150, 6, 1, 0, 0));
        assert_eq!(form.local_datetime().unwrap(), local(2000, 6, 1, 0, 0));
    }

    #[test]
    fn both_date_sources_agree() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let mut form = EntryForm::add(local(2024, 1, 1, 0, 0));
        form.select(Field::Day, 20);
        form.select(Field::Month, 7);
        form.select(Field::Hour, 14);
        form.select(Field::Minute, 5);

        let from_pickers = form.submission(&owner(), DateSource::Pickers, &tz).unwrap();
        let from_native = form
            .submission(&owner(), DateSource::Native("2024-07-20T14:05"), &tz)
            .unwrap();
        assert_eq!(from_pickers, from_native);
        assert_eq!(from_pickers.iso_timestamp(), "2024-07-20T12:05:00.000Z");
    }

    #[test]
    fn empty_native_input_depends_on_mode() {
        let tz = Utc;
        let add = EntryForm::add(local(2024, 1, 1, 0, 0));
        assert_eq!(
            add.submission(&owner(), DateSource::Native("  "), &tz),
            Err(EntryError::MissingDate)
        );

        let start = EntryForm::start(local(2024, 1, 1, 8, 30));
        let submission = start
            .submission(&owner(), DateSource::Native(""), &tz)
            .unwrap();
        assert_eq!(submission.category, Category::Origin);
        assert_eq!(submission.iso_timestamp(), "2024-01-01T08:30:00.000Z");
    }

    #[test]
    fn native_input_parses_with_and_without_seconds() {
        assert_eq!(
            parse_native_datetime("2024-02-29T23:59").unwrap(),
            local(2024, 2, 29, 23, 59)
        );
        assert!(parse_native_datetime("2024-02-29T23:59:30").is_ok());
        assert_eq!(
            parse_native_datetime("29/02/2024"),
            Err(EntryError::InvalidInput {
                input: "29/02/2024".to_string()
            })
        );
    }

    #[test]
    fn reset_returns_to_now_and_default_category() {
        let mut form = EntryForm::add(local(2024, 1, 1, 0, 0));
        form.select(Field::Day, 9);
        form.select_category(Category::Porno);

        form.reset(local(2024, 6, 2, 18, 45));
        assert_eq!(form.local_datetime().unwrap(), local(2024, 6, 2, 18, 45));
        assert_eq!(form.category(), Category::TikTok);
    }
}
