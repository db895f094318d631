//! Discrete-value picker.
//!
//! Binds a continuous scroll offset to exactly one value of a finite ordered
//! domain. Three channels can move the selection:
//!
//! - programmatic: mount or reset jumps straight to `index * pixel_step` and
//!   never reports a change back to the caller
//! - pointer: clicking a row commits it at once and animates the offset there
//! - scroll: wheel notches step exactly one row; scroll frames are sampled
//!   and rounded to the nearest row, reporting only when the row changes
//!
//! Host callbacks are modeled as inputs to [`PickerBinding::apply`] (or the
//! consuming [`transition`]); the scroll offsets the host must apply come back
//! as [`ScrollCommand`]s tagged with their [`UpdateSource`].

use chrono::{DateTime, Duration, Utc};

/// Height of one row.
pub const DEFAULT_PIXEL_STEP: f64 = 40.0;

/// Height of the visible window.
pub const DEFAULT_VIEWPORT: f64 = 160.0;

/// Who initiated an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateSource {
    /// Mount or external reset; the caller already knows the value.
    Programmatic,
    /// Click, wheel or touch.
    Interactive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Instant,
    Smooth,
}

/// A scroll offset the host has to apply to its container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollCommand {
    pub target: f64,
    pub behavior: ScrollBehavior,
    pub source: UpdateSource,
}

/// Host events fed into the picker.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerInput<T> {
    /// Initial placement; honored once per mount.
    Mount(T),
    /// External reset to a value.
    Reset(T),
    /// Pointer click on a row.
    Click(usize),
    /// One wheel notch; only the sign of `delta_y` matters.
    Wheel { delta_y: f64 },
    /// The container reported a new offset.
    Scroll { offset: f64, at: DateTime<Utc> },
    /// The user grabbed the list; any running animation is theirs now.
    TouchStart,
    /// Periodic check for scroll inactivity.
    Settle { at: DateTime<Utc> },
    /// Detaches the host; every input but `Mount` is ignored afterwards.
    Unmount,
}

/// Interactive inputs. These carry no domain value, so one gesture type
/// serves pickers of any value type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Click(usize),
    Wheel { delta_y: f64 },
    Scroll { offset: f64, at: DateTime<Utc> },
    TouchStart,
    Settle { at: DateTime<Utc> },
}

impl<T> From<Gesture> for PickerInput<T> {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Click(row) => Self::Click(row),
            Gesture::Wheel { delta_y } => Self::Wheel { delta_y },
            Gesture::Scroll { offset, at } => Self::Scroll { offset, at },
            Gesture::TouchStart => Self::TouchStart,
            Gesture::Settle { at } => Self::Settle { at },
        }
    }
}

/// Side effects of one input.
#[derive(Debug, Clone, PartialEq)]
pub struct Effects<T> {
    /// Value to hand to `on_change`.
    pub emitted: Option<T>,
    pub scroll: Option<ScrollCommand>,
}

impl<T> Effects<T> {
    const fn none() -> Self {
        Self {
            emitted: None,
            scroll: None,
        }
    }
}

/// Result of [`transition`].
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<T> {
    pub binding: PickerBinding<T>,
    pub emitted: Option<T>,
    pub scroll: Option<ScrollCommand>,
}

/// A row intersecting the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Row<'a, T> {
    pub index: usize,
    pub value: &'a T,
    pub centered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Motion {
    Idle,
    /// An animation the picker started is heading for `target`. Frames are
    /// absorbed while `suppress` is set.
    Heading { target: usize, suppress: bool },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    last_frame: DateTime<Utc>,
}

/// Binding between a scroll offset and a value of `domain`.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerBinding<T> {
    domain: Vec<T>,
    selected: usize,
    offset: f64,
    pixel_step: f64,
    viewport: f64,
    mounted: bool,
    motion: Motion,
    settle_delay: Option<Duration>,
    pending: Option<Pending>,
}

impl<T: Clone + PartialEq> PickerBinding<T> {
    /// Creates a binding over `domain` with the default geometry.
    ///
    /// An empty domain yields an inert control that ignores every input.
    pub fn new(domain: Vec<T>) -> Self {
        if domain.is_empty() {
            tracing::warn!("picker created with an empty domain; rendering inert control");
        }
        Self {
            domain,
            selected: 0,
            offset: 0.0,
            pixel_step: DEFAULT_PIXEL_STEP,
            viewport: DEFAULT_VIEWPORT,
            mounted: false,
            motion: Motion::Idle,
            settle_delay: None,
            pending: None,
        }
    }

    #[must_use]
    pub const fn with_geometry(mut self, pixel_step: f64, viewport: f64) -> Self {
        self.pixel_step = pixel_step;
        self.viewport = viewport;
        self
    }

    /// Defers reporting scroll-driven changes until frames stop for `delay`.
    #[must_use]
    pub const fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = Some(delay);
        self
    }

    pub fn domain(&self) -> &[T] {
        &self.domain
    }

    pub fn is_inert(&self) -> bool {
        self.domain.is_empty()
    }

    pub const fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn selected(&self) -> Option<&T> {
        self.domain.get(self.selected)
    }

    pub fn selected_index(&self) -> Option<usize> {
        (!self.is_inert()).then_some(self.selected)
    }

    pub const fn offset(&self) -> f64 {
        self.offset
    }

    pub const fn pixel_step(&self) -> f64 {
        self.pixel_step
    }

    /// Padding above the first and below the last row so both can be centered.
    pub fn padding(&self) -> f64 {
        (self.viewport - self.pixel_step) / 2.0
    }

    /// Offset at which the last row is centered.
    pub fn max_offset(&self) -> f64 {
        self.offset_of(self.domain.len().saturating_sub(1))
    }

    /// Resting offset for the row at `index`.
    #[expect(
        clippy::cast_precision_loss,
        reason = "picker domains are at most a few hundred rows"
    )]
    pub fn offset_of(&self, index: usize) -> f64 {
        index as f64 * self.pixel_step
    }

    /// Row centered at `offset`, clamped into the domain.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "value is rounded, non-negative and clamped to the domain"
    )]
    pub fn index_at(&self, offset: f64) -> usize {
        let last = self.domain.len().saturating_sub(1);
        let raw = (offset / self.pixel_step).round();
        if raw.is_nan() || raw <= 0.0 {
            return 0;
        }
        (raw as usize).min(last)
    }

    pub fn position_of(&self, value: &T) -> Option<usize> {
        self.domain.iter().position(|candidate| candidate == value)
    }

    /// Rows intersecting the viewport, top to bottom.
    pub fn visible_rows(&self) -> Vec<Row<'_, T>> {
        if self.is_inert() {
            return Vec::new();
        }
        let centered = self.index_at(self.offset);
        let top = self.offset;
        let bottom = self.offset + self.viewport;
        let padding = self.padding();
        self.domain
            .iter()
            .enumerate()
            .filter(|(index, _)| {
                let row_top = padding + self.offset_of(*index);
                row_top < bottom && row_top + self.pixel_step > top
            })
            .map(|(index, value)| Row {
                index,
                value,
                centered: index == centered,
            })
            .collect()
    }

    /// Feeds one host event through the binding.
    pub fn apply(&mut self, input: PickerInput<T>) -> Effects<T> {
        if self.is_inert() {
            return Effects::none();
        }
        if !self.mounted && !matches!(input, PickerInput::Mount(_)) {
            tracing::debug!("picker not mounted, ignoring input");
            return Effects::none();
        }
        match input {
            PickerInput::Mount(value) => {
                if self.mounted {
                    tracing::debug!("picker already mounted, ignoring placement");
                    return Effects::none();
                }
                self.mounted = true;
                self.place(&value)
            }
            PickerInput::Reset(value) => self.place(&value),
            PickerInput::Click(row) => self.click(row),
            PickerInput::Wheel { delta_y } => self.wheel(delta_y),
            PickerInput::Scroll { offset, at } => self.scroll(offset, at),
            PickerInput::TouchStart => {
                self.motion = Motion::Idle;
                Effects::none()
            }
            PickerInput::Settle { at } => self.settle(at),
            PickerInput::Unmount => {
                self.mounted = false;
                self.motion = Motion::Idle;
                self.pending = None;
                Effects::none()
            }
        }
    }

    fn place(&mut self, value: &T) -> Effects<T> {
        let index = self.position_of(value).unwrap_or_else(|| {
            tracing::debug!("value not in picker domain, defaulting to the first row");
            0
        });
        self.selected = index;
        self.offset = self.offset_of(index);
        self.motion = Motion::Idle;
        self.pending = None;
        Effects {
            emitted: None,
            scroll: Some(ScrollCommand {
                target: self.offset,
                behavior: ScrollBehavior::Instant,
                source: UpdateSource::Programmatic,
            }),
        }
    }

    fn click(&mut self, row: usize) -> Effects<T> {
        let row = row.min(self.domain.len() - 1);
        let target = self.offset_of(row);
        self.pending = None;
        self.motion = if self.is_resting_on(row) {
            Motion::Idle
        } else {
            Motion::Heading {
                target: row,
                suppress: true,
            }
        };
        Effects {
            emitted: self.commit(row),
            scroll: Some(ScrollCommand {
                target,
                behavior: ScrollBehavior::Smooth,
                source: UpdateSource::Interactive,
            }),
        }
    }

    fn wheel(&mut self, delta_y: f64) -> Effects<T> {
        if delta_y == 0.0 || delta_y.is_nan() {
            return Effects::none();
        }
        let base = match self.motion {
            Motion::Heading { target, .. } => target,
            Motion::Idle => self.index_at(self.offset),
        };
        let target = if delta_y > 0.0 {
            (base + 1).min(self.domain.len() - 1)
        } else {
            base.saturating_sub(1)
        };
        self.motion = if self.is_resting_on(target) {
            Motion::Idle
        } else {
            Motion::Heading {
                target,
                suppress: false,
            }
        };
        Effects {
            emitted: None,
            scroll: Some(ScrollCommand {
                target: self.offset_of(target),
                behavior: ScrollBehavior::Smooth,
                source: UpdateSource::Interactive,
            }),
        }
    }

    fn scroll(&mut self, offset: f64, at: DateTime<Utc>) -> Effects<T> {
        let previous = self.offset;
        self.offset = offset;
        let index = self.index_at(offset);

        if let Motion::Heading { target, suppress } = self.motion {
            let goal = self.offset_of(target);
            let receding = (offset - goal).abs() > (previous - goal).abs();
            if receding || self.is_resting_on(target) {
                self.motion = Motion::Idle;
            }
            // Frames still closing in on a clicked row belong to its animation.
            if suppress && !receding {
                if self.settle_delay.is_some() {
                    self.pending = Some(Pending { last_frame: at });
                }
                return Effects::none();
            }
        }

        if self.settle_delay.is_some() {
            self.pending = (index != self.selected).then_some(Pending { last_frame: at });
            return Effects::none();
        }

        Effects {
            emitted: self.commit(index),
            scroll: None,
        }
    }

    /// Commits whatever row is centered once scrolling stopped, releasing
    /// any click guard.
    fn settle(&mut self, at: DateTime<Utc>) -> Effects<T> {
        if let (Some(delay), Some(pending)) = (self.settle_delay, self.pending) {
            if at.signed_duration_since(pending.last_frame) < delay {
                return Effects::none();
            }
        }
        self.motion = Motion::Idle;
        self.pending = None;
        Effects {
            emitted: self.commit(self.index_at(self.offset)),
            scroll: None,
        }
    }

    fn commit(&mut self, index: usize) -> Option<T> {
        if index == self.selected {
            return None;
        }
        self.selected = index;
        Some(self.domain[index].clone())
    }

    fn is_resting_on(&self, index: usize) -> bool {
        (self.offset - self.offset_of(index)).abs() < 0.5
    }
}

/// Consuming form of [`PickerBinding::apply`].
pub fn transition<T: Clone + PartialEq>(
    mut binding: PickerBinding<T>,
    input: PickerInput<T>,
) -> Transition<T> {
    let Effects { emitted, scroll } = binding.apply(input);
    Transition {
        binding,
        emitted,
        scroll,
    }
}
