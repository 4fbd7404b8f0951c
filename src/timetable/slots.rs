//! Slot generation and occupied-tick expansion.
//!
//! Time is quantized into ticks of `granularity` minutes. A meeting of
//! length `d` starting at `t` covers the ticks `t, t + g, ..., t + d - g`.
//! Two meetings overlap exactly when they share a tick, which is what the
//! fitness evaluator's occupancy index relies on.

use super::config::OperatingWindow;
use super::model::{DurationClass, TimeSlot};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// Checks that `duration` is a positive multiple of `granularity`, no
/// longer than a day, and returns its length in ticks.
pub fn tick_count(duration: DurationClass, granularity: u16) -> Result<u16> {
    if granularity == 0 {
        return Err(Error::InvalidConfig("tick_granularity must be positive".into()));
    }
    let minutes = duration.minutes();
    if minutes == 0 || minutes > TimeSlot::DAY_MINUTES || minutes % granularity != 0 {
        return Err(Error::InvalidDuration {
            label: format!(
                "{duration} is not a positive multiple of {granularity} min within a day"
            ),
        });
    }
    Ok(minutes / granularity)
}

/// All start times `t` with `open ≤ t` and `t + duration ≤ close`, stepped
/// by `granularity` from `open`, in ascending order.
///
/// Returns an empty list when the window is shorter than the duration.
///
/// # Errors
/// [`Error::InvalidDuration`] when the duration does not fit the tick grid.
pub fn feasible_starts(
    duration: DurationClass,
    window: OperatingWindow,
    granularity: u16,
) -> Result<Vec<TimeSlot>> {
    tick_count(duration, granularity)?;
    let length = duration.minutes();
    if length > window.length() {
        return Ok(Vec::new());
    }

    let last = window.close.minutes() - length;
    (window.open.minutes()..=last)
        .step_by(usize::from(granularity))
        .map(TimeSlot::from_minutes)
        .collect()
}

/// Ticks covered by a meeting, as minutes from midnight.
pub fn occupied_ticks(
    start: TimeSlot,
    duration: DurationClass,
    granularity: u16,
) -> Result<impl Iterator<Item = u16>> {
    let ticks = tick_count(duration, granularity)?;
    let first = start.minutes();
    Ok((0..ticks).map(move |k| first + k * granularity))
}

/// Per-duration memo of [`feasible_starts`] for one window and granularity.
#[derive(Debug, Clone)]
pub struct SlotTable {
    window: OperatingWindow,
    granularity: u16,
    cache: HashMap<DurationClass, Vec<TimeSlot>>,
}

impl SlotTable {
    /// Creates an empty table.
    pub fn new(window: OperatingWindow, granularity: u16) -> Self {
        Self {
            window,
            granularity,
            cache: HashMap::new(),
        }
    }

    /// Feasible starts for `duration`, computed on first use.
    pub fn starts(&mut self, duration: DurationClass) -> Result<&[TimeSlot]> {
        if !self.cache.contains_key(&duration) {
            let starts = feasible_starts(duration, self.window, self.granularity)?;
            self.cache.insert(duration, starts);
        }
        Ok(self.cache.get(&duration).map(Vec::as_slice).unwrap_or(&[]))
    }
}
