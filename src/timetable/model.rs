//! Catalog data model: days, time slots, duration classes, activities.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Day of the week an activity meets on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// All days, Monday first.
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    /// Full English name.
    pub fn name(self) -> &'static str {
        match self {
            Day::Monday => "Monday",
            Day::Tuesday => "Tuesday",
            Day::Wednesday => "Wednesday",
            Day::Thursday => "Thursday",
            Day::Friday => "Friday",
            Day::Saturday => "Saturday",
            Day::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Day {
    type Err = Error;

    /// Accepts full names and three-letter abbreviations, in any case.
    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Day::ALL
            .into_iter()
            .find(|d| {
                let name = d.name().to_ascii_lowercase();
                lower == name || lower == name[..3]
            })
            .ok_or_else(|| Error::InvalidDay(s.to_string()))
    }
}

/// A start time in minutes from midnight.
///
/// Displayed and parsed as `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct TimeSlot(u16);

impl TimeSlot {
    /// Minutes in a day; the exclusive upper bound for a slot.
    pub const DAY_MINUTES: u16 = 24 * 60;

    /// Creates a slot from minutes after midnight.
    pub fn from_minutes(minutes: u16) -> Result<Self> {
        if minutes > Self::DAY_MINUTES {
            return Err(Error::InvalidTimeSlot(format!("{minutes} minutes")));
        }
        Ok(Self(minutes))
    }

    /// Caller guarantees `minutes <= DAY_MINUTES`.
    pub(crate) const fn raw(minutes: u16) -> Self {
        Self(minutes)
    }

    /// Creates a slot from an hour and minute.
    pub fn hm(hour: u16, minute: u16) -> Result<Self> {
        let total = u32::from(hour) * 60 + u32::from(minute);
        if minute >= 60 || total > u32::from(Self::DAY_MINUTES) {
            return Err(Error::InvalidTimeSlot(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self(total as u16))
    }

    /// Minutes after midnight.
    pub fn minutes(self) -> u16 {
        self.0
    }

    /// This slot shifted later by `minutes`.
    ///
    /// # Errors
    /// [`Error::InvalidTimeSlot`] when the result falls past midnight.
    pub fn plus(self, minutes: u16) -> Result<Self> {
        let total = u32::from(self.0) + u32::from(minutes);
        if total > u32::from(Self::DAY_MINUTES) {
            return Err(Error::InvalidTimeSlot(format!("{self} + {minutes} min")));
        }
        Ok(Self(total as u16))
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeSlot {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidTimeSlot(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        Self::hm(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeSlot {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<TimeSlot> for String {
    fn from(slot: TimeSlot) -> Self {
        slot.to_string()
    }
}

/// Length class of an activity meeting.
///
/// The three named classes match the catalog's standard meeting lengths;
/// `Minutes` covers anything else and is checked against the tick grid when
/// slots are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum DurationClass {
    /// 90 minutes ("1 hour and 30 mins").
    Short,
    /// 180 minutes ("3 hours").
    Standard,
    /// 300 minutes ("5 hours").
    Long,
    /// A custom length in minutes.
    Minutes(u16),
}

impl DurationClass {
    /// Length in minutes.
    pub fn minutes(self) -> u16 {
        match self {
            DurationClass::Short => 90,
            DurationClass::Standard => 180,
            DurationClass::Long => 300,
            DurationClass::Minutes(m) => m,
        }
    }
}

impl fmt::Display for DurationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DurationClass::Short => f.write_str("short"),
            DurationClass::Standard => f.write_str("standard"),
            DurationClass::Long => f.write_str("long"),
            DurationClass::Minutes(m) => write!(f, "{m} min"),
        }
    }
}

impl FromStr for DurationClass {
    type Err = Error;

    /// Accepts `short`/`standard`/`long`, the legacy labels
    /// `"1 hour and 30 mins"`, `"3 hours"`, `"5 hours"`, and custom lengths
    /// written as `"<n> min"`, `"<n> mins"`, `"<n> minutes"` or `"<n>m"`.
    fn from_str(s: &str) -> Result<Self> {
        let label = s.trim().to_ascii_lowercase();
        let class = match label.as_str() {
            "short" | "1 hour and 30 mins" => DurationClass::Short,
            "standard" | "3 hours" => DurationClass::Standard,
            "long" | "5 hours" => DurationClass::Long,
            other => {
                let digits = ["minutes", "mins", "min", "m"]
                    .iter()
                    .find_map(|suffix| other.strip_suffix(suffix))
                    .map(str::trim)
                    .ok_or_else(|| Error::InvalidDuration {
                        label: s.to_string(),
                    })?;
                let minutes: u16 = digits.parse().map_err(|_| Error::InvalidDuration {
                    label: s.to_string(),
                })?;
                DurationClass::Minutes(minutes)
            }
        };
        Ok(class)
    }
}

impl TryFrom<String> for DurationClass {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<DurationClass> for String {
    fn from(d: DurationClass) -> Self {
        d.to_string()
    }
}

/// Where an activity's candidate start times come from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SlotSource {
    /// Every start the operating window allows for the activity's duration.
    #[default]
    DurationDerived,
    /// An explicit list of starts, restricted to those the window allows.
    Fixed(Vec<TimeSlot>),
}

/// A recurring course or section that needs a time, room, and day.
///
/// # Example
///
/// ```
/// use timetable_ga::timetable::{Activity, Day, DurationClass};
///
/// let cs101 = Activity::new("CS101", DurationClass::Short)
///     .with_days([Day::Monday, Day::Thursday])
///     .with_rooms(["Room 1", "Room 2"])
///     .with_sections(3);
/// assert_eq!(cs101.assignment_count(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Activity {
    /// Unique identifier (course code).
    pub id: String,
    /// Human-readable title.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: Option<String>,
    /// Meeting length.
    pub duration: DurationClass,
    /// Meeting days, in catalog order, without duplicates.
    pub days: Vec<Day>,
    /// Eligible rooms, without duplicates.
    pub rooms: Vec<String>,
    /// Instructor name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub instructor: Option<String>,
    /// Start times the instructor is available for; `None` means any.
    #[cfg_attr(feature = "serde", serde(default))]
    pub instructor_window: Option<Vec<TimeSlot>>,
    /// Number of independently scheduled sections (≥ 1).
    #[cfg_attr(feature = "serde", serde(default = "default_sections"))]
    pub section_count: u32,
    /// Candidate start source.
    #[cfg_attr(feature = "serde", serde(default))]
    pub slot_source: SlotSource,
}

#[cfg(feature = "serde")]
fn default_sections() -> u32 {
    1
}

impl Activity {
    /// Creates an activity with no days or rooms yet and a single section.
    pub fn new(id: impl Into<String>, duration: DurationClass) -> Self {
        Self {
            id: id.into(),
            name: None,
            duration,
            days: Vec::new(),
            rooms: Vec::new(),
            instructor: None,
            instructor_window: None,
            section_count: 1,
            slot_source: SlotSource::DurationDerived,
        }
    }

    /// Sets the title.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the meeting days. Repeated days are dropped.
    pub fn with_days(mut self, days: impl IntoIterator<Item = Day>) -> Self {
        self.days.clear();
        for day in days {
            if !self.days.contains(&day) {
                self.days.push(day);
            }
        }
        self
    }

    /// Sets the eligible rooms. Repeated rooms are dropped.
    pub fn with_rooms<S: Into<String>>(mut self, rooms: impl IntoIterator<Item = S>) -> Self {
        self.rooms.clear();
        for room in rooms {
            let room = room.into();
            if !self.rooms.contains(&room) {
                self.rooms.push(room);
            }
        }
        self
    }

    /// Sets the instructor and the start times they can teach.
    pub fn with_instructor(
        mut self,
        name: impl Into<String>,
        window: impl IntoIterator<Item = TimeSlot>,
    ) -> Self {
        self.instructor = Some(name.into());
        self.instructor_window = Some(window.into_iter().collect());
        self
    }

    /// Sets the number of sections. Values below 1 are raised to 1.
    pub fn with_sections(mut self, n: u32) -> Self {
        self.section_count = n.max(1);
        self
    }

    /// Restricts candidate starts to an explicit list.
    pub fn with_fixed_slots(mut self, slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        self.slot_source = SlotSource::Fixed(slots.into_iter().collect());
        self
    }

    /// Number of assignments this activity contributes to a schedule.
    pub fn assignment_count(&self) -> usize {
        self.section_count.max(1) as usize * self.days.len()
    }
}

/// The read-only list of activities a search schedules.
///
/// Order matters: it fixes the order of assignment keys in every schedule.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct Catalog {
    activities: Vec<Activity>,
}

impl Catalog {
    /// Wraps a list of activities.
    pub fn new(activities: Vec<Activity>) -> Self {
        Self { activities }
    }

    /// All activities in catalog order.
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    /// Activity at `index`.
    pub fn get(&self, index: usize) -> Option<&Activity> {
        self.activities.get(index)
    }

    /// Activity with the given id, with its index.
    pub fn find(&self, id: &str) -> Option<(usize, &Activity)> {
        self.activities.iter().enumerate().find(|(_, a)| a.id == id)
    }

    /// Number of activities.
    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Whether the catalog has no activities.
    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }
}

impl FromIterator<Activity> for Catalog {
    fn from_iter<T: IntoIterator<Item = Activity>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
