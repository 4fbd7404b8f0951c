//! Error types.

/// Errors raised while building or running a timetable search.
///
/// All variants are deterministic functions of the input: nothing here is
/// transient, so callers should surface them rather than retry.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A duration class label is unknown, or a custom length does not fit
    /// the tick grid.
    #[error("invalid duration: {label}")]
    InvalidDuration { label: String },

    /// An activity has no start time, room, or day it can be placed in.
    #[error("activity {activity} cannot be placed: {reason}")]
    InfeasibleConstraint { activity: String, reason: String },

    /// The configuration was rejected by validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A string could not be parsed as an `HH:MM` time.
    #[error("invalid time slot: {0:?}")]
    InvalidTimeSlot(String),

    /// A string could not be parsed as a weekday.
    #[error("invalid day: {0:?}")]
    InvalidDay(String),

    /// An internal invariant was broken (unknown assignment key, parents
    /// with different shapes, ...).
    #[error("internal consistency error: {0}")]
    Internal(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
