use thiserror::Error;

/// Errors raised by habit and gamification operations.
///
/// Storage and config failures stay in `anyhow`; these are the ones a user
/// can cause by pointing at the wrong habit or typing a bad value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("No habit matches '{0}'")]
    HabitNotFound(String),

    #[error("'{query}' matches {count} habits; use the id or position instead")]
    AmbiguousHabit { query: String, count: usize },

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid reminder time '{0}' (expected HH:MM, 24h)")]
    InvalidReminder(String),

    #[error("Unknown difficulty '{0}'. Use: easy, medium, hard")]
    UnknownDifficulty(String),

    #[error("Reorder must list every habit exactly once ({expected} ids, got {got})")]
    InvalidOrder { expected: usize, got: usize },

    #[error("Habit title cannot be empty")]
    EmptyTitle,
}
