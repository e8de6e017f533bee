//! Error types for cadence.

use thiserror::Error;

/// Errors that can occur while scheduling or projecting events.
#[derive(Error, Debug)]
pub enum CadenceError {
    #[error("Invalid interval: {0}")]
    InvalidInterval(String),

    #[error("Day-of-week mask must select at least one day")]
    EmptyDayMask,

    #[error("Invalid day-of-week mask: {0:#b}")]
    InvalidDayMask(u8),

    #[error("Invalid monthly occurrence anchor: {0}")]
    InvalidMonthlyAnchor(u8),

    #[error("Invalid business days selector: {0}")]
    InvalidBusinessDays(i64),

    #[error("Operation not supported by {rule} recurrence: {operation}")]
    UnsupportedRuleOperation {
        rule: &'static str,
        operation: &'static str,
    },

    #[error("Given culture '{0}' is invalid")]
    InvalidCulture(String),

    #[error("Given timezone '{0}' is invalid")]
    InvalidTimezone(String),

    #[error("Invalid reminder: {0}")]
    InvalidReminder(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid query window: {0}")]
    InvalidWindow(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Event '{0}' does not belong to a series")]
    InvalidTarget(String),

    #[error("Event series not found: {0}")]
    SerieNotFound(String),

    #[error("Series '{serie_id}' has no occurrence at {slot}")]
    SlotNotInSerie { serie_id: String, slot: String },

    #[error("Update strategy '{0}' is not implemented")]
    NotImplemented(String),

    #[error("Recurrence error: {0}")]
    Recurrence(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for cadence operations.
pub type CadenceResult<T> = Result<T, CadenceError>;
