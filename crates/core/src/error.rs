//! Error types for the tubeknit domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Shaping problems and schedule problems each get their own enum so
//! callers can recover from the former and abort on the latter.

use thiserror::Error;

/// The top-level error type for all tubeknit operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Shaping errors ---
    #[error("Shaping error: {0}")]
    Shaping(#[from] ShapingError),

    // --- Schedule errors ---
    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Output ---
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// A shaping request the current tube cannot satisfy.
///
/// Returned before anything is emitted, so the tube state and the
/// instruction stream are untouched and the caller may carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapingError {
    #[error("decrease of {needles} needles is wider than the tube ({available} available)")]
    DecreaseTooWide { needles: i32, available: i32 },

    #[error("decreases overlap: {needles} needles from each edge of {min}..={max}")]
    DecreasesOverlap { min: i32, max: i32, needles: i32 },

    #[error("increase {stitches} stitches in does not fit the tube {min}..={max}")]
    IncreaseTooWide { stitches: i32, min: i32, max: i32 },

    #[error("short row of {stitches} stitches turns outside a tube {width} needles wide")]
    ShortRowTooWide { stitches: i32, width: i32 },

    #[error("stitch count must be at least 1, got {0}")]
    InvalidStitchCount(i32),

    #[error("tube {min}..={max} has an odd needle count")]
    OddWidth { min: i32, max: i32 },

    #[error("tube extent {min}..={max} is inverted")]
    InvalidExtent { min: i32, max: i32 },

    #[error("tubes {first:?} and {second:?} overlap and cannot be joined")]
    OverlappingTubes { first: (i32, i32), second: (i32, i32) },
}

/// A row schedule that cannot be laid out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("{events} shaping events do not fit in {rows} rows")]
    TooManyEvents { events: usize, rows: usize },

    #[error("instruction value and default value must differ")]
    IdenticalSymbols,
}
