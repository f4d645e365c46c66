//! Tubeknit engine — turns tube shaping requests into knitout.
//!
//! The [`Knitter`] drives one instruction stream. Every operation borrows
//! the tube's [`KnittingState`] mutably, emits instructions through the
//! knitter's sink, and leaves the rack at 0.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────┐    ┌──────────────┐
//! │  TubePlan /  │───▶│   Knitter    │───▶│ Instruction  │
//! │  schedule    │    │  (executor)  │    │    Sink      │
//! └──────────────┘    └──────────────┘    └──────────────┘
//!                          │
//!          ┌───────────────┼────────────────┐
//!          │               │                │
//!     ┌────┴────┐    ┌─────┴─────┐    ┌─────┴──────┐
//!     │ pattern │    │   width   │    │ short rows │
//!     │ (k / p) │    │ (+/- 2)   │    │  & darts   │
//!     └─────────┘    └───────────┘    └────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use tubeknit_core::{Carrier, Header, KnittingState, StitchMode};
//! use tubeknit_engine::Knitter;
//!
//! let mut knitter = Knitter::new();
//! let mut tube = KnittingState::new(1, 40, StitchMode::Plain, Carrier(3)).unwrap();
//! knitter.zigzag_cast_on(&mut tube);
//! knitter.tube(4, &mut tube);
//! knitter.increase_right(&mut tube, 2).unwrap();
//! knitter.bindoff_tube(tube);
//!
//! let knitout = knitter.into_sink().render(&Header::default());
//! assert!(knitout.starts_with(";!knitout-2"));
//! ```
//!
//! [`KnittingState`]: tubeknit_core::KnittingState

mod engine;
mod lifecycle;
mod pattern;
mod plan;
mod schedule;
mod short_row;
mod tube;
mod width;

pub use engine::{KnitSettings, Knitter};
pub use pattern::{Decision, back_decision, front_decision};
pub use plan::{DartSpec, PlanReport, RibSpec, RowFailure, RowStep, TubePlan};
pub use schedule::{
    Segment, project_extent, spaced_instructions, width_changing_segments, width_changing_tube,
};
pub use short_row::{DartRow, horizontal_dart, round_up_even, round_up_even_f64};

use tubeknit_core::{ScheduleError, ShapingError};

/// Result alias for plan loading and execution.
pub type PlanResult<T> = std::result::Result<T, PlanError>;

/// Errors from loading or running a [`TubePlan`].
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("invalid plan: {0}")]
    Invalid(String),

    #[error("plan file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error(transparent)]
    Shaping(#[from] ShapingError),
}
