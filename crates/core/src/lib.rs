//! # tubeknit Core
//!
//! Domain types, traits, and error definitions for the tubeknit
//! instruction generator. This crate has **no engine logic** — it defines
//! the vocabulary every other crate speaks:
//!
//! - [`Instruction`] and its operands ([`Needle`], [`Rack`], [`Carrier`])
//! - [`KnittingState`], the per-tube record the engine mutates
//! - [`InstructionSink`], the seam the engine emits through, and
//!   [`Program`], the collector that renders knitout

pub mod error;
pub mod instruction;
pub mod program;
pub mod state;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result, ScheduleError, ShapingError};
pub use instruction::{Bed, Carrier, Direction, Instruction, Needle, Rack};
pub use program::{Header, InstructionSink, Program};
pub use state::{KnittingState, RowKind, Side, StitchMode};
