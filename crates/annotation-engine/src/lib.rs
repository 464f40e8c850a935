//! Annotation Engine
//!
//! Derives the "current time" marker and the draggable take-profit line
//! from a series, and keeps them tied to the series generation they were
//! derived from.

pub mod book;
pub mod challenge;
pub mod lines;

pub use book::{AnnotationBook, DragOutcome};
pub use challenge::derive_challenge_lines;
pub use lines::{derive_lines, on_drag, take_profit_price, TAKE_PROFIT_OFFSET};
