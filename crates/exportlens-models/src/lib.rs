//! # ExportLens Models
//!
//! Shared value types for the ExportLens calculator and classification engine.
//!
//! ## Types
//! - [`ChipMetrics`]: raw performance figures for one chip (calculator input)
//! - [`DerivedMetrics`]: TPP and PD derived from those figures
//! - [`ControlStatus`] / [`Classification`]: the verdict produced for a chip
//!
//! All types are plain immutable values. Nothing here performs I/O or holds
//! shared state, so every type is `Send + Sync`.

pub mod chip;
pub mod verdict;

pub use chip::{BitLength, ChipMetrics, DerivedMetrics, InvalidBitLength};
pub use verdict::{Classification, ControlStatus};
