//! Domain model for items, series and their ordering metadata.
//!
//! # Responsibility
//! - Define canonical data structures used by series use-cases.
//! - Keep name/slug normalization rules next to the types they guard.
//!
//! # Invariants
//! - Item and series ids are positive; zero or negative means "absent".
//! - An item belongs to at most one series.

pub mod item;
pub mod series;
