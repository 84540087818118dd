//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage collaborator contracts used by series services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`ItemNotFound`,
//!   `SeriesNotFound`) in addition to DB transport errors.
//! - Repositories never interpret order metadata; they store text.

pub mod item_repo;
pub mod series_repo;
