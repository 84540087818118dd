//! Request guards for mutating entry points.
//!
//! # Responsibility
//! - Declare capabilities and anti-forgery token actions.
//! - Provide the guard contract supplied by the hosting environment plus an
//!   in-process session implementation.
//!
//! # Invariants
//! - Token and capability checks run before any storage work.
//! - A failed check is terminal for the request; nothing retries it.

pub mod capability;
pub mod session;
