//! Request/response adapter for post series.
//!
//! # Responsibility
//! - Route named actions from a JSON envelope to series use-cases.
//! - Run anti-forgery and capability checks before any mutating work.
//!
//! # Invariants
//! - Every outcome, including malformed input, is a structured
//!   [`AjaxResponse`]; the adapter never panics into the host.

pub mod endpoint;
pub mod envelope;

pub use endpoint::SeriesEndpoint;
pub use envelope::{AjaxRequest, AjaxResponse, ErrorBody, FormValue, IdList, SeriesTerm};
