//! Core domain logic for post series.
//!
//! Items are grouped into named series and ordered as numbered parts. This
//! crate owns the ordering rules and the use-cases around them; storage and
//! request authorization are injected through traits.

pub mod db;
pub mod error;
pub mod guard;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod repo;
pub mod service;

pub use error::ErrorKind;
pub use guard::capability::{parse_capability, Capability, CapabilityError, NonceAction};
pub use guard::session::{authorize, GuardError, RequestGuard, SessionGuard};
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::item::{Item, ItemId, ItemStatus};
pub use model::series::{Series, SeriesId};
pub use ordering::{
    order_parts, parse_order_value, OrderKey, SeriesMember, SeriesPart, CURRENT_ITEM_LABEL,
    SERIES_ORDER_META_KEY,
};
pub use repo::item_repo::{
    ItemListQuery, ItemRepository, RepoError, RepoResult, SqliteItemRepository,
};
pub use repo::series_repo::{SeriesRepository, SqliteSeriesRepository};
pub use service::item_service::ItemService;
pub use service::series_service::{
    EditorPanel, SaveSeriesOutcome, SaveSeriesRequest, SeriesResult, SeriesService,
    SeriesServiceError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
