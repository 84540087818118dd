//! Series use-case service.
//!
//! # Responsibility
//! - Create and list series, assign items to them.
//! - Compute the ordered parts list for authoring and reader views.
//! - Persist drag-and-drop reorders and individual part numbers.
//!
//! # Invariants
//! - Identifier validation happens before any repository call.
//! - Order values are stored only under `SERIES_ORDER_META_KEY`.
//! - A reorder writes one item at a time. A storage failure part-way leaves
//!   earlier items with their new position; there is no rollback.
//! - Reorders do not check that ids belong to one series; callers send ids
//!   taken from a rendered parts list.

use crate::error::ErrorKind;
use crate::model::item::{ItemId, ItemStatus, AUTHORING_STATUSES, PUBLISHED_STATUSES};
use crate::model::series::{sanitize_series_name, slug_candidate, slugify, Series, SeriesId};
use crate::ordering::{
    order_parts, parse_order_value, SeriesMember, SeriesPart, SERIES_ORDER_META_KEY,
};
use crate::repo::item_repo::RepoError;
use crate::repo::series_repo::SeriesRepository;
use log::{debug, error, info};
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for series use-cases.
#[derive(Debug)]
pub enum SeriesServiceError {
    /// Missing/malformed identifier or empty required string.
    InvalidArgument(String),
    SeriesNotFound(SeriesId),
    ItemNotFound(ItemId),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Write succeeded but read-back disagrees.
    InconsistentState(&'static str),
}

impl SeriesServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::SeriesNotFound(_) | Self::ItemNotFound(_) => ErrorKind::NotFound,
            Self::Repo(err) => err.kind(),
            Self::InconsistentState(_) => ErrorKind::StorageFailure,
        }
    }
}

impl Display for SeriesServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::SeriesNotFound(id) => write!(f, "series not found: {id}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent series state: {details}"),
        }
    }
}

impl Error for SeriesServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for SeriesServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::ItemNotFound(id) => Self::ItemNotFound(id),
            RepoError::SeriesNotFound(id) => Self::SeriesNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub type SeriesResult<T> = Result<T, SeriesServiceError>;

/// Editor save request: the series side panel submitted with an item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaveSeriesRequest {
    pub item_id: ItemId,
    /// `None` clears the item's series.
    pub series_id: Option<SeriesId>,
    /// `None` removes the item's part number.
    pub part_number: Option<i64>,
    /// Drag-and-drop order of the rendered parts list; may be empty.
    pub parts_order: Vec<ItemId>,
    /// Autosave submissions leave series data untouched.
    pub autosave: bool,
}

/// Result of one editor save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SaveSeriesOutcome {
    pub skipped: bool,
    pub reordered: usize,
}

/// Data behind the editor's series side panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorPanel {
    /// Every series, sorted by name.
    pub series: Vec<Series>,
    pub selected_series: Option<SeriesId>,
    pub part_number: Option<i64>,
}

/// Series service facade over a storage collaborator.
pub struct SeriesService<R: SeriesRepository> {
    repo: R,
}

impl<R: SeriesRepository> SeriesService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a series from a user-entered name.
    ///
    /// Names are sanitized first; a name that is empty afterwards is rejected.
    /// Duplicate names are allowed and receive a suffixed slug.
    pub fn create_series(&self, name: &str) -> SeriesResult<Series> {
        let started_at = Instant::now();
        let Some(name) = sanitize_series_name(name) else {
            return Err(SeriesServiceError::InvalidArgument(
                "series name cannot be empty".to_string(),
            ));
        };

        let base = slugify(name.as_str());
        let mut attempt = 1;
        let slug = loop {
            let candidate = slug_candidate(base.as_str(), attempt);
            if !self.repo.slug_exists(candidate.as_str())? {
                break candidate;
            }
            attempt += 1;
        };

        let series_id = self.repo.create_series(name.as_str(), slug.as_str())?;
        let created = self
            .repo
            .get_series(series_id)?
            .ok_or(SeriesServiceError::InconsistentState(
                "created series not found in read-back",
            ))?;
        info!(
            "event=series_create module=series status=ok series_id={} duration_ms={}",
            created.id,
            started_at.elapsed().as_millis()
        );
        Ok(created)
    }

    /// Lists all series sorted by name.
    pub fn list_series(&self) -> SeriesResult<Vec<Series>> {
        Ok(self.repo.list_series()?)
    }

    /// Returns the authoring view of one series.
    ///
    /// Members in any non-trashed state are included. `current_item_id`, when
    /// positive, is always present exactly once and titled with the current
    /// item placeholder. An empty series yields an empty list.
    pub fn get_ordered_parts(
        &self,
        series_id: SeriesId,
        current_item_id: Option<ItemId>,
    ) -> SeriesResult<Vec<SeriesPart>> {
        require_series_id(series_id)?;
        self.require_series(series_id)?;
        let members = self.load_members(series_id, AUTHORING_STATUSES)?;
        let current = current_item_id.filter(|id| *id > 0);
        let parts = order_parts(members, current);
        debug!(
            "event=series_parts module=series status=ok series_id={} parts={}",
            series_id,
            parts.len()
        );
        Ok(parts)
    }

    /// Returns the reader view of one series: published members only.
    pub fn published_parts(&self, series_id: SeriesId) -> SeriesResult<Vec<SeriesPart>> {
        require_series_id(series_id)?;
        self.require_series(series_id)?;
        let members = self.load_members(series_id, PUBLISHED_STATUSES)?;
        Ok(order_parts(members, None))
    }

    /// Assigns positions 1..N to `item_ids` in list order.
    ///
    /// Non-positive, unknown and repeated ids are skipped without taking a
    /// position. Returns the number of items written.
    ///
    /// # Errors
    /// - `Repo` on storage failure. Items written before the failure keep
    ///   their new position.
    pub fn apply_reorder(&self, item_ids: &[ItemId]) -> SeriesResult<usize> {
        let started_at = Instant::now();
        let mut seen = HashSet::new();
        let mut updated = 0usize;

        for &item_id in item_ids {
            if item_id <= 0 || !seen.insert(item_id) {
                continue;
            }

            let position = updated as i64 + 1;
            match self.write_position(item_id, position) {
                Ok(true) => updated += 1,
                Ok(false) => {
                    debug!(
                        "event=series_reorder module=series status=skip item_id={} reason=not_found",
                        item_id
                    );
                }
                Err(err) => {
                    error!(
                        "event=series_reorder module=series status=error applied={} failed_item_id={} duration_ms={} error={}",
                        updated,
                        item_id,
                        started_at.elapsed().as_millis(),
                        err
                    );
                    return Err(err.into());
                }
            }
        }

        info!(
            "event=series_reorder module=series status=ok requested={} applied={} duration_ms={}",
            item_ids.len(),
            updated,
            started_at.elapsed().as_millis()
        );
        Ok(updated)
    }

    /// Replaces (`Some`) or clears (`None`) the item's series membership.
    pub fn assign_membership(
        &self,
        item_id: ItemId,
        series_id: Option<SeriesId>,
    ) -> SeriesResult<()> {
        require_item_id(item_id)?;
        if let Some(series_id) = series_id {
            require_series_id(series_id)?;
        }

        self.repo.set_item_series(item_id, series_id)?;
        info!(
            "event=series_assign module=series status=ok item_id={} series_id={}",
            item_id,
            series_id.map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        Ok(())
    }

    /// Sets (`Some`, clamped to at least 1) or removes (`None`) the part number.
    pub fn set_part_number(&self, item_id: ItemId, part_number: Option<i64>) -> SeriesResult<()> {
        require_item_id(item_id)?;
        self.require_item(item_id)?;
        match part_number {
            Some(value) => {
                let value = value.max(1);
                self.repo
                    .set_meta(item_id, SERIES_ORDER_META_KEY, value.to_string().as_str())?;
            }
            None => self.repo.delete_meta(item_id, SERIES_ORDER_META_KEY)?,
        }
        Ok(())
    }

    /// Applies one editor save: membership, part number, then the list order.
    ///
    /// The list order runs last, so it wins over the single part number when
    /// the saved item appears in `parts_order`.
    pub fn save_item_series(&self, request: &SaveSeriesRequest) -> SeriesResult<SaveSeriesOutcome> {
        if request.autosave {
            debug!(
                "event=series_save module=series status=skip item_id={} reason=autosave",
                request.item_id
            );
            return Ok(SaveSeriesOutcome {
                skipped: true,
                reordered: 0,
            });
        }

        self.assign_membership(request.item_id, request.series_id)?;
        self.set_part_number(request.item_id, request.part_number)?;
        let reordered = if request.parts_order.is_empty() {
            0
        } else {
            self.apply_reorder(&request.parts_order)?
        };

        Ok(SaveSeriesOutcome {
            skipped: false,
            reordered,
        })
    }

    /// Returns the series side panel state for one item.
    pub fn editor_panel(&self, item_id: ItemId) -> SeriesResult<EditorPanel> {
        require_item_id(item_id)?;
        self.require_item(item_id)?;
        Ok(EditorPanel {
            series: self.repo.list_series()?,
            selected_series: self.repo.get_item_series(item_id)?,
            part_number: self.read_order(item_id)?,
        })
    }

    /// Returns the series an item belongs to, if any.
    pub fn series_for_item(&self, item_id: ItemId) -> SeriesResult<Option<Series>> {
        require_item_id(item_id)?;
        self.require_item(item_id)?;
        match self.repo.get_item_series(item_id)? {
            Some(series_id) => Ok(self.repo.get_series(series_id)?),
            None => Ok(None),
        }
    }

    /// Returns the item's parsed order value.
    pub fn part_number(&self, item_id: ItemId) -> SeriesResult<Option<i64>> {
        require_item_id(item_id)?;
        self.read_order(item_id)
    }

    fn load_members(
        &self,
        series_id: SeriesId,
        statuses: &[ItemStatus],
    ) -> SeriesResult<Vec<SeriesMember>> {
        let items = self.repo.list_members(series_id, statuses)?;
        let mut members = Vec::with_capacity(items.len());
        for item in items {
            let order = self.read_order(item.id)?;
            members.push(SeriesMember {
                id: item.id,
                title: item.title,
                order,
            });
        }
        Ok(members)
    }

    fn read_order(&self, item_id: ItemId) -> SeriesResult<Option<i64>> {
        let raw = self.repo.get_meta(item_id, SERIES_ORDER_META_KEY)?;
        Ok(raw.as_deref().and_then(parse_order_value))
    }

    /// Returns `Ok(false)` when the item does not exist.
    fn write_position(&self, item_id: ItemId, position: i64) -> Result<bool, RepoError> {
        if self.repo.get_item(item_id)?.is_none() {
            return Ok(false);
        }
        self.repo
            .set_meta(item_id, SERIES_ORDER_META_KEY, position.to_string().as_str())?;
        Ok(true)
    }

    fn require_series(&self, series_id: SeriesId) -> SeriesResult<Series> {
        self.repo
            .get_series(series_id)?
            .ok_or(SeriesServiceError::SeriesNotFound(series_id))
    }

    fn require_item(&self, item_id: ItemId) -> SeriesResult<()> {
        match self.repo.get_item(item_id)? {
            Some(_) => Ok(()),
            None => Err(SeriesServiceError::ItemNotFound(item_id)),
        }
    }
}

fn require_series_id(series_id: SeriesId) -> SeriesResult<()> {
    if series_id <= 0 {
        return Err(SeriesServiceError::InvalidArgument(format!(
            "series id must be positive, got {series_id}"
        )));
    }
    Ok(())
}

fn require_item_id(item_id: ItemId) -> SeriesResult<()> {
    if item_id <= 0 {
        return Err(SeriesServiceError::InvalidArgument(format!(
            "item id must be positive, got {item_id}"
        )));
    }
    Ok(())
}
