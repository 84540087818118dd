//! Item (post) domain model.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - An empty title is displayed as [`UNTITLED_LABEL`], never stored as such.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Store-assigned identifier of one content item.
pub type ItemId = i64;

/// Label shown for items whose title is empty.
pub const UNTITLED_LABEL: &str = "Untitled";

/// Publication state of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// Visible to readers.
    Publish,
    /// Work in progress.
    Draft,
    /// Awaiting review.
    Pending,
    /// Visible to authorized editors only.
    Private,
    /// Moved to trash; excluded from every series view.
    Trash,
}

/// Statuses shown in the authoring series view.
///
/// Drafts are listed next to published parts so editors can place them.
pub const AUTHORING_STATUSES: &[ItemStatus] = &[
    ItemStatus::Publish,
    ItemStatus::Draft,
    ItemStatus::Pending,
    ItemStatus::Private,
];

/// Statuses shown in the reader-facing series view.
pub const PUBLISHED_STATUSES: &[ItemStatus] = &[ItemStatus::Publish];

impl ItemStatus {
    /// Stable storage/wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Private => "private",
            Self::Trash => "trash",
        }
    }

    /// Parses the storage/wire string, case-sensitive.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "publish" => Some(Self::Publish),
            "draft" => Some(Self::Draft),
            "pending" => Some(Self::Pending),
            "private" => Some(Self::Private),
            "trash" => Some(Self::Trash),
            _ => None,
        }
    }
}

impl Display for ItemStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content record that may be grouped into a series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    /// Raw title; may be blank for freshly created drafts.
    pub title: String,
    pub status: ItemStatus,
}

impl Item {
    /// Title used for display and for tie-breaking in series order.
    pub fn display_title(&self) -> &str {
        display_title(self.title.as_str())
    }

    pub fn is_published(&self) -> bool {
        self.status == ItemStatus::Publish
    }
}

/// Returns `title` or [`UNTITLED_LABEL`] when it is empty.
///
/// Whitespace-only titles are kept as they are.
pub fn display_title(title: &str) -> &str {
    if title.is_empty() {
        UNTITLED_LABEL
    } else {
        title
    }
}
