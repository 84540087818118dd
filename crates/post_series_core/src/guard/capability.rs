//! Capability and token-action declarations.

use crate::model::item::ItemId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Capability a caller must hold for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Capability {
    /// Create series terms.
    ManageCategories,
    /// Edit any item, including reordering a series.
    EditPosts,
    /// Edit one specific item.
    EditPost(ItemId),
}

impl Capability {
    /// Stable string id used in configuration and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ManageCategories => CAPABILITY_MANAGE_CATEGORIES,
            Self::EditPosts => CAPABILITY_EDIT_POSTS,
            Self::EditPost(_) => CAPABILITY_EDIT_POST,
        }
    }

    /// User-facing short description.
    pub fn description(self) -> &'static str {
        match self {
            Self::ManageCategories => "Allow creating new series.",
            Self::EditPosts => "Allow editing any item and reordering series parts.",
            Self::EditPost(_) => "Allow editing one item and its series assignment.",
        }
    }
}

impl Display for Capability {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EditPost(item_id) => write!(f, "{}({item_id})", self.as_str()),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Configuration string for [`Capability::ManageCategories`].
pub const CAPABILITY_MANAGE_CATEGORIES: &str = "manage_categories";
/// Configuration string for [`Capability::EditPosts`].
pub const CAPABILITY_EDIT_POSTS: &str = "edit_posts";
/// Log string for [`Capability::EditPost`]; not grantable by name.
pub const CAPABILITY_EDIT_POST: &str = "edit_post";

/// Parses one grantable capability from its configuration string.
///
/// Per-item capabilities cannot be granted by name; grant `edit_posts`
/// or call [`crate::guard::session::SessionGuard::grant`] with an item id.
pub fn parse_capability(value: &str) -> Result<Capability, CapabilityError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(CapabilityError::EmptyCapability);
    }

    match normalized {
        CAPABILITY_MANAGE_CATEGORIES => Ok(Capability::ManageCategories),
        CAPABILITY_EDIT_POSTS => Ok(Capability::EditPosts),
        other => Err(CapabilityError::UnsupportedCapability(other.to_string())),
    }
}

/// Capability parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    EmptyCapability,
    UnsupportedCapability(String),
}

impl Display for CapabilityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyCapability => write!(f, "capability value must not be empty"),
            Self::UnsupportedCapability(value) => write!(f, "capability is unsupported: {value}"),
        }
    }
}

impl Error for CapabilityError {}

/// Action an anti-forgery token is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NonceAction {
    AddNewSeries,
    GetSeriesParts,
    SaveSeriesMeta,
    ReorderSeriesParts,
    AssignSeries,
}

impl NonceAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AddNewSeries => "add_new_series_nonce",
            Self::GetSeriesParts => "get_series_parts_nonce",
            Self::SaveSeriesMeta => "save_series_meta",
            Self::ReorderSeriesParts => "reorder_series_parts_nonce",
            Self::AssignSeries => "assign_series_nonce",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        NONCE_ACTIONS
            .iter()
            .copied()
            .find(|action| action.as_str() == value.trim())
    }
}

/// Every token action, in declaration order.
pub const NONCE_ACTIONS: &[NonceAction] = &[
    NonceAction::AddNewSeries,
    NonceAction::GetSeriesParts,
    NonceAction::SaveSeriesMeta,
    NonceAction::ReorderSeriesParts,
    NonceAction::AssignSeries,
];
