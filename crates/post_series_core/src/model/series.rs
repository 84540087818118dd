//! Series domain model and name normalization.
//!
//! # Invariants
//! - Stored names are sanitized: no markup tags, single spaces, trimmed.
//! - Slugs are lowercase and contain only letters, digits and `-`.
//! - Name uniqueness is a convention only; slugs are unique in storage.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of one series.
pub type SeriesId = i64;

/// Slug used when a name has no letters or digits at all.
pub const FALLBACK_SLUG: &str = "series";

static MARKUP_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid markup tag regex"));
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));
static SLUG_SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\p{L}\p{N}]+").expect("valid slug separator regex"));

/// Named grouping of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    /// Sanitized display name.
    pub name: String,
    /// URL-safe unique form of the name.
    pub slug: String,
}

/// Sanitizes a user-entered series name.
///
/// Strips markup tags, collapses whitespace runs (including line breaks and
/// tabs) to one space and trims. Returns `None` when nothing is left.
pub fn sanitize_series_name(raw: &str) -> Option<String> {
    let without_tags = MARKUP_TAG_RE.replace_all(raw, "");
    let collapsed = WHITESPACE_RE.replace_all(&without_tags, " ");
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Derives the base slug for a sanitized series name.
pub fn slugify(name: &str) -> String {
    let lowered = name.to_lowercase();
    let dashed = SLUG_SEPARATOR_RE.replace_all(&lowered, "-");
    let trimmed = dashed.trim_matches('-');
    if trimmed.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Returns the `n`-th slug candidate: the base itself, then `base-2`, `base-3`...
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{base}-{attempt}")
    }
}
