//! Series part ordering.
//!
//! # Responsibility
//! - Turn the members of one series into the ordered parts list.
//! - Own the "unordered sorts last" rule and the current-item slot.
//!
//! # Invariants
//! - Explicit order values sort ascending and before every unordered entry.
//! - Equal order values are broken by display title (byte-wise), then by id.
//! - The current item appears exactly once and always carries
//!   [`CURRENT_ITEM_LABEL`] as its title.
//! - The "after everything" sentinel exists only inside comparisons.

use crate::model::item::{display_title, ItemId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Metadata key holding an item's position within its series.
pub const SERIES_ORDER_META_KEY: &str = "_series_order";

/// Title shown for the item currently being edited.
pub const CURRENT_ITEM_LABEL: &str = "the current post";

/// One series member as read from storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesMember {
    pub id: ItemId,
    pub title: String,
    /// `None` when the item has no usable order value.
    pub order: Option<i64>,
}

/// One entry of the ordered parts list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPart {
    #[serde(rename = "ID")]
    pub id: ItemId,
    pub title: String,
    pub is_current: bool,
}

/// Comparison key for order values.
///
/// Variant order matters: every `Explicit` sorts before `Unordered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrderKey {
    Explicit(i64),
    Unordered,
}

impl From<Option<i64>> for OrderKey {
    fn from(value: Option<i64>) -> Self {
        value.map_or(Self::Unordered, Self::Explicit)
    }
}

/// Parses a stored order value.
///
/// Accepts integer or decimal text with surrounding whitespace; decimals are
/// truncated toward zero. Anything else (empty, words, `NaN`, `inf`) is
/// unordered.
pub fn parse_order_value(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value.trunc() as i64),
        _ => None,
    }
}

/// Orders series members into the parts list.
///
/// When `current_item_id` is set and not already a member, it is appended as
/// an unordered entry so a not-yet-assigned item still shows up where it
/// would land.
pub fn order_parts(
    members: Vec<SeriesMember>,
    current_item_id: Option<ItemId>,
) -> Vec<SeriesPart> {
    let mut entries = members;
    if let Some(current) = current_item_id {
        if !entries.iter().any(|member| member.id == current) {
            entries.push(SeriesMember {
                id: current,
                title: CURRENT_ITEM_LABEL.to_string(),
                order: None,
            });
        }
    }

    entries.sort_by(compare_members);

    entries
        .into_iter()
        .map(|member| {
            let is_current = current_item_id == Some(member.id);
            let title = if is_current {
                CURRENT_ITEM_LABEL.to_string()
            } else {
                display_title(member.title.as_str()).to_string()
            };
            SeriesPart {
                id: member.id,
                title,
                is_current,
            }
        })
        .collect()
}

fn compare_members(left: &SeriesMember, right: &SeriesMember) -> Ordering {
    OrderKey::from(left.order)
        .cmp(&OrderKey::from(right.order))
        .then_with(|| display_title(&left.title).cmp(display_title(&right.title)))
        .then_with(|| left.id.cmp(&right.id))
}

#[cfg(test)]
mod tests {
    use super::{
        order_parts, parse_order_value, OrderKey, SeriesMember, SeriesPart, CURRENT_ITEM_LABEL,
    };

    fn member(id: i64, title: &str, order: Option<i64>) -> SeriesMember {
        SeriesMember {
            id,
            title: title.to_string(),
            order,
        }
    }

    fn ids(parts: &[SeriesPart]) -> Vec<i64> {
        parts.iter().map(|part| part.id).collect()
    }

    #[test]
    fn explicit_keys_sort_before_unordered() {
        assert!(OrderKey::Explicit(i64::MAX) < OrderKey::Unordered);
        assert!(OrderKey::Explicit(-3) < OrderKey::Explicit(2));
        assert_eq!(OrderKey::from(None), OrderKey::Unordered);
    }

    #[test]
    fn parses_numeric_text_and_rejects_the_rest() {
        assert_eq!(parse_order_value("3"), Some(3));
        assert_eq!(parse_order_value(" 12 "), Some(12));
        assert_eq!(parse_order_value("4.9"), Some(4));
        assert_eq!(parse_order_value("1e2"), Some(100));
        assert_eq!(parse_order_value(""), None);
        assert_eq!(parse_order_value("second"), None);
        assert_eq!(parse_order_value("NaN"), None);
        assert_eq!(parse_order_value("inf"), None);
    }

    #[test]
    fn orders_by_value_then_unordered_last() {
        let parts = order_parts(
            vec![
                member(1, "No order", None),
                member(2, "Third", Some(3)),
                member(3, "First", Some(1)),
                member(4, "Second", Some(2)),
            ],
            None,
        );
        assert_eq!(ids(&parts), vec![3, 4, 2, 1]);
        assert!(parts.iter().all(|part| !part.is_current));
    }

    #[test]
    fn equal_values_break_ties_by_title_then_id() {
        let parts = order_parts(
            vec![
                member(10, "beta", Some(1)),
                member(11, "alpha", Some(1)),
                member(12, "Zulu", None),
                member(13, "Alpha", None),
                member(15, "same", None),
                member(14, "same", None),
            ],
            None,
        );
        // Byte-wise: uppercase sorts before lowercase.
        assert_eq!(ids(&parts), vec![11, 10, 13, 12, 14, 15]);
    }

    #[test]
    fn ordering_is_independent_of_input_order() {
        let forward = vec![
            member(1, "b", None),
            member(2, "a", None),
            member(3, "c", Some(5)),
            member(4, "c", Some(5)),
        ];
        let mut backward = forward.clone();
        backward.reverse();
        assert_eq!(order_parts(forward, Some(2)), order_parts(backward, Some(2)));
    }

    #[test]
    fn current_member_keeps_its_slot_and_gets_placeholder_title() {
        let parts = order_parts(
            vec![member(1, "Intro", Some(1)), member(2, "Deep dive", Some(2))],
            Some(1),
        );
        assert_eq!(ids(&parts), vec![1, 2]);
        assert_eq!(parts[0].title, CURRENT_ITEM_LABEL);
        assert!(parts[0].is_current);
        assert_eq!(parts[1].title, "Deep dive");
        assert!(!parts[1].is_current);
    }

    #[test]
    fn current_non_member_is_appended_once_as_unordered() {
        let parts = order_parts(
            vec![member(1, "Intro", Some(1)), member(2, "Zebra", None)],
            Some(99),
        );
        assert_eq!(parts.iter().filter(|part| part.id == 99).count(), 1);
        assert_eq!(ids(&parts), vec![1, 2, 99]);
        let current = parts.iter().find(|part| part.is_current).unwrap();
        assert_eq!(current.title, CURRENT_ITEM_LABEL);
    }

    #[test]
    fn empty_titles_sort_as_untitled_but_whitespace_titles_keep_their_text() {
        let parts = order_parts(
            vec![member(1, "Zed", None), member(2, "", None), member(3, "  ", None)],
            None,
        );
        assert_eq!(ids(&parts), vec![3, 2, 1]);
        assert_eq!(parts[0].title, "  ");
        assert_eq!(parts[1].title, "Untitled");
    }

    #[test]
    fn empty_members_without_current_yield_empty_list() {
        assert!(order_parts(Vec::new(), None).is_empty());
        assert_eq!(ids(&order_parts(Vec::new(), Some(5))), vec![5]);
    }

    #[test]
    fn part_serializes_with_uppercase_id_key() {
        let part = SeriesPart {
            id: 3,
            title: "x".to_string(),
            is_current: false,
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json["ID"], 3);
        assert_eq!(json["is_current"], false);
    }
}
