//! Wire shapes for the AJAX-style channel.
//!
//! Requests carry form-style values: ids may arrive as numbers or as text,
//! and the drag-and-drop order arrives as `"5,2,8"` or as a JSON list.

use post_series_core::{parse_order_value, ErrorKind, ItemId, Series, SeriesId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One inbound request, tagged by `action`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AjaxRequest {
    AddNewSeries {
        #[serde(default)]
        name: String,
        nonce: Option<String>,
    },
    GetSeriesParts {
        #[serde(default)]
        series_id: FormValue,
        #[serde(default)]
        current_post_id: FormValue,
        nonce: Option<String>,
    },
    ReorderSeriesParts {
        #[serde(default)]
        order: IdList,
        nonce: Option<String>,
    },
    AssignSeries {
        #[serde(default)]
        post_id: FormValue,
        #[serde(default)]
        series_id: FormValue,
        nonce: Option<String>,
    },
    SaveSeriesMeta {
        #[serde(default)]
        post_id: FormValue,
        #[serde(default)]
        selected_series: FormValue,
        #[serde(default)]
        series_order: FormValue,
        #[serde(default)]
        series_parts_order: IdList,
        #[serde(default)]
        autosave: bool,
        nonce: Option<String>,
    },
    ListSeries,
}

impl AjaxRequest {
    /// Wire name of the action, for logs.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::AddNewSeries { .. } => "add_new_series",
            Self::GetSeriesParts { .. } => "get_series_parts",
            Self::ReorderSeriesParts { .. } => "reorder_series_parts",
            Self::AssignSeries { .. } => "assign_series",
            Self::SaveSeriesMeta { .. } => "save_series_meta",
            Self::ListSeries => "list_series",
        }
    }
}

/// Form-style scalar: absent/null, number or text.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FormValue {
    #[default]
    Absent,
    Int(i64),
    Float(f64),
    Text(String),
}

impl FormValue {
    /// Returns whether the value is absent or blank text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::Int(_) | Self::Float(_) => false,
        }
    }

    /// Integer reading of the value; `None` for blank or non-numeric input.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Absent => None,
            Self::Int(value) => Some(*value),
            Self::Float(value) if value.is_finite() => Some(value.trunc() as i64),
            Self::Float(_) => None,
            Self::Text(text) => parse_order_value(text),
        }
    }
}

/// Ordered item ids from the drag-and-drop list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IdList {
    Csv(String),
    Ids(Vec<FormValue>),
}

impl Default for IdList {
    fn default() -> Self {
        Self::Ids(Vec::new())
    }
}

impl IdList {
    /// Positive ids in submitted order; zero, negative and junk entries drop out.
    pub fn to_ids(&self) -> Vec<ItemId> {
        match self {
            Self::Csv(raw) => raw
                .split(',')
                .filter_map(parse_order_value)
                .filter(|id| *id > 0)
                .collect(),
            Self::Ids(values) => values
                .iter()
                .filter_map(FormValue::as_int)
                .filter(|id| *id > 0)
                .collect(),
        }
    }
}

/// Series as returned to the editor's series picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesTerm {
    pub term_id: SeriesId,
    pub name: String,
    pub slug: String,
}

impl From<Series> for SeriesTerm {
    fn from(value: Series) -> Self {
        Self {
            term_id: value.id,
            name: value.name,
            slug: value.slug,
        }
    }
}

/// Failure payload carried in `data` when `success` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorKind,
    pub message: String,
}

/// Outbound envelope: `{"success": bool, "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AjaxResponse {
    pub success: bool,
    pub data: Value,
}

impl AjaxResponse {
    pub fn ok(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                success: true,
                data,
            },
            Err(err) => Self::failure(
                ErrorKind::StorageFailure,
                format!("failed to encode response: {err}"),
            ),
        }
    }

    pub fn failure(code: ErrorKind, message: impl Into<String>) -> Self {
        let body = ErrorBody {
            code,
            message: message.into(),
        };
        Self {
            success: false,
            data: serde_json::json!({
                "code": body.code.as_str(),
                "message": body.message,
            }),
        }
    }

    /// Parses `data` back into an [`ErrorBody`] for failed responses.
    pub fn error_body(&self) -> Option<ErrorBody> {
        if self.success {
            return None;
        }
        serde_json::from_value(self.data.clone()).ok()
    }
}
