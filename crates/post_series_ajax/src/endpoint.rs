//! Action dispatch for the AJAX-style channel.
//!
//! # Responsibility
//! - Authorize each request, then call exactly one series use-case.
//! - Render every outcome as an [`AjaxResponse`].
//!
//! # Invariants
//! - Guard checks run before any storage read or write.
//! - Handlers never panic; malformed input is `invalid_argument`.

use crate::envelope::{AjaxRequest, AjaxResponse, FormValue, IdList, SeriesTerm};
use log::{info, warn};
use post_series_core::{
    authorize, Capability, ErrorKind, GuardError, NonceAction, RequestGuard, SaveSeriesRequest,
    SeriesId, SeriesRepository, SeriesService, SeriesServiceError,
};
use serde_json::{json, Value};
use std::time::Instant;

/// Dispatch failure rendered into the error envelope.
#[derive(Debug)]
struct Failure {
    code: ErrorKind,
    message: String,
}

impl From<GuardError> for Failure {
    fn from(value: GuardError) -> Self {
        Self {
            code: value.kind(),
            message: value.to_string(),
        }
    }
}

impl From<SeriesServiceError> for Failure {
    fn from(value: SeriesServiceError) -> Self {
        Self {
            code: value.kind(),
            message: value.to_string(),
        }
    }
}

type DispatchResult = Result<Value, Failure>;

/// Request endpoint bound to one storage collaborator and one guard.
pub struct SeriesEndpoint<R: SeriesRepository, G: RequestGuard> {
    service: SeriesService<R>,
    guard: G,
}

impl<R: SeriesRepository, G: RequestGuard> SeriesEndpoint<R, G> {
    pub fn new(service: SeriesService<R>, guard: G) -> Self {
        Self { service, guard }
    }

    pub fn guard(&self) -> &G {
        &self.guard
    }

    /// Handles one decoded request.
    pub fn handle(&self, request: AjaxRequest) -> AjaxResponse {
        let started_at = Instant::now();
        let action = request.action_name();

        let result = match request {
            AjaxRequest::AddNewSeries { name, nonce } => self.add_new_series(&name, nonce),
            AjaxRequest::GetSeriesParts {
                series_id,
                current_post_id,
                nonce,
            } => self.get_series_parts(&series_id, &current_post_id, nonce),
            AjaxRequest::ReorderSeriesParts { order, nonce } => {
                self.reorder_series_parts(&order, nonce)
            }
            AjaxRequest::AssignSeries {
                post_id,
                series_id,
                nonce,
            } => self.assign_series(&post_id, &series_id, nonce),
            AjaxRequest::SaveSeriesMeta {
                post_id,
                selected_series,
                series_order,
                series_parts_order,
                autosave,
                nonce,
            } => self.save_series_meta(
                &post_id,
                &selected_series,
                &series_order,
                &series_parts_order,
                autosave,
                nonce,
            ),
            AjaxRequest::ListSeries => self.list_series(),
        };

        let duration_ms = started_at.elapsed().as_millis();
        match result {
            Ok(data) => {
                info!(
                    "event=ajax_dispatch module=ajax status=ok action={} duration_ms={}",
                    action, duration_ms
                );
                AjaxResponse::ok(data)
            }
            Err(failure) => {
                warn!(
                    "event=ajax_dispatch module=ajax status=error action={} code={} duration_ms={}",
                    action,
                    failure.code.as_str(),
                    duration_ms
                );
                AjaxResponse::failure(failure.code, failure.message)
            }
        }
    }

    /// Decodes a raw JSON request, handles it and encodes the response.
    pub fn handle_json(&self, raw: &str) -> String {
        let response = match serde_json::from_str::<AjaxRequest>(raw) {
            Ok(request) => self.handle(request),
            Err(err) => {
                warn!(
                    "event=ajax_decode module=ajax status=error line={} column={}",
                    err.line(),
                    err.column()
                );
                AjaxResponse::failure(
                    ErrorKind::InvalidArgument,
                    format!("malformed request: {err}"),
                )
            }
        };
        encode_response(&response)
    }

    fn add_new_series(&self, name: &str, nonce: Option<String>) -> DispatchResult {
        authorize(
            &self.guard,
            NonceAction::AddNewSeries,
            nonce.as_deref(),
            Some(Capability::ManageCategories),
        )?;
        let series = self.service.create_series(name)?;
        to_data(SeriesTerm::from(series))
    }

    fn get_series_parts(
        &self,
        series_id: &FormValue,
        current_post_id: &FormValue,
        nonce: Option<String>,
    ) -> DispatchResult {
        authorize(&self.guard, NonceAction::GetSeriesParts, nonce.as_deref(), None)?;
        let series_id = series_id.as_int().unwrap_or(0);
        let parts = self
            .service
            .get_ordered_parts(series_id, current_post_id.as_int())?;
        to_data(parts)
    }

    fn reorder_series_parts(&self, order: &IdList, nonce: Option<String>) -> DispatchResult {
        authorize(
            &self.guard,
            NonceAction::ReorderSeriesParts,
            nonce.as_deref(),
            Some(Capability::EditPosts),
        )?;
        let updated = self.service.apply_reorder(&order.to_ids())?;
        Ok(json!({ "updated": updated }))
    }

    fn assign_series(
        &self,
        post_id: &FormValue,
        series_id: &FormValue,
        nonce: Option<String>,
    ) -> DispatchResult {
        let post_id = post_id.as_int().unwrap_or(0);
        authorize(
            &self.guard,
            NonceAction::AssignSeries,
            nonce.as_deref(),
            Some(Capability::EditPost(post_id)),
        )?;
        let series_id = selected_series(series_id)?;
        self.service.assign_membership(post_id, series_id)?;
        Ok(json!({ "post_id": post_id, "series_id": series_id }))
    }

    fn save_series_meta(
        &self,
        post_id: &FormValue,
        selected: &FormValue,
        series_order: &FormValue,
        parts_order: &IdList,
        autosave: bool,
        nonce: Option<String>,
    ) -> DispatchResult {
        let post_id = post_id.as_int().unwrap_or(0);
        authorize(
            &self.guard,
            NonceAction::SaveSeriesMeta,
            nonce.as_deref(),
            Some(Capability::EditPost(post_id)),
        )?;

        // Non-numeric text counts as 0 and is raised to part 1 on save.
        let part_number = if series_order.is_blank() {
            None
        } else {
            Some(series_order.as_int().unwrap_or(0))
        };
        let request = SaveSeriesRequest {
            item_id: post_id,
            series_id: selected_series(selected)?,
            part_number,
            parts_order: parts_order.to_ids(),
            autosave,
        };
        let outcome = self.service.save_item_series(&request)?;
        Ok(json!({
            "post_id": post_id,
            "skipped": outcome.skipped,
            "updated": outcome.reordered,
        }))
    }

    fn list_series(&self) -> DispatchResult {
        let terms = self
            .service
            .list_series()?
            .into_iter()
            .map(SeriesTerm::from)
            .collect::<Vec<_>>();
        to_data(terms)
    }
}

/// Absent or blank selects no series. Anything else must be a numeric id;
/// non-positive ids are left for the service to reject.
fn selected_series(value: &FormValue) -> Result<Option<SeriesId>, Failure> {
    if value.is_blank() {
        return Ok(None);
    }
    match value.as_int() {
        Some(series_id) => Ok(Some(series_id)),
        None => Err(Failure {
            code: ErrorKind::InvalidArgument,
            message: "series id must be numeric".to_string(),
        }),
    }
}

fn to_data(value: impl serde::Serialize) -> DispatchResult {
    serde_json::to_value(value).map_err(|err| Failure {
        code: ErrorKind::StorageFailure,
        message: format!("failed to encode response: {err}"),
    })
}

fn encode_response(response: &AjaxResponse) -> String {
    serde_json::to_string(response).unwrap_or_else(|_| {
        r#"{"success":false,"data":{"code":"storage_failure","message":"failed to encode response"}}"#
            .to_string()
    })
}
