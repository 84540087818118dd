use post_series_ajax::{AjaxResponse, SeriesEndpoint};
use post_series_core::db::open_db_in_memory;
use post_series_core::{
    Capability, ErrorKind, ItemId, ItemRepository, ItemStatus, NonceAction, SeriesRepository,
    SeriesService, SessionGuard, SqliteItemRepository, SqliteSeriesRepository,
    SERIES_ORDER_META_KEY,
};
use rusqlite::Connection;
use serde_json::{json, Value};

type Endpoint<'conn> = SeriesEndpoint<SqliteSeriesRepository<'conn>, SessionGuard>;

fn endpoint(conn: &Connection, guard: SessionGuard) -> Endpoint<'_> {
    let repo = SqliteSeriesRepository::try_new(conn).unwrap();
    SeriesEndpoint::new(SeriesService::new(repo), guard)
}

fn editor() -> SessionGuard {
    SessionGuard::new()
        .grant(Capability::ManageCategories)
        .grant(Capability::EditPosts)
}

fn add_item(conn: &Connection, title: &str) -> ItemId {
    SqliteItemRepository::try_new(conn)
        .unwrap()
        .create_item(title, ItemStatus::Publish)
        .unwrap()
}

fn stored_order(conn: &Connection, item_id: ItemId) -> Option<String> {
    SqliteSeriesRepository::try_new(conn)
        .unwrap()
        .get_meta(item_id, SERIES_ORDER_META_KEY)
        .unwrap()
}

fn dispatch(endpoint: &Endpoint<'_>, request: Value) -> AjaxResponse {
    let raw = endpoint.handle_json(&request.to_string());
    serde_json::from_str(&raw).unwrap()
}

fn error_code(response: &AjaxResponse) -> ErrorKind {
    response.error_body().expect("expected failure envelope").code
}

#[test]
fn add_new_series_returns_term_shape() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let nonce = endpoint.guard().issue_nonce(NonceAction::AddNewSeries);

    let response = dispatch(
        &endpoint,
        json!({"action": "add_new_series", "name": "  Rust <b>Basics</b> ", "nonce": nonce}),
    );

    assert!(response.success);
    assert_eq!(response.data["name"], "Rust Basics");
    assert_eq!(response.data["slug"], "rust-basics");
    assert!(response.data["term_id"].as_i64().unwrap() > 0);
}

#[test]
fn add_new_series_rejects_blank_name() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let nonce = endpoint.guard().issue_nonce(NonceAction::AddNewSeries);

    let response = dispatch(
        &endpoint,
        json!({"action": "add_new_series", "name": "  <i></i> ", "nonce": nonce}),
    );

    assert_eq!(error_code(&response), ErrorKind::InvalidArgument);
    let listed = dispatch(&endpoint, json!({"action": "list_series"}));
    assert_eq!(listed.data, json!([]));
}

#[test]
fn get_series_parts_orders_and_marks_current_item() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, SessionGuard::new());
    let repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let series_id = repo.create_series("Guide", "guide").unwrap();
    let second = add_item(&conn, "Second");
    let first = add_item(&conn, "First");
    repo.set_item_series(second, Some(series_id)).unwrap();
    repo.set_item_series(first, Some(series_id)).unwrap();
    repo.set_meta(second, SERIES_ORDER_META_KEY, "2").unwrap();
    repo.set_meta(first, SERIES_ORDER_META_KEY, "1").unwrap();
    let nonce = endpoint.guard().issue_nonce(NonceAction::GetSeriesParts);

    let response = dispatch(
        &endpoint,
        json!({
            "action": "get_series_parts",
            "series_id": series_id.to_string(),
            "current_post_id": 999,
            "nonce": nonce,
        }),
    );

    assert!(response.success);
    assert_eq!(
        response.data,
        json!([
            {"ID": first, "title": "First", "is_current": false},
            {"ID": second, "title": "Second", "is_current": false},
            {"ID": 999, "title": "the current post", "is_current": true},
        ])
    );
}

#[test]
fn get_series_parts_maps_lookup_failures() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, SessionGuard::new());
    let nonce = endpoint.guard().issue_nonce(NonceAction::GetSeriesParts);

    let missing = dispatch(
        &endpoint,
        json!({"action": "get_series_parts", "series_id": 41, "nonce": nonce}),
    );
    assert_eq!(error_code(&missing), ErrorKind::NotFound);

    let absent = dispatch(
        &endpoint,
        json!({"action": "get_series_parts", "series_id": "", "nonce": nonce}),
    );
    assert_eq!(error_code(&absent), ErrorKind::InvalidArgument);
}

#[test]
fn reorder_accepts_comma_separated_ids() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let ids: Vec<ItemId> = ["a", "b", "c"].iter().map(|t| add_item(&conn, t)).collect();
    let nonce = endpoint.guard().issue_nonce(NonceAction::ReorderSeriesParts);
    let order = format!("{},{},{},9999", ids[2], ids[0], ids[1]);

    let response = dispatch(
        &endpoint,
        json!({"action": "reorder_series_parts", "order": order, "nonce": nonce}),
    );

    assert!(response.success);
    assert_eq!(response.data, json!({"updated": 3}));
    assert_eq!(stored_order(&conn, ids[2]).as_deref(), Some("1"));
    assert_eq!(stored_order(&conn, ids[0]).as_deref(), Some("2"));
    assert_eq!(stored_order(&conn, ids[1]).as_deref(), Some("3"));
}

#[test]
fn mutating_actions_without_valid_nonce_change_nothing() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let item = add_item(&conn, "Solo");
    let foreign = SessionGuard::new().issue_nonce(NonceAction::ReorderSeriesParts);
    let wrong_action = endpoint.guard().issue_nonce(NonceAction::GetSeriesParts);

    for request in [
        json!({"action": "reorder_series_parts", "order": [item]}),
        json!({"action": "reorder_series_parts", "order": [item], "nonce": foreign}),
        json!({"action": "reorder_series_parts", "order": [item], "nonce": wrong_action}),
        json!({"action": "add_new_series", "name": "Sneaky", "nonce": "forged"}),
    ] {
        let response = dispatch(&endpoint, request);
        assert_eq!(error_code(&response), ErrorKind::PermissionDenied);
    }

    assert_eq!(stored_order(&conn, item), None);
    let listed = dispatch(&endpoint, json!({"action": "list_series"}));
    assert_eq!(listed.data, json!([]));
}

#[test]
fn missing_capability_is_denied_after_nonce_check() {
    let conn = open_db_in_memory().unwrap();
    let reader = SessionGuard::new();
    let endpoint = endpoint(&conn, reader);
    let item = add_item(&conn, "Solo");
    let repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let series_id = repo.create_series("Guide", "guide").unwrap();

    let reorder = dispatch(
        &endpoint,
        json!({
            "action": "reorder_series_parts",
            "order": [item],
            "nonce": endpoint.guard().issue_nonce(NonceAction::ReorderSeriesParts),
        }),
    );
    assert_eq!(error_code(&reorder), ErrorKind::PermissionDenied);

    let assign = dispatch(
        &endpoint,
        json!({
            "action": "assign_series",
            "post_id": item,
            "series_id": series_id,
            "nonce": endpoint.guard().issue_nonce(NonceAction::AssignSeries),
        }),
    );
    assert_eq!(error_code(&assign), ErrorKind::PermissionDenied);
    assert_eq!(stored_order(&conn, item), None);
    assert_eq!(repo.get_item_series(item).unwrap(), None);
}

#[test]
fn assign_series_with_per_item_capability() {
    let conn = open_db_in_memory().unwrap();
    let item = add_item(&conn, "Chapter");
    let other = add_item(&conn, "Other");
    let endpoint = endpoint(&conn, SessionGuard::new().grant(Capability::EditPost(item)));
    let repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let series_id = repo.create_series("Guide", "guide").unwrap();
    let nonce = endpoint.guard().issue_nonce(NonceAction::AssignSeries);

    let response = dispatch(
        &endpoint,
        json!({"action": "assign_series", "post_id": item, "series_id": series_id, "nonce": nonce}),
    );
    assert!(response.success);
    assert_eq!(response.data, json!({"post_id": item, "series_id": series_id}));
    assert_eq!(repo.get_item_series(item).unwrap(), Some(series_id));

    let denied = dispatch(
        &endpoint,
        json!({"action": "assign_series", "post_id": other, "series_id": series_id, "nonce": nonce}),
    );
    assert_eq!(error_code(&denied), ErrorKind::PermissionDenied);

    let cleared = dispatch(
        &endpoint,
        json!({"action": "assign_series", "post_id": item, "series_id": "", "nonce": nonce}),
    );
    assert!(cleared.success);
    assert_eq!(repo.get_item_series(item).unwrap(), None);
}

#[test]
fn malformed_series_ids_are_rejected_and_keep_membership() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let series_id = repo.create_series("Guide", "guide").unwrap();
    let item = add_item(&conn, "Chapter");
    repo.set_item_series(item, Some(series_id)).unwrap();
    let assign_nonce = endpoint.guard().issue_nonce(NonceAction::AssignSeries);
    let save_nonce = endpoint.guard().issue_nonce(NonceAction::SaveSeriesMeta);

    for series_value in [json!("abc"), json!("0"), json!(0)] {
        let assign = dispatch(
            &endpoint,
            json!({
                "action": "assign_series",
                "post_id": item,
                "series_id": series_value,
                "nonce": assign_nonce,
            }),
        );
        assert_eq!(error_code(&assign), ErrorKind::InvalidArgument);
        assert_eq!(repo.get_item_series(item).unwrap(), Some(series_id));
    }

    let save = dispatch(
        &endpoint,
        json!({
            "action": "save_series_meta",
            "post_id": item,
            "selected_series": "x7",
            "series_order": "3",
            "nonce": save_nonce,
        }),
    );
    assert_eq!(error_code(&save), ErrorKind::InvalidArgument);
    assert_eq!(repo.get_item_series(item).unwrap(), Some(series_id));
    assert_eq!(stored_order(&conn, item), None);
}

#[test]
fn save_series_meta_without_selection_clears_membership() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let series_id = repo.create_series("Guide", "guide").unwrap();
    let item = add_item(&conn, "Chapter");
    repo.set_item_series(item, Some(series_id)).unwrap();
    let nonce = endpoint.guard().issue_nonce(NonceAction::SaveSeriesMeta);

    let saved = dispatch(
        &endpoint,
        json!({"action": "save_series_meta", "post_id": item, "selected_series": "", "nonce": nonce}),
    );
    assert!(saved.success);
    assert_eq!(repo.get_item_series(item).unwrap(), None);
}

#[test]
fn save_series_meta_runs_editor_flow() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let repo = SqliteSeriesRepository::try_new(&conn).unwrap();
    let series_id = repo.create_series("Guide", "guide").unwrap();
    let existing = add_item(&conn, "Existing");
    repo.set_item_series(existing, Some(series_id)).unwrap();
    let editing = add_item(&conn, "Editing");
    let nonce = endpoint.guard().issue_nonce(NonceAction::SaveSeriesMeta);

    let autosave = dispatch(
        &endpoint,
        json!({
            "action": "save_series_meta",
            "post_id": editing,
            "selected_series": series_id,
            "series_order": "4",
            "autosave": true,
            "nonce": nonce,
        }),
    );
    assert!(autosave.success);
    assert_eq!(autosave.data["skipped"], true);
    assert_eq!(repo.get_item_series(editing).unwrap(), None);

    let saved = dispatch(
        &endpoint,
        json!({
            "action": "save_series_meta",
            "post_id": editing.to_string(),
            "selected_series": series_id.to_string(),
            "series_order": "abc",
            "series_parts_order": format!("{editing},{existing}"),
            "nonce": nonce,
        }),
    );
    assert!(saved.success);
    assert_eq!(saved.data["updated"], 2);
    assert_eq!(repo.get_item_series(editing).unwrap(), Some(series_id));
    assert_eq!(stored_order(&conn, editing).as_deref(), Some("1"));
    assert_eq!(stored_order(&conn, existing).as_deref(), Some("2"));
}

#[test]
fn malformed_and_unknown_requests_are_invalid_arguments() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());

    for raw in ["not json", "{}", r#"{"action":"drop_tables"}"#] {
        let response: AjaxResponse = serde_json::from_str(&endpoint.handle_json(raw)).unwrap();
        assert!(!response.success);
        assert_eq!(error_code(&response), ErrorKind::InvalidArgument);
    }
}

#[test]
fn list_series_is_sorted_by_name() {
    let conn = open_db_in_memory().unwrap();
    let endpoint = endpoint(&conn, editor());
    let nonce = endpoint.guard().issue_nonce(NonceAction::AddNewSeries);
    for name in ["zeta", "Alpha", "beta"] {
        let response = dispatch(
            &endpoint,
            json!({"action": "add_new_series", "name": name, "nonce": nonce}),
        );
        assert!(response.success);
    }

    let listed = dispatch(&endpoint, json!({"action": "list_series"}));
    let names: Vec<&str> = listed
        .data
        .as_array()
        .unwrap()
        .iter()
        .map(|term| term["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "beta", "zeta"]);
}
