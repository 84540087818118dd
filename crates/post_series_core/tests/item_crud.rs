use post_series_core::db::open_db_in_memory;
use post_series_core::{
    Item, ItemListQuery, ItemRepository, ItemService, ItemStatus, RepoError,
    SqliteItemRepository,
};
use rusqlite::Connection;

#[test]
fn create_and_get_item() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let id = repo.create_item("Part one", ItemStatus::Draft).unwrap();
    let loaded = repo.get_item(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, "Part one");
    assert_eq!(loaded.status, ItemStatus::Draft);
}

#[test]
fn update_missing_item_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let ghost = Item {
        id: 404,
        title: "ghost".to_string(),
        status: ItemStatus::Publish,
    };
    let err = repo.update_item(&ghost).unwrap_err();
    assert!(matches!(err, RepoError::ItemNotFound(404)));
}

#[test]
fn publish_and_trash_change_status_only() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());

    let id = service.create_draft("Draft part").unwrap();
    let published = service.publish(id).unwrap();
    assert!(published.is_published());

    service.trash_item(id).unwrap();
    let trashed = service.get_item(id).unwrap().unwrap();
    assert_eq!(trashed.status, ItemStatus::Trash);
    assert_eq!(trashed.title, "Draft part");
}

#[test]
fn list_items_filters_by_status_and_paginates() {
    let conn = open_db_in_memory().unwrap();
    let service = ItemService::new(SqliteItemRepository::try_new(&conn).unwrap());
    for idx in 0..5 {
        service
            .create_item(format!("published {idx}"), ItemStatus::Publish)
            .unwrap();
    }
    service.create_draft("draft").unwrap();

    let published = service
        .list_items(&ItemListQuery {
            status: Some(ItemStatus::Publish),
            ..ItemListQuery::default()
        })
        .unwrap();
    assert_eq!(published.len(), 5);

    let page = service
        .list_items(&ItemListQuery {
            status: None,
            limit: Some(2),
            offset: 4,
        })
        .unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[1].title, "draft");
}

#[test]
fn invalid_persisted_status_is_rejected_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "PRAGMA ignore_check_constraints = ON;
         INSERT INTO items (id, title, status) VALUES (9, 'broken', 'archived');",
    )
    .unwrap();

    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    let err = repo.get_item(9).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn repository_requires_migrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteItemRepository::try_new(&conn).err().unwrap();
    assert!(matches!(err, RepoError::MissingRequiredTable("items")));
}
