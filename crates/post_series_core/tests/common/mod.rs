#![allow(dead_code)]

use post_series_core::{
    ItemId, ItemRepository, ItemStatus, SeriesId, SeriesRepository, SqliteItemRepository,
    SqliteSeriesRepository, SERIES_ORDER_META_KEY,
};
use rusqlite::Connection;

pub fn add_item(conn: &Connection, title: &str, status: ItemStatus) -> ItemId {
    SqliteItemRepository::try_new(conn)
        .unwrap()
        .create_item(title, status)
        .unwrap()
}

pub fn add_member(
    conn: &Connection,
    series_id: SeriesId,
    title: &str,
    order: Option<&str>,
) -> ItemId {
    let id = add_item(conn, title, ItemStatus::Publish);
    let repo = SqliteSeriesRepository::try_new(conn).unwrap();
    repo.set_item_series(id, Some(series_id)).unwrap();
    if let Some(order) = order {
        repo.set_meta(id, SERIES_ORDER_META_KEY, order).unwrap();
    }
    id
}

pub fn stored_order(conn: &Connection, item_id: ItemId) -> Option<String> {
    SqliteSeriesRepository::try_new(conn)
        .unwrap()
        .get_meta(item_id, SERIES_ORDER_META_KEY)
        .unwrap()
}
