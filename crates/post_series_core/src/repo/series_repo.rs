//! Series/membership/metadata repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide series term CRUD and the item-to-series association.
//! - Provide per-item key/value metadata storage.
//!
//! # Invariants
//! - One item links to at most one series; setting a link replaces the old one.
//! - Metadata writes are individual statements. Callers that write several
//!   items get per-item atomicity only.
//! - Member listings are returned in ascending item id order.

use crate::model::item::{Item, ItemId, ItemStatus};
use crate::model::series::{Series, SeriesId};
use crate::repo::item_repo::{
    ensure_tables, fetch_item, parse_item_row, RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

/// Storage collaborator used by series use-cases.
pub trait SeriesRepository {
    /// Inserts one series and returns its new id.
    fn create_series(&self, name: &str, slug: &str) -> RepoResult<SeriesId>;
    fn get_series(&self, id: SeriesId) -> RepoResult<Option<Series>>;
    /// Returns all series sorted by name, case-insensitive.
    fn list_series(&self) -> RepoResult<Vec<Series>>;
    fn slug_exists(&self, slug: &str) -> RepoResult<bool>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// Lists items linked to `series_id` whose status is in `statuses`.
    fn list_members(&self, series_id: SeriesId, statuses: &[ItemStatus])
        -> RepoResult<Vec<Item>>;
    fn get_item_series(&self, item_id: ItemId) -> RepoResult<Option<SeriesId>>;
    /// Replaces (`Some`) or clears (`None`) the item's series link.
    fn set_item_series(&self, item_id: ItemId, series_id: Option<SeriesId>) -> RepoResult<()>;
    fn get_meta(&self, item_id: ItemId, key: &str) -> RepoResult<Option<String>>;
    fn set_meta(&self, item_id: ItemId, key: &str, value: &str) -> RepoResult<()>;
    fn delete_meta(&self, item_id: ItemId, key: &str) -> RepoResult<()>;
}

/// SQLite-backed series repository.
pub struct SqliteSeriesRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSeriesRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["items", "item_meta", "series", "item_series"])?;
        Ok(Self { conn })
    }

    fn ensure_item_exists(&self, item_id: ItemId) -> RepoResult<()> {
        if row_exists(self.conn, "SELECT EXISTS(SELECT 1 FROM items WHERE id = ?1);", item_id)? {
            Ok(())
        } else {
            Err(RepoError::ItemNotFound(item_id))
        }
    }
}

impl SeriesRepository for SqliteSeriesRepository<'_> {
    fn create_series(&self, name: &str, slug: &str) -> RepoResult<SeriesId> {
        self.conn.execute(
            "INSERT INTO series (name, slug) VALUES (?1, ?2);",
            params![name, slug],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_series(&self, id: SeriesId) -> RepoResult<Option<Series>> {
        let series = self
            .conn
            .query_row(
                "SELECT id, name, slug FROM series WHERE id = ?1;",
                [id],
                series_from_row,
            )
            .optional()?;
        Ok(series)
    }

    fn list_series(&self) -> RepoResult<Vec<Series>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, slug
             FROM series
             ORDER BY name COLLATE NOCASE ASC, id ASC;",
        )?;
        let series = stmt
            .query_map([], series_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(series)
    }

    fn slug_exists(&self, slug: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM series WHERE slug = ?1);",
            [slug],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        fetch_item(self.conn, id)
    }

    fn list_members(
        &self,
        series_id: SeriesId,
        statuses: &[ItemStatus],
    ) -> RepoResult<Vec<Item>> {
        if statuses.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; statuses.len()].join(", ");
        let sql = format!(
            "SELECT i.id, i.title, i.status
             FROM items i
             INNER JOIN item_series s ON s.item_id = i.id
             WHERE s.series_id = ?
               AND i.status IN ({placeholders})
             ORDER BY i.id ASC;"
        );
        let mut bind_values: Vec<Value> = vec![Value::Integer(series_id)];
        bind_values.extend(
            statuses
                .iter()
                .map(|status| Value::Text(status.as_str().to_string())),
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn get_item_series(&self, item_id: ItemId) -> RepoResult<Option<SeriesId>> {
        let series_id = self
            .conn
            .query_row(
                "SELECT series_id FROM item_series WHERE item_id = ?1;",
                [item_id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(series_id)
    }

    fn set_item_series(&self, item_id: ItemId, series_id: Option<SeriesId>) -> RepoResult<()> {
        self.ensure_item_exists(item_id)?;

        let Some(series_id) = series_id else {
            self.conn
                .execute("DELETE FROM item_series WHERE item_id = ?1;", [item_id])?;
            return Ok(());
        };

        if !row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM series WHERE id = ?1);",
            series_id,
        )? {
            return Err(RepoError::SeriesNotFound(series_id));
        }

        self.conn.execute(
            "INSERT INTO item_series (item_id, series_id)
             VALUES (?1, ?2)
             ON CONFLICT (item_id) DO UPDATE SET series_id = excluded.series_id;",
            params![item_id, series_id],
        )?;
        Ok(())
    }

    fn get_meta(&self, item_id: ItemId, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT meta_value FROM item_meta WHERE item_id = ?1 AND meta_key = ?2;",
                params![item_id, key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_meta(&self, item_id: ItemId, key: &str, value: &str) -> RepoResult<()> {
        self.ensure_item_exists(item_id)?;
        self.conn.execute(
            "INSERT INTO item_meta (item_id, meta_key, meta_value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (item_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value;",
            params![item_id, key, value],
        )?;
        Ok(())
    }

    fn delete_meta(&self, item_id: ItemId, key: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM item_meta WHERE item_id = ?1 AND meta_key = ?2;",
            params![item_id, key],
        )?;
        Ok(())
    }
}

fn series_from_row(row: &Row<'_>) -> rusqlite::Result<Series> {
    Ok(Series {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
    })
}

fn row_exists(conn: &Connection, sql: &str, id: i64) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(exists == 1)
}
