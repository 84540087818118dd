//! Item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD over host-owned content items.
//! - Define the shared repository error type.
//!
//! # Invariants
//! - Read paths reject invalid persisted state instead of masking it.
//! - Trashing an item keeps its row, metadata and series link.

use crate::db::DbError;
use crate::error::ErrorKind;
use crate::model::item::{Item, ItemId, ItemStatus};
use crate::model::series::SeriesId;
use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT id, title, status FROM items";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item/series persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    ItemNotFound(ItemId),
    SeriesNotFound(SeriesId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ItemNotFound(_) | Self::SeriesNotFound(_) => ErrorKind::NotFound,
            Self::Db(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => {
                ErrorKind::StorageFailure
            }
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::ItemNotFound(id) => write!(f, "item not found: {id}"),
            Self::SeriesNotFound(id) => write!(f, "series not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "connection is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Query options for listing items.
#[derive(Debug, Clone, Default)]
pub struct ItemListQuery {
    pub status: Option<ItemStatus>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Repository interface for item CRUD operations.
pub trait ItemRepository {
    fn create_item(&self, title: &str, status: ItemStatus) -> RepoResult<ItemId>;
    fn update_item(&self, item: &Item) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>>;
    fn trash_item(&self, id: ItemId) -> RepoResult<()>;
}

/// SQLite-backed item repository.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["items", "item_meta"])?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn create_item(&self, title: &str, status: ItemStatus) -> RepoResult<ItemId> {
        self.conn.execute(
            "INSERT INTO items (title, status) VALUES (?1, ?2);",
            params![title, status.as_str()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn update_item(&self, item: &Item) -> RepoResult<()> {
        touch_item(
            self.conn,
            item.id,
            "title = ?2, status = ?3",
            params![item.id, item.title.as_str(), item.status.as_str()],
        )
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        fetch_item(self.conn, id)
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<Item>> {
        // A negative LIMIT means "no limit" in SQLite.
        let limit = query.limit.map_or(-1, i64::from);
        let mut stmt = self.conn.prepare(&format!(
            "{ITEM_SELECT_SQL}
             WHERE (?1 IS NULL OR status = ?1)
             ORDER BY id ASC
             LIMIT ?2 OFFSET ?3;"
        ))?;
        let rows = stmt.query_map(
            params![
                query.status.map(ItemStatus::as_str),
                limit,
                i64::from(query.offset)
            ],
            |row| Ok(parse_item_row(row)),
        )?;

        let mut items = Vec::new();
        for row in rows {
            items.push(row??);
        }
        Ok(items)
    }

    fn trash_item(&self, id: ItemId) -> RepoResult<()> {
        touch_item(
            self.conn,
            id,
            "status = ?2",
            params![id, ItemStatus::Trash.as_str()],
        )
    }
}

/// Runs an `UPDATE items SET <assignments>` for `?1 = id`, bumping `updated_at`.
fn touch_item(
    conn: &Connection,
    id: ItemId,
    assignments: &str,
    params: &[&dyn ToSql],
) -> RepoResult<()> {
    let sql = format!(
        "UPDATE items
         SET {assignments}, updated_at = (strftime('%s', 'now') * 1000)
         WHERE id = ?1;"
    );
    match conn.execute(&sql, params)? {
        0 => Err(RepoError::ItemNotFound(id)),
        _ => Ok(()),
    }
}

pub(crate) fn fetch_item(conn: &Connection, id: ItemId) -> RepoResult<Option<Item>> {
    conn.query_row(&format!("{ITEM_SELECT_SQL} WHERE id = ?1;"), [id], |row| {
        Ok(parse_item_row(row))
    })
    .optional()?
    .transpose()
}

/// Maps one `items` row; an unknown status is reported, not defaulted.
pub(crate) fn parse_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let status_text: String = row.get("status")?;
    let Some(status) = ItemStatus::parse(&status_text) else {
        return Err(RepoError::InvalidData(format!(
            "item {} has unknown status `{status_text}`",
            row.get::<_, i64>("id")?
        )));
    };

    Ok(Item {
        id: row.get("id")?,
        title: row.get("title")?,
        status,
    })
}

/// Fails with the first of `tables` missing from the schema.
pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table';")?;
    let present = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;

    match tables.iter().find(|table| !present.contains(**table)) {
        Some(missing) => Err(RepoError::MissingRequiredTable(*missing)),
        None => Ok(()),
    }
}
