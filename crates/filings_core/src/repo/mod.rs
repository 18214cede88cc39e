//! Persistence contract and SQLite store implementations.
//!
//! # Responsibility
//! - Define the per-entity CRUD contract consumed by the service layer.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Stores refuse connections that are not migrated to the latest schema.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - `update_field` only touches whitelisted columns.
//! - No retries; every failure surfaces as `StorageError`.

pub mod call_store;
pub mod municipality_store;
pub mod submission_store;
pub mod user_store;

use crate::db::migrations::{current_user_version, latest_version};
use crate::error::CoreError;
use crate::model::ident::{Id, IdKind};
use crate::registry::collection::Entity;
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use call_store::SqliteCallStore;
pub use municipality_store::SqliteMunicipalityStore;
pub use submission_store::SqliteSubmissionStore;
pub use user_store::SqliteUserStore;

const DATE_FORMAT: &str = "%Y-%m-%d";

pub type StoreResult<T> = Result<T, StorageError>;

/// Persistence collaborator failure, from bootstrap through row access.
#[derive(Debug)]
pub enum StorageError {
    /// Underlying SQLite error.
    Sqlite(rusqlite::Error),
    /// Database was written by a newer schema than this build knows.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Target row does not exist.
    MissingRow { table: &'static str, id: String },
    /// Field name is not an updatable column of the table.
    UnknownField { table: &'static str, field: String },
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Persisted data cannot be converted into a valid entity.
    InvalidData(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingRow { table, id } => write!(f, "no row `{id}` in {table}"),
            Self::UnknownField { table, field } => {
                write!(f, "field `{field}` is not updatable in {table}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "stores require schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "stores require table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Scalar value written by [`EntityStore::update_field`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Text(String),
    Integer(i64),
    Bool(bool),
    Date(NaiveDate),
}

impl FieldValue {
    /// Text for `Some(id)`, `Null` otherwise.
    pub fn optional_id<K: IdKind>(id: Option<&Id<K>>) -> Self {
        match id {
            Some(id) => Self::Text(id.as_str().to_string()),
            None => Self::Null,
        }
    }

    fn into_sql(self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(value) => Value::Text(value),
            Self::Integer(value) => Value::Integer(value),
            Self::Bool(value) => Value::Integer(bool_to_int(value)),
            Self::Date(value) => Value::Text(format_date(value)),
        }
    }
}

/// Per-entity CRUD contract.
pub trait EntityStore<E: Entity> {
    /// Inserts or replaces the entity row and its document rows.
    fn save(&self, entity: &E) -> StoreResult<()>;
    fn read_all(&self) -> StoreResult<Vec<E>>;
    fn read_by_id(&self, id: &Id<E::Kind>) -> StoreResult<Option<E>>;
    fn delete_by_id(&self, id: &Id<E::Kind>) -> StoreResult<()>;
    fn update_field(&self, id: &Id<E::Kind>, field: &str, value: FieldValue) -> StoreResult<()>;
}

pub(crate) fn ensure_store_ready(conn: &Connection, tables: &[&'static str]) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(StorageError::MissingRequiredTable(*table));
        }
    }
    Ok(())
}

pub(crate) fn update_column(
    conn: &Connection,
    table: &'static str,
    updatable: &[&'static str],
    id: &str,
    field: &str,
    value: FieldValue,
) -> StoreResult<()> {
    let Some(column) = updatable.iter().find(|column| **column == field) else {
        return Err(StorageError::UnknownField {
            table,
            field: field.to_string(),
        });
    };

    let changed = conn.execute(
        &format!("UPDATE {table} SET {column} = ?1 WHERE id = ?2;"),
        params![value.into_sql(), id],
    )?;
    if changed == 0 {
        return Err(StorageError::MissingRow {
            table,
            id: id.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn delete_row(conn: &Connection, table: &'static str, id: &str) -> StoreResult<()> {
    let changed = conn.execute(&format!("DELETE FROM {table} WHERE id = ?1;"), [id])?;
    if changed == 0 {
        return Err(StorageError::MissingRow {
            table,
            id: id.to_string(),
        });
    }
    Ok(())
}

pub(crate) fn load_documents(
    conn: &Connection,
    table: &'static str,
    owner_column: &'static str,
    owner_id: &str,
) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT name FROM {table} WHERE {owner_column} = ?1 ORDER BY name ASC;"
    ))?;
    let mut rows = stmt.query([owner_id])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(row.get(0)?);
    }
    Ok(names)
}

pub(crate) fn replace_documents<'a>(
    conn: &Connection,
    table: &'static str,
    owner_column: &'static str,
    owner_id: &str,
    names: impl Iterator<Item = &'a str>,
) -> StoreResult<()> {
    conn.execute(
        &format!("DELETE FROM {table} WHERE {owner_column} = ?1;"),
        [owner_id],
    )?;
    let mut stmt = conn.prepare(&format!(
        "INSERT INTO {table} ({owner_column}, name) VALUES (?1, ?2);"
    ))?;
    for name in names {
        stmt.execute(params![owner_id, name])?;
    }
    Ok(())
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(table: &str, column: &str, value: &str) -> StoreResult<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        StorageError::InvalidData(format!("invalid date `{value}` in {table}.{column}"))
    })
}

pub(crate) fn parse_bool(table: &str, column: &str, value: i64) -> StoreResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(StorageError::InvalidData(format!(
            "invalid boolean `{other}` in {table}.{column}"
        ))),
    }
}

pub(crate) fn parse_optional_id<K: IdKind>(
    table: &str,
    column: &str,
    value: Option<String>,
) -> StoreResult<Option<Id<K>>> {
    value
        .map(|raw| {
            Id::parse(&raw).map_err(|err| {
                StorageError::InvalidData(format!("invalid id `{raw}` in {table}.{column}: {err}"))
            })
        })
        .transpose()
}

/// Wraps an entity validation failure raised while reading a row.
pub(crate) fn invalid_row(table: &str, id: &str, err: CoreError) -> StorageError {
    StorageError::InvalidData(format!("row `{id}` in {table} is invalid: {err}"))
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
