//! SQLite store for calls and their required documents.

use crate::model::call::Call;
use crate::model::ident::CallId;
use crate::repo::{
    bool_to_int, delete_row, ensure_store_ready, format_date, invalid_row, load_documents,
    parse_bool, parse_date, replace_documents, update_column, EntityStore, FieldValue,
    StoreResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const TABLE: &str = "calls";
const DOCUMENTS_TABLE: &str = "call_documents";
const UPDATABLE: &[&str] = &["start_date", "close_date", "is_open", "description"];
const SELECT_SQL: &str = "SELECT id, start_date, close_date, is_open, description FROM calls";

/// SQLite-backed call store.
pub struct SqliteCallStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCallStore<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_ready(conn, &[TABLE, DOCUMENTS_TABLE])?;
        Ok(Self { conn })
    }
}

impl EntityStore<Call> for SqliteCallStore<'_> {
    fn save(&self, call: &Call) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO calls (id, start_date, close_date, is_open, description)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                close_date = excluded.close_date,
                is_open = excluded.is_open,
                description = excluded.description;",
            params![
                call.id().as_str(),
                format_date(call.start_date()),
                format_date(call.close_date()),
                bool_to_int(call.is_open()),
                call.description(),
            ],
        )?;
        replace_documents(
            &tx,
            DOCUMENTS_TABLE,
            "call_id",
            call.id().as_str(),
            call.required_documents().iter(),
        )?;
        tx.commit()?;
        Ok(())
    }

    fn read_all(&self) -> StoreResult<Vec<Call>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut calls = Vec::new();
        while let Some(row) = rows.next()? {
            calls.push(parse_call_row(self.conn, row)?);
        }
        Ok(calls)
    }

    fn read_by_id(&self, id: &CallId) -> StoreResult<Option<Call>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_call_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn delete_by_id(&self, id: &CallId) -> StoreResult<()> {
        delete_row(self.conn, TABLE, id.as_str())
    }

    fn update_field(&self, id: &CallId, field: &str, value: FieldValue) -> StoreResult<()> {
        update_column(self.conn, TABLE, UPDATABLE, id.as_str(), field, value)
    }
}

fn parse_call_row(conn: &Connection, row: &Row<'_>) -> StoreResult<Call> {
    let id: String = row.get("id")?;
    let start_date = parse_date(TABLE, "start_date", &row.get::<_, String>("start_date")?)?;
    let close_date = parse_date(TABLE, "close_date", &row.get::<_, String>("close_date")?)?;
    let open = parse_bool(TABLE, "is_open", row.get("is_open")?)?;
    let description: String = row.get("description")?;
    let documents = load_documents(conn, DOCUMENTS_TABLE, "call_id", &id)?;
    Call::restore(&id, start_date, close_date, &description, open, documents)
        .map_err(|err| invalid_row(TABLE, &id, err))
}
