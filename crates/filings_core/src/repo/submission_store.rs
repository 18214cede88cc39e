//! SQLite store for submissions and their delivered documents.

use crate::model::ident::SubmissionId;
use crate::model::submission::Submission;
use crate::repo::{
    bool_to_int, delete_row, ensure_store_ready, format_date, invalid_row, load_documents,
    parse_bool, parse_date, parse_optional_id, replace_documents, update_column, EntityStore,
    FieldValue, StoreResult,
};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const TABLE: &str = "submissions";
const DOCUMENTS_TABLE: &str = "submission_documents";
const UPDATABLE: &[&str] = &["start_date", "is_open"];
const SELECT_SQL: &str =
    "SELECT id, start_date, is_open, call_id, author_id, municipality_id FROM submissions";

/// SQLite-backed submission store.
pub struct SqliteSubmissionStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubmissionStore<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_ready(conn, &[TABLE, DOCUMENTS_TABLE])?;
        Ok(Self { conn })
    }
}

impl EntityStore<Submission> for SqliteSubmissionStore<'_> {
    fn save(&self, submission: &Submission) -> StoreResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO submissions (id, start_date, is_open, call_id, author_id, municipality_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                start_date = excluded.start_date,
                is_open = excluded.is_open,
                call_id = excluded.call_id,
                author_id = excluded.author_id,
                municipality_id = excluded.municipality_id;",
            params![
                submission.id().as_str(),
                format_date(submission.start_date()),
                bool_to_int(submission.is_open()),
                submission.call_id().map(|id| id.as_str()),
                submission.author_id().map(|id| id.as_str()),
                submission.municipality_id().map(|id| id.as_str()),
            ],
        )?;
        replace_documents(
            &tx,
            DOCUMENTS_TABLE,
            "submission_id",
            submission.id().as_str(),
            submission.documents().iter(),
        )?;
        tx.commit()?;
        Ok(())
    }

    fn read_all(&self) -> StoreResult<Vec<Submission>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut submissions = Vec::new();
        while let Some(row) = rows.next()? {
            submissions.push(parse_submission_row(self.conn, row)?);
        }
        Ok(submissions)
    }

    fn read_by_id(&self, id: &SubmissionId) -> StoreResult<Option<Submission>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_submission_row(self.conn, row)?));
        }
        Ok(None)
    }

    fn delete_by_id(&self, id: &SubmissionId) -> StoreResult<()> {
        delete_row(self.conn, TABLE, id.as_str())
    }

    fn update_field(&self, id: &SubmissionId, field: &str, value: FieldValue) -> StoreResult<()> {
        update_column(self.conn, TABLE, UPDATABLE, id.as_str(), field, value)
    }
}

fn parse_submission_row(conn: &Connection, row: &Row<'_>) -> StoreResult<Submission> {
    let id: String = row.get("id")?;
    let start_date = parse_date(TABLE, "start_date", &row.get::<_, String>("start_date")?)?;
    let open = parse_bool(TABLE, "is_open", row.get("is_open")?)?;
    let call = parse_optional_id(TABLE, "call_id", row.get("call_id")?)?;
    let author = parse_optional_id(TABLE, "author_id", row.get("author_id")?)?;
    let municipality = parse_optional_id(TABLE, "municipality_id", row.get("municipality_id")?)?;
    let documents = load_documents(conn, DOCUMENTS_TABLE, "submission_id", &id)?;
    Submission::restore(&id, start_date, open, call, author, municipality, documents)
        .map_err(|err| invalid_row(TABLE, &id, err))
}
