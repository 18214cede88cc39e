//! SQLite store for municipalities.
//!
//! Supervisor and representative are stored as nullable user ids; a unique
//! partial index keeps one municipality per representative.

use crate::model::ident::MunicipalityId;
use crate::model::municipality::Municipality;
use crate::repo::{
    delete_row, ensure_store_ready, invalid_row, parse_optional_id, update_column, EntityStore,
    FieldValue, StoreResult,
};
use rusqlite::{params, Connection, Row};

const TABLE: &str = "municipalities";
const UPDATABLE: &[&str] = &["name", "category", "supervisor_id", "representative_id"];
const SELECT_SQL: &str =
    "SELECT id, name, category, supervisor_id, representative_id FROM municipalities";

/// SQLite-backed municipality store.
pub struct SqliteMunicipalityStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMunicipalityStore<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_ready(conn, &[TABLE])?;
        Ok(Self { conn })
    }
}

impl EntityStore<Municipality> for SqliteMunicipalityStore<'_> {
    fn save(&self, municipality: &Municipality) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO municipalities (id, name, category, supervisor_id, representative_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                category = excluded.category,
                supervisor_id = excluded.supervisor_id,
                representative_id = excluded.representative_id;",
            params![
                municipality.id().as_str(),
                municipality.name(),
                municipality.category(),
                municipality.supervisor().map(|id| id.as_str()),
                municipality.representative().map(|id| id.as_str()),
            ],
        )?;
        Ok(())
    }

    fn read_all(&self) -> StoreResult<Vec<Municipality>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut municipalities = Vec::new();
        while let Some(row) = rows.next()? {
            municipalities.push(parse_municipality_row(row)?);
        }
        Ok(municipalities)
    }

    fn read_by_id(&self, id: &MunicipalityId) -> StoreResult<Option<Municipality>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_municipality_row(row)?));
        }
        Ok(None)
    }

    fn delete_by_id(&self, id: &MunicipalityId) -> StoreResult<()> {
        delete_row(self.conn, TABLE, id.as_str())
    }

    fn update_field(
        &self,
        id: &MunicipalityId,
        field: &str,
        value: FieldValue,
    ) -> StoreResult<()> {
        update_column(self.conn, TABLE, UPDATABLE, id.as_str(), field, value)
    }
}

fn parse_municipality_row(row: &Row<'_>) -> StoreResult<Municipality> {
    let id: String = row.get("id")?;
    let name: String = row.get("name")?;
    let supervisor = parse_optional_id(TABLE, "supervisor_id", row.get("supervisor_id")?)?;
    let representative =
        parse_optional_id(TABLE, "representative_id", row.get("representative_id")?)?;
    Municipality::restore(&id, &name, row.get("category")?, supervisor, representative)
        .map_err(|err| invalid_row(TABLE, &id, err))
}
