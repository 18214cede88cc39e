//! SQLite store for users.

use crate::model::ident::UserId;
use crate::model::permission::{Permission, Role};
use crate::model::user::User;
use crate::repo::{
    delete_row, ensure_store_ready, invalid_row, update_column, EntityStore, FieldValue,
    StoreResult,
};
use rusqlite::{params, Connection, Row};

const TABLE: &str = "users";
const UPDATABLE: &[&str] = &["name", "secret", "role", "role_grants"];
const SELECT_SQL: &str = "SELECT id, name, secret, role, role_grants FROM users";

/// SQLite-backed user store.
pub struct SqliteUserStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserStore<'conn> {
    /// Creates the store from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_ready(conn, &[TABLE])?;
        Ok(Self { conn })
    }
}

impl EntityStore<User> for SqliteUserStore<'_> {
    fn save(&self, user: &User) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO users (id, name, secret, role, role_grants)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                secret = excluded.secret,
                role = excluded.role,
                role_grants = excluded.role_grants;",
            params![
                user.id().as_str(),
                user.name(),
                user.secret(),
                user.role().name(),
                role_grants(user.role()),
            ],
        )?;
        Ok(())
    }

    fn read_all(&self) -> StoreResult<Vec<User>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }

    fn read_by_id(&self, id: &UserId) -> StoreResult<Option<User>> {
        let mut stmt = self.conn.prepare(&format!("{SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.as_str()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }

    fn delete_by_id(&self, id: &UserId) -> StoreResult<()> {
        delete_row(self.conn, TABLE, id.as_str())
    }

    fn update_field(&self, id: &UserId, field: &str, value: FieldValue) -> StoreResult<()> {
        update_column(self.conn, TABLE, UPDATABLE, id.as_str(), field, value)
    }
}

fn parse_user_row(row: &Row<'_>) -> StoreResult<User> {
    let id: String = row.get("id")?;
    let name: String = row.get("name")?;
    let secret: String = row.get("secret")?;
    let role: String = row.get("role")?;
    let grants: Option<String> = row.get("role_grants")?;
    let role = match grants {
        Some(spec) => Role::custom(
            role,
            Permission::parse_list(&spec).map_err(|err| invalid_row(TABLE, &id, err))?,
        ),
        None => Role::named(&role),
    };
    User::new(&id, &name, &secret, role).map_err(|err| invalid_row(TABLE, &id, err))
}

// Canonical roles are stored by name only.
fn role_grants(role: &Role) -> Option<String> {
    if role.is_canonical() {
        None
    } else {
        Some(role.grant_spec())
    }
}
