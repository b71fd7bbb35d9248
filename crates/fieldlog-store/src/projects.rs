//! CRUD operations for the `projects` collection.
//!
//! Project records are stored schema-on-write: the caller hands in the full
//! canonical JSON record (contractors nested) and it replaces whatever was
//! there.  The store extracts the primary key and the owner identity into
//! indexed columns but never reshapes the record itself -- normalization is
//! the caller's job before `put`.

use rusqlite::params;
use serde_json::Value;

use fieldlog_shared::normalize;

use crate::database::Database;
use crate::error::{Result, StoreError};

/// Aliases accepted when extracting the owner identity for the index column.
const USER_ID_ALIASES: &[&str] = &["userId", "user_id"];

impl Database {
    /// Upsert a full project record by its primary key.
    pub fn upsert_project(&self, record: &Value) -> Result<()> {
        let id = normalize::str_field(record, &["id"])
            .ok_or_else(|| StoreError::InvalidRecord("project without id".to_string()))?;
        let user_id = normalize::str_field(record, USER_ID_ALIASES).unwrap_or_default();

        self.conn().execute(
            "INSERT OR REPLACE INTO projects (id, user_id, record) VALUES (?1, ?2, ?3)",
            params![id, user_id, serde_json::to_string(record)?],
        )?;
        Ok(())
    }

    /// Fetch a single project record, or `None` if absent.
    pub fn get_project(&self, id: &str) -> Result<Option<Value>> {
        let stored: Option<String> = self
            .conn()
            .query_row(
                "SELECT record FROM projects WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(none_on_no_rows)?;

        stored.map(|json| serde_json::from_str(&json)).transpose().map_err(Into::into)
    }

    /// All project records, in no particular order.
    pub fn list_projects(&self) -> Result<Vec<Value>> {
        let mut stmt = self.conn().prepare("SELECT record FROM projects")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    /// Project records owned by `user_id`, via the secondary index.
    pub fn list_projects_for_user(&self, user_id: &str) -> Result<Vec<Value>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT record FROM projects WHERE user_id = ?1")?;
        let rows = stmt.query_map(params![user_id], |row| row.get::<_, String>(0))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(serde_json::from_str(&row?)?);
        }
        Ok(records)
    }

    /// Delete a project record.  Returns `true` if a row was deleted;
    /// deleting an absent key is a no-op, not an error.
    pub fn delete_project(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        Ok(affected > 0)
    }
}

/// Map `QueryReturnedNoRows` to `Ok(None)`; lookups treat absence as data,
/// not as an error.
pub(crate) fn none_on_no_rows<T>(
    err: rusqlite::Error,
) -> std::result::Result<Option<T>, rusqlite::Error> {
    match err {
        rusqlite::Error::QueryReturnedNoRows => Ok(None),
        other => Err(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn open_db() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open_at(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn upsert_replaces_full_record() {
        let (_dir, db) = open_db();

        db.upsert_project(&json!({ "id": "p-1", "userId": "u-1", "name": "First" }))
            .unwrap();
        db.upsert_project(&json!({ "id": "p-1", "userId": "u-1", "name": "Second" }))
            .unwrap();

        let record = db.get_project("p-1").unwrap().unwrap();
        assert_eq!(record["name"], "Second");
        assert_eq!(db.list_projects().unwrap().len(), 1);
    }

    #[test]
    fn user_scope_index_accepts_either_alias() {
        let (_dir, db) = open_db();

        db.upsert_project(&json!({ "id": "p-1", "userId": "u-1" })).unwrap();
        db.upsert_project(&json!({ "id": "p-2", "user_id": "u-1" })).unwrap();
        db.upsert_project(&json!({ "id": "p-3", "userId": "u-2" })).unwrap();

        assert_eq!(db.list_projects_for_user("u-1").unwrap().len(), 2);
        assert_eq!(db.list_projects_for_user("u-2").unwrap().len(), 1);
    }

    #[test]
    fn get_absent_is_none_and_delete_absent_is_noop() {
        let (_dir, db) = open_db();

        assert!(db.get_project("nope").unwrap().is_none());
        assert!(!db.delete_project("nope").unwrap());
    }

    #[test]
    fn record_without_id_is_rejected() {
        let (_dir, db) = open_db();

        match db.upsert_project(&json!({ "name": "No key" })) {
            Err(StoreError::InvalidRecord(_)) => {}
            other => panic!("expected InvalidRecord, got {other:?}"),
        }
    }
}
