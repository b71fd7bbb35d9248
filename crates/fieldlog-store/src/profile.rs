//! CRUD operations for the `user_profile` collection.

use chrono::{DateTime, Utc};
use rusqlite::params;

use fieldlog_shared::UserProfile;

use crate::database::Database;
use crate::error::Result;
use crate::projects::none_on_no_rows;

impl Database {
    /// Upsert the profile for its device, replacing the full record.
    pub fn upsert_user_profile(&self, profile: &UserProfile) -> Result<()> {
        self.conn().execute(
            "INSERT OR REPLACE INTO user_profile
                 (device_id, id, full_name, title, company, email, phone, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                profile.device_id,
                profile.id,
                profile.full_name,
                profile.title,
                profile.company,
                profile.email,
                profile.phone,
                profile.updated_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Fetch the profile stored for a device, or `None` if absent.
    pub fn get_user_profile(&self, device_id: &str) -> Result<Option<UserProfile>> {
        self.conn()
            .query_row(
                "SELECT device_id, id, full_name, title, company, email, phone, updated_at
                 FROM user_profile
                 WHERE device_id = ?1",
                params![device_id],
                row_to_profile,
            )
            .map(Some)
            .or_else(none_on_no_rows)
            .map_err(Into::into)
    }
}

fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserProfile> {
    let updated_str: Option<String> = row.get(7)?;
    let updated_at: Option<DateTime<Utc>> = updated_str
        .map(|s| {
            DateTime::parse_from_rfc3339(&s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(
                        7,
                        rusqlite::types::Type::Text,
                        Box::new(e),
                    )
                })
        })
        .transpose()?;

    Ok(UserProfile {
        device_id: row.get(0)?,
        id: row.get(1)?,
        full_name: row.get(2)?,
        title: row.get(3)?,
        company: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        updated_at,
    })
}
