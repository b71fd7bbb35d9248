//! Wire row shapes for the remote store.
//!
//! These mirror the backend's snake_case column names (including the legacy
//! `noab_project_no` / `cno_solicitation_no` columns) and are deliberately
//! lenient: every non-key field is optional so a schema drift on the server
//! degrades to defaults instead of a decode failure.  The normalizer turns
//! these into canonical models.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fieldlog_shared::GpsPoint;

/// A `projects` row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub noab_project_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cno_solicitation_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prime_contractor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_thumbnail: Option<String>,
}

/// A `contractors` row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractorRow {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// `prime` or `sub`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub contractor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// A `user_profiles` row.  `id` is issued by the backend; an upsert without
/// one lets the backend mint it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfileRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// Project name embedded into a report listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmbeddedProjectName {
    #[serde(default)]
    pub project_name: Option<String>,
}

/// A `reports` row as returned by the archive listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportRow {
    pub id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub report_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    /// Embedded parent row, when the query asked for it.
    #[serde(default)]
    pub projects: Option<EmbeddedProjectName>,
    /// Filled client-side from a follow-up count query, never decoded.
    #[serde(skip)]
    pub photo_count: u32,
}

/// A `final_report_sections` row; the upsert conflict key is
/// `(report_id, section_key)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRow {
    pub report_id: String,
    pub section_key: String,
    pub section_title: String,
    pub content: String,
    #[serde(rename = "order")]
    pub position: i64,
}

/// A photo upload request: metadata plus the raw image bytes.  The transport
/// decides how the bytes travel (the HTTP client base64-encodes them into
/// the JSON body).
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub report_id: String,
    pub caption: String,
    pub taken_at: DateTime<Utc>,
    pub gps: Option<GpsPoint>,
    pub payload: Bytes,
}

/// What the backend assigns to a stored photo.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoUploadResult {
    pub id: String,
    #[serde(default)]
    pub storage_path: Option<String>,
}
