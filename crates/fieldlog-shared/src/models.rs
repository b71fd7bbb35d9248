//! Canonical domain model structs.
//!
//! These are the shapes the rest of the workspace works with once a record
//! has passed through [`crate::normalize`].  Every struct derives `Serialize`
//! and `Deserialize` so it can be cached as JSON and handed to the UI layer
//! unchanged.  Serialized field names are camelCase, matching the canonical
//! cache format.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Project
// ---------------------------------------------------------------------------

/// A construction project an inspector reports against.
///
/// `id` is assigned by the remote store and is stable across storage tiers.
/// After normalization `name` is never null -- it falls back to the empty
/// string when no alias carried a value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    /// Agency contract number (legacy wire name: `noab_project_no`).
    pub contract_no: String,
    /// Solicitation number (legacy wire name: `cno_solicitation_no`).
    pub solicitation_no: String,
    pub location: String,
    pub prime_contractor: String,
    /// Defaults to `"active"` when absent from the source record.
    pub status: String,
    /// Identity of the inspector who owns this project.
    pub user_id: String,
    pub logo_url: Option<String>,
    pub logo_thumbnail: Option<String>,
    /// Owned sub-records, replaced wholesale whenever the project is rewritten.
    #[serde(default)]
    pub contractors: Vec<Contractor>,
}

// ---------------------------------------------------------------------------
// Contractor
// ---------------------------------------------------------------------------

/// Role classification of a contractor on a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractorKind {
    Prime,
    Sub,
}

impl ContractorKind {
    /// Parse a wire value, treating anything that is not `prime` as a sub.
    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("prime") {
            ContractorKind::Prime
        } else {
            ContractorKind::Sub
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContractorKind::Prime => "prime",
            ContractorKind::Sub => "sub",
        }
    }
}

/// A contractor working a project.  Owned by its parent [`Project`]; it has
/// no lifecycle of its own.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contractor {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub company: String,
    /// Defaults to [`ContractorKind::Sub`].
    pub kind: ContractorKind,
    pub status: String,
}

// ---------------------------------------------------------------------------
// User profile
// ---------------------------------------------------------------------------

/// The inspector's profile for one physical device.
///
/// The durable `id` is issued by the remote store on first upsert and must
/// be captured locally when it arrives; local code never mints one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Option<String>,
    pub device_id: String,
    pub full_name: String,
    pub title: String,
    pub company: String,
    pub email: String,
    pub phone: String,
    /// Last-writer-wins stamp used for cross-tier reconciliation.
    pub updated_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Photo (attachment)
// ---------------------------------------------------------------------------

/// GPS fix captured alongside a photo.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GpsPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Upload lifecycle stage of a locally-captured photo.
///
/// Stored as TEXT in the local store; the kebab-case serde names are the
/// on-disk values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    Pending,
    Synced,
    Failed,
    PendingDelete,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStatus::Pending => "pending",
            SyncStatus::Synced => "synced",
            SyncStatus::Failed => "failed",
            SyncStatus::PendingDelete => "pending-delete",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SyncStatus::Pending),
            "synced" => Some(SyncStatus::Synced),
            "failed" => Some(SyncStatus::Failed),
            "pending-delete" => Some(SyncStatus::PendingDelete),
            _ => None,
        }
    }

    /// Legal transition table for the attachment state machine.
    ///
    /// A synced record only moves again when the user deletes it before
    /// cleanup runs, leaving a `PendingDelete` tombstone for the remote
    /// sweep.  A repeat failure stays in `Failed` while the retry counter
    /// advances.
    pub fn can_become(self, next: SyncStatus) -> bool {
        use SyncStatus::*;
        matches!(
            (self, next),
            (Pending, Synced)
                | (Pending, Failed)
                | (Pending, PendingDelete)
                | (PendingDelete, Pending)
                | (Failed, Pending)
                | (Failed, Synced)
                | (Failed, Failed)
                | (Synced, PendingDelete)
        )
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One captured image bound to a not-yet-submitted report.
///
/// Created at capture time in `Pending`; the sync queue owns the status,
/// retry and remote-id fields afterwards.  Destroyed when its report is
/// submitted and cleaned up, or removed by the user beforehand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub report_id: String,
    /// Compressed image bytes.  Dropped (emptied) when the record becomes a
    /// pending-delete tombstone.
    pub payload: Bytes,
    pub caption: String,
    pub taken_at: DateTime<Utc>,
    pub gps: Option<GpsPoint>,
    pub sync_status: SyncStatus,
    /// Number of failed upload attempts.  Never reset, even on success.
    pub retry_count: u32,
    pub last_sync_attempt: Option<DateTime<Utc>>,
    /// Remote store id, set once the upload succeeds.
    pub remote_id: Option<String>,
    /// Remote storage path, set once the upload succeeds.
    pub storage_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// In-progress report content, keyed by `(project_id, date)` in the flag
/// store.  Never sent to the remote store directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Arbitrary report content; the data layer does not interpret it.
    pub content: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// AI response cache
// ---------------------------------------------------------------------------

/// A memoized generated-text artifact for one report.  Invalidated on
/// submission or explicit clear, never by age.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiCacheEntry {
    pub response: String,
    pub cached_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Archived report (read-only listing shape)
// ---------------------------------------------------------------------------

/// A submitted report as listed from the remote store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedReport {
    pub id: String,
    pub project_id: String,
    pub project_name: String,
    pub report_date: String,
    pub submitted: bool,
    pub photo_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub submitted_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// Report section (submission payload)
// ---------------------------------------------------------------------------

/// One finalized section of a report, upserted to the remote store keyed by
/// `(report_id, section key)` so re-submission is idempotent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportSection {
    pub key: String,
    pub title: String,
    pub content: String,
    pub order: i64,
}
