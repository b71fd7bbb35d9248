//! Ports consumed by the data layer: the remote store and the connectivity
//! predicate.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::rows::{
    ContractorRow, PhotoUpload, PhotoUploadResult, ProjectRow, ReportRow, SectionRow,
    UserProfileRow,
};

/// The narrow interface to the durable system of record.
///
/// Every method is one logical round trip; implementations must not cache.
/// Absence is data (`Ok(None)` / empty vec), errors are transport or
/// backend failures.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Projects visible to `user_id`, or all projects when no scope applies.
    async fn list_projects(&self, user_id: Option<&str>) -> Result<Vec<ProjectRow>>;

    /// A single project by id, or `None` if the backend has no such row.
    async fn get_project(&self, id: &str) -> Result<Option<ProjectRow>>;

    /// Contractors belonging to a project.
    async fn list_contractors(&self, project_id: &str) -> Result<Vec<ContractorRow>>;

    /// The profile registered for a device, or `None`.
    async fn get_profile_by_device(&self, device_id: &str) -> Result<Option<UserProfileRow>>;

    /// Upsert a profile keyed by `device_id`.  The returned row carries the
    /// backend-issued `id`.
    async fn upsert_profile(&self, row: &UserProfileRow) -> Result<UserProfileRow>;

    /// Submitted reports, newest first, with photo counts resolved.
    async fn list_submitted_reports(
        &self,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ReportRow>>;

    /// Upsert one finalized report section keyed `(report_id, section_key)`.
    async fn upsert_section(&self, row: &SectionRow) -> Result<()>;

    /// Flip a report to submitted with the given timestamp.
    async fn mark_report_submitted(
        &self,
        report_id: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<()>;

    /// Delete a report; related rows cascade server-side.
    async fn delete_report(&self, report_id: &str) -> Result<()>;

    /// Store a photo; the backend assigns the durable id and storage path.
    async fn upload_photo(&self, upload: &PhotoUpload) -> Result<PhotoUploadResult>;
}

/// Connectivity predicate supplied by the platform.
pub trait Connectivity: Send + Sync {
    fn is_online(&self) -> bool;
}

/// Shared connectivity flag the host application toggles from its network
/// monitoring.
pub struct NetworkStatus {
    online: AtomicBool,
}

impl NetworkStatus {
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Relaxed);
    }
}

impl Connectivity for NetworkStatus {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }
}
