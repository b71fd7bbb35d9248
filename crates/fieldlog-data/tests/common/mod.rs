//! Shared fixtures for the data-layer integration tests: an in-memory
//! remote store, a toggleable connectivity probe, and a harness wiring them
//! to temp-dir local stores.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fieldlog_data::DataLayer;
use fieldlog_remote::rows::{
    ContractorRow, PhotoUpload, PhotoUploadResult, ProjectRow, ReportRow, SectionRow,
    UserProfileRow,
};
use fieldlog_remote::{Connectivity, NetworkStatus, RemoteError, RemoteStore};
use fieldlog_store::{keys, StoreManager, StorePair};

fn backend_error(op: &str) -> RemoteError {
    RemoteError::Api {
        code: "mock".to_string(),
        message: format!("{op} failed"),
    }
}

/// In-memory stand-in for the remote store, with per-operation failure
/// switches and call counters.
#[derive(Default)]
pub struct MockRemote {
    pub projects: Mutex<Vec<ProjectRow>>,
    pub contractors: Mutex<Vec<ContractorRow>>,
    pub profiles: Mutex<Vec<UserProfileRow>>,
    pub reports: Mutex<Vec<ReportRow>>,
    /// Upserted sections keyed by `(report_id, section_key)`.
    pub sections: Mutex<BTreeMap<(String, String), SectionRow>>,
    /// Every `mark_report_submitted` call, in order.
    pub submitted: Mutex<Vec<(String, DateTime<Utc>)>>,
    /// Report ids of successfully uploaded photos.
    pub uploads: Mutex<Vec<String>>,

    pub project_queries: AtomicUsize,
    pub profile_queries: AtomicUsize,
    issued_ids: AtomicUsize,

    pub fail_uploads: AtomicBool,
    pub fail_profile_upserts: AtomicBool,
    pub fail_deletes: AtomicBool,
    /// Section keys whose upsert should fail.
    pub failing_section_keys: Mutex<HashSet<String>>,
}

#[async_trait]
impl RemoteStore for MockRemote {
    async fn list_projects(&self, user_id: Option<&str>) -> fieldlog_remote::Result<Vec<ProjectRow>> {
        self.project_queries.fetch_add(1, Ordering::SeqCst);
        let projects = self.projects.lock().unwrap();
        Ok(projects
            .iter()
            .filter(|row| user_id.is_none() || row.user_id.as_deref() == user_id)
            .cloned()
            .collect())
    }

    async fn get_project(&self, id: &str) -> fieldlog_remote::Result<Option<ProjectRow>> {
        self.project_queries.fetch_add(1, Ordering::SeqCst);
        let projects = self.projects.lock().unwrap();
        Ok(projects.iter().find(|row| row.id == id).cloned())
    }

    async fn list_contractors(
        &self,
        project_id: &str,
    ) -> fieldlog_remote::Result<Vec<ContractorRow>> {
        let contractors = self.contractors.lock().unwrap();
        Ok(contractors
            .iter()
            .filter(|row| row.project_id.as_deref() == Some(project_id))
            .cloned()
            .collect())
    }

    async fn get_profile_by_device(
        &self,
        device_id: &str,
    ) -> fieldlog_remote::Result<Option<UserProfileRow>> {
        self.profile_queries.fetch_add(1, Ordering::SeqCst);
        let profiles = self.profiles.lock().unwrap();
        Ok(profiles.iter().find(|row| row.device_id == device_id).cloned())
    }

    async fn upsert_profile(
        &self,
        row: &UserProfileRow,
    ) -> fieldlog_remote::Result<UserProfileRow> {
        if self.fail_profile_upserts.load(Ordering::SeqCst) {
            return Err(backend_error("profile upsert"));
        }

        let mut stored = row.clone();
        let mut profiles = self.profiles.lock().unwrap();
        match profiles.iter_mut().find(|p| p.device_id == row.device_id) {
            Some(existing) => {
                // Conflict on device_id: keep the previously issued id.
                stored.id = stored.id.or_else(|| existing.id.clone());
                *existing = stored.clone();
            }
            None => {
                if stored.id.is_none() {
                    let n = self.issued_ids.fetch_add(1, Ordering::SeqCst) + 1;
                    stored.id = Some(format!("remote-user-{n}"));
                }
                profiles.push(stored.clone());
            }
        }
        Ok(stored)
    }

    async fn list_submitted_reports(
        &self,
        user_id: Option<&str>,
        limit: u32,
    ) -> fieldlog_remote::Result<Vec<ReportRow>> {
        let _ = user_id;
        let reports = self.reports.lock().unwrap();
        Ok(reports.iter().take(limit as usize).cloned().collect())
    }

    async fn upsert_section(&self, row: &SectionRow) -> fieldlog_remote::Result<()> {
        if self
            .failing_section_keys
            .lock()
            .unwrap()
            .contains(&row.section_key)
        {
            return Err(backend_error("section upsert"));
        }
        self.sections
            .lock()
            .unwrap()
            .insert((row.report_id.clone(), row.section_key.clone()), row.clone());
        Ok(())
    }

    async fn mark_report_submitted(
        &self,
        report_id: &str,
        submitted_at: DateTime<Utc>,
    ) -> fieldlog_remote::Result<()> {
        self.submitted
            .lock()
            .unwrap()
            .push((report_id.to_string(), submitted_at));
        Ok(())
    }

    async fn delete_report(&self, report_id: &str) -> fieldlog_remote::Result<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(backend_error("report delete"));
        }
        self.reports.lock().unwrap().retain(|row| row.id != report_id);
        Ok(())
    }

    async fn upload_photo(
        &self,
        upload: &PhotoUpload,
    ) -> fieldlog_remote::Result<PhotoUploadResult> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(backend_error("photo upload"));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push(upload.report_id.clone());
        let n = uploads.len();
        Ok(PhotoUploadResult {
            id: format!("remote-photo-{n}"),
            storage_path: Some(format!("photos/{}/{n}.jpg", upload.report_id)),
        })
    }
}

/// Everything a test needs to drive the data layer end to end.
pub struct Harness {
    pub data: DataLayer,
    pub remote: Arc<MockRemote>,
    pub network: Arc<NetworkStatus>,
    pub stores: Arc<StorePair>,
    _dir: tempfile::TempDir,
}

impl Harness {
    pub async fn online() -> Self {
        Self::build(true).await
    }

    pub async fn offline() -> Self {
        Self::build(false).await
    }

    async fn build(online: bool) -> Self {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();

        let dir = tempfile::tempdir().unwrap();
        let stores = StoreManager::at(dir.path().join("fieldlog.db"), dir.path().join("flags.db"))
            .open()
            .await
            .unwrap();
        let remote = Arc::new(MockRemote::default());
        let network = Arc::new(NetworkStatus::new(online));

        let data = DataLayer::new(
            Arc::clone(&stores),
            Arc::clone(&remote) as Arc<dyn RemoteStore>,
            Arc::clone(&network) as Arc<dyn Connectivity>,
        );

        Self {
            data,
            remote,
            network,
            stores,
            _dir: dir,
        }
    }

    /// Set the active-user identity flag, as captured after a profile sync.
    pub fn set_user(&self, user_id: &str) {
        let flags = self.stores.flags.lock().unwrap();
        flags.set(keys::USER_ID, &user_id).unwrap();
    }

    /// Set the device identity flag, as provisioned by the host app.
    pub fn set_device(&self, device_id: &str) {
        let flags = self.stores.flags.lock().unwrap();
        flags.set(keys::DEVICE_ID, &device_id).unwrap();
    }
}

pub fn project_row(id: &str, name: &str, user_id: &str) -> ProjectRow {
    ProjectRow {
        id: id.to_string(),
        project_name: Some(name.to_string()),
        user_id: Some(user_id.to_string()),
        ..ProjectRow::default()
    }
}
