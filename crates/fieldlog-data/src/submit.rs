//! Final-report submission, post-submit cleanup, and the archive surface.
//!
//! Submission structurally requires connectivity: it fails fast with
//! [`DataError::Offline`] and never queues for later.  Sections are
//! upserted one at a time keyed `(report_id, section_key)`, so a retry
//! after a partial failure re-sends without duplicating; the status flip
//! happens only once every section has been accepted.

use chrono::{DateTime, Utc};

use fieldlog_remote::rows::{ReportRow, SectionRow};
use fieldlog_shared::{ArchivedReport, ReportSection};

use crate::error::{DataError, Result};
use crate::DataLayer;

/// What cleanup managed to remove.  Cleanup is best-effort per artifact; a
/// failed photo delete is counted, not raised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub draft_removed: bool,
    pub cache_cleared: bool,
    pub photos_removed: usize,
    pub photos_failed: usize,
}

impl DataLayer {
    /// Publish the finalized sections of a report and flip it to submitted.
    pub async fn submit_final_report(
        &self,
        report_id: &str,
        sections: &[ReportSection],
    ) -> Result<()> {
        if !self.is_online() {
            tracing::warn!(report_id, "submission attempted while offline");
            return Err(DataError::Offline);
        }

        for section in sections {
            let row = SectionRow {
                report_id: report_id.to_string(),
                section_key: section.key.clone(),
                section_title: section.title.clone(),
                content: section.content.clone(),
                position: section.order,
            };
            self.remote().upsert_section(&row).await?;
        }

        self.remote()
            .mark_report_submitted(report_id, Utc::now())
            .await?;

        tracing::info!(report_id, sections = sections.len(), "final report submitted");
        Ok(())
    }

    /// Purge every local artifact of a submitted report: its draft, its AI
    /// cache entry, and all of its photos regardless of sync state (the
    /// remote copies are being kept, so no tombstones are owed).
    pub async fn clear_after_submit(
        &self,
        project_id: &str,
        date: &str,
        report_id: &str,
    ) -> CleanupReport {
        let mut report = CleanupReport::default();

        match self.delete_draft(project_id, date) {
            Ok(()) => report.draft_removed = true,
            Err(e) => tracing::warn!(error = %e, "cleanup could not remove draft"),
        }

        match self.clear_ai_response_cache(report_id) {
            Ok(()) => report.cache_cleared = true,
            Err(e) => tracing::warn!(error = %e, "cleanup could not clear ai cache"),
        }

        for photo in self.get_photos(report_id) {
            match self.purge_photo(&photo.id) {
                Ok(()) => report.photos_removed += 1,
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, error = %e, "cleanup could not remove photo");
                    report.photos_failed += 1;
                }
            }
        }

        tracing::info!(
            report_id,
            photos_removed = report.photos_removed,
            photos_failed = report.photos_failed,
            "post-submit cleanup finished"
        );
        report
    }

    /// Submitted reports, newest first.  Archives are remote-only history:
    /// offline or on failure this degrades to an empty list.
    pub async fn load_archived_reports(&self, limit: u32) -> Result<Vec<ArchivedReport>> {
        if !self.is_online() {
            tracing::debug!("offline, archives unavailable");
            return Ok(Vec::new());
        }

        let scope = self.user_scope();
        match self
            .remote()
            .list_submitted_reports(scope.as_deref(), limit)
            .await
        {
            Ok(rows) => Ok(rows.into_iter().map(archived_from_row).collect()),
            Err(e) => {
                tracing::error!(error = %e, "archive listing failed");
                Ok(Vec::new())
            }
        }
    }

    /// Delete a submitted report from the remote store (related rows
    /// cascade server-side).  Explicit user action: the boolean outcome
    /// feeds the notification.
    pub async fn delete_report(&self, report_id: &str) -> Result<bool> {
        match self.remote().delete_report(report_id).await {
            Ok(()) => {
                tracing::info!(report_id, "report deleted");
                Ok(true)
            }
            Err(e) => {
                tracing::error!(report_id, error = %e, "report deletion failed");
                Ok(false)
            }
        }
    }
}

fn archived_from_row(row: ReportRow) -> ArchivedReport {
    let project_name = row
        .projects
        .as_ref()
        .and_then(|embedded| embedded.project_name.clone())
        .unwrap_or_default();

    ArchivedReport {
        id: row.id,
        project_id: row.project_id.unwrap_or_default(),
        project_name,
        report_date: row.report_date.unwrap_or_default(),
        submitted: row.status.as_deref() == Some("submitted"),
        photo_count: row.photo_count,
        created_at: parse_stamp(row.created_at),
        submitted_at: parse_stamp(row.submitted_at),
    }
}

fn parse_stamp(raw: Option<String>) -> Option<DateTime<Utc>> {
    raw.and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
