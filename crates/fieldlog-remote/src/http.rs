//! PostgREST-style HTTP implementation of the remote store port.
//!
//! Requests go to `{base_url}/rest/v1/{table}` with equality filters as
//! `?col=eq.value` query parameters and upserts expressed through
//! `on_conflict` plus a `Prefer: resolution=merge-duplicates` header.  The
//! API key travels both as `apikey` and as a bearer token.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::client::RemoteStore;
use crate::error::{RemoteError, Result};
use crate::rows::{
    ContractorRow, PhotoUpload, PhotoUploadResult, ProjectRow, ReportRow, SectionRow,
    UserProfileRow,
};

/// Remote store client over a PostgREST-compatible backend.
pub struct HttpRemote {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRemote {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{table}", self.base_url))
            .header("apikey", &self.api_key)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", self.api_key),
            )
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<Vec<T>> {
        let resp = check(req.send().await?).await?;
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_projects(&self, user_id: Option<&str>) -> Result<Vec<ProjectRow>> {
        let mut req = self
            .request(Method::GET, "projects")
            .query(&[("select", "*"), ("order", "project_name.asc")]);
        if let Some(user_id) = user_id {
            req = req.query(&[("user_id", format!("eq.{user_id}"))]);
        }
        tracing::debug!(scoped = user_id.is_some(), "fetching projects");
        self.fetch_rows(req).await
    }

    async fn get_project(&self, id: &str) -> Result<Option<ProjectRow>> {
        let req = self
            .request(Method::GET, "projects")
            .query(&[("select", "*"), ("limit", "1")])
            .query(&[("id", format!("eq.{id}"))]);
        let rows: Vec<ProjectRow> = self.fetch_rows(req).await?;
        Ok(rows.into_iter().next())
    }

    async fn list_contractors(&self, project_id: &str) -> Result<Vec<ContractorRow>> {
        let req = self
            .request(Method::GET, "contractors")
            .query(&[("select", "*")])
            .query(&[("project_id", format!("eq.{project_id}"))]);
        self.fetch_rows(req).await
    }

    async fn get_profile_by_device(&self, device_id: &str) -> Result<Option<UserProfileRow>> {
        let req = self
            .request(Method::GET, "user_profiles")
            .query(&[("select", "*"), ("limit", "1")])
            .query(&[("device_id", format!("eq.{device_id}"))]);
        let rows: Vec<UserProfileRow> = self.fetch_rows(req).await?;
        Ok(rows.into_iter().next())
    }

    async fn upsert_profile(&self, row: &UserProfileRow) -> Result<UserProfileRow> {
        let req = self
            .request(Method::POST, "user_profiles")
            .query(&[("on_conflict", "device_id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[row]);
        tracing::debug!(device_id = %row.device_id, "upserting profile");
        let rows: Vec<UserProfileRow> = self.fetch_rows(req).await?;
        rows.into_iter().next().ok_or_else(|| RemoteError::Api {
            code: "empty_response".to_string(),
            message: "profile upsert returned no representation".to_string(),
        })
    }

    async fn list_submitted_reports(
        &self,
        user_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<ReportRow>> {
        let mut req = self
            .request(Method::GET, "reports")
            .query(&[
                ("select", "*,projects(project_name)"),
                ("status", "eq.submitted"),
                ("order", "report_date.desc"),
            ])
            .query(&[("limit", limit.to_string())]);
        if let Some(user_id) = user_id {
            req = req.query(&[("user_id", format!("eq.{user_id}"))]);
        }
        let mut reports: Vec<ReportRow> = self.fetch_rows(req).await?;

        if !reports.is_empty() {
            let ids: Vec<&str> = reports.iter().map(|r| r.id.as_str()).collect();
            let counts = self.photo_counts(&ids).await?;
            for report in &mut reports {
                report.photo_count = counts.get(&report.id).copied().unwrap_or(0);
            }
        }

        Ok(reports)
    }

    async fn upsert_section(&self, row: &SectionRow) -> Result<()> {
        let req = self
            .request(Method::POST, "final_report_sections")
            .query(&[("on_conflict", "report_id,section_key")])
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[row]);
        check(req.send().await?).await?;
        Ok(())
    }

    async fn mark_report_submitted(
        &self,
        report_id: &str,
        submitted_at: DateTime<Utc>,
    ) -> Result<()> {
        let req = self
            .request(Method::PATCH, "reports")
            .query(&[("id", format!("eq.{report_id}"))])
            .json(&json!({
                "status": "submitted",
                "submitted_at": submitted_at.to_rfc3339(),
            }));
        check(req.send().await?).await?;
        tracing::info!(report_id, "report marked submitted");
        Ok(())
    }

    async fn delete_report(&self, report_id: &str) -> Result<()> {
        let req = self
            .request(Method::DELETE, "reports")
            .query(&[("id", format!("eq.{report_id}"))]);
        check(req.send().await?).await?;
        Ok(())
    }

    async fn upload_photo(&self, upload: &PhotoUpload) -> Result<PhotoUploadResult> {
        let body = json!({
            "report_id": upload.report_id,
            "caption": upload.caption,
            "taken_at": upload.taken_at.to_rfc3339(),
            "gps": upload.gps,
            "content_base64": BASE64.encode(&upload.payload),
        });
        let req = self
            .request(Method::POST, "photos")
            .header("Prefer", "return=representation")
            .json(&body);
        tracing::debug!(report_id = %upload.report_id, bytes = upload.payload.len(), "uploading photo");
        let rows: Vec<PhotoUploadResult> = self.fetch_rows(req).await?;
        rows.into_iter().next().ok_or_else(|| RemoteError::Api {
            code: "empty_response".to_string(),
            message: "photo upload returned no representation".to_string(),
        })
    }
}

impl HttpRemote {
    /// Photos-per-report counts for an id set, computed client-side from a
    /// single membership query.
    async fn photo_counts(&self, report_ids: &[&str]) -> Result<HashMap<String, u32>> {
        #[derive(Deserialize)]
        struct ReportIdRow {
            report_id: String,
        }

        let req = self
            .request(Method::GET, "photos")
            .query(&[("select", "report_id")])
            .query(&[("report_id", format!("in.({})", report_ids.join(",")))]);
        let rows: Vec<ReportIdRow> = self.fetch_rows(req).await?;

        let mut counts: HashMap<String, u32> = HashMap::new();
        for row in rows {
            *counts.entry(row.report_id).or_default() += 1;
        }
        Ok(counts)
    }
}

/// Body shape PostgREST uses for error responses.
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
}

async fn check(resp: Response) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.bytes().await.unwrap_or_default();
    let parsed: ApiErrorBody = serde_json::from_slice(&body).unwrap_or_default();
    Err(RemoteError::Api {
        code: parsed.code.unwrap_or_else(|| status.as_u16().to_string()),
        message: parsed
            .message
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string()),
    })
}
