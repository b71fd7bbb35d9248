//! Project loading and the active-project selection.

use serde_json::Value;

use fieldlog_remote::RemoteError;
use fieldlog_shared::normalize::{normalize_project, str_field};
use fieldlog_shared::Project;
use fieldlog_store::keys;

use crate::error::Result;
use crate::resolver::{tiered_list, tiered_single};
use crate::DataLayer;

const USER_ID_ALIASES: &[&str] = &["userId", "user_id"];

impl DataLayer {
    /// Load every project visible to the active user, local tier first.
    pub async fn load_projects(&self) -> Result<Vec<Project>> {
        let scope = self.user_scope();

        tiered_list(
            self.is_online(),
            "projects",
            || {
                self.with_db(|db| match &scope {
                    Some(user_id) => db.list_projects_for_user(user_id),
                    None => db.list_projects(),
                })
            },
            || async {
                let rows = self.remote().list_projects(scope.as_deref()).await?;
                rows.into_iter()
                    .map(|row| serde_json::to_value(row).map_err(RemoteError::from))
                    .collect()
            },
            normalize_project,
            |projects| {
                self.with_db(|db| {
                    for project in projects {
                        match serde_json::to_value(project) {
                            Ok(record) => {
                                if let Err(e) = db.upsert_project(&record) {
                                    tracing::warn!(
                                        project_id = %project.id,
                                        error = %e,
                                        "failed to cache project"
                                    );
                                }
                            }
                            Err(e) => {
                                tracing::warn!(project_id = %project.id, error = %e, "unencodable project")
                            }
                        }
                    }
                    Ok(())
                })
            },
        )
        .await
    }

    /// Load the currently selected project with its contractors, or `None`
    /// when no selection is set or the project cannot be found.
    pub async fn load_active_project(&self) -> Result<Option<Project>> {
        let Some(active_id) = self.get_active_project_id() else {
            tracing::debug!("no active project selected");
            return Ok(None);
        };
        let scope = self.user_scope();

        tiered_single(
            self.is_online(),
            "active_project",
            || {
                self.with_db(|db| {
                    Ok(db.get_project(&active_id)?.filter(|record| {
                        owned_by(record, scope.as_deref())
                    }))
                })
            },
            || async {
                let Some(project) = self.remote().get_project(&active_id).await? else {
                    return Ok(None);
                };
                let contractors = self.remote().list_contractors(&active_id).await?;
                let mut record = serde_json::to_value(project).map_err(RemoteError::from)?;
                record["contractors"] =
                    serde_json::to_value(contractors).map_err(RemoteError::from)?;
                Ok(Some(record))
            },
            normalize_project,
            |project| {
                self.with_db(|db| db.upsert_project(&serde_json::to_value(project)?))
            },
        )
        .await
    }

    /// Record the active project selection.  Direct flag write: no
    /// normalization, no remote interaction.
    pub fn set_active_project_id(&self, project_id: &str) -> Result<()> {
        self.with_flags(|flags| flags.set(keys::ACTIVE_PROJECT_ID, &project_id))?;
        tracing::debug!(project_id, "active project set");
        Ok(())
    }

    /// The active project selection, if any.
    pub fn get_active_project_id(&self) -> Option<String> {
        self.flag(keys::ACTIVE_PROJECT_ID)
    }
}

/// A cached record belongs to the scope when no scope applies or when its
/// owner field (either alias) matches.
fn owned_by(record: &Value, scope: Option<&str>) -> bool {
    match scope {
        None => true,
        Some(user_id) => str_field(record, USER_ID_ALIASES) == Some(user_id),
    }
}
