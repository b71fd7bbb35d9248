//! Draft CRUD over the flag store.
//!
//! Drafts are ephemeral and local-only: one JSON map under a single flag
//! key, entries keyed by `"{project_id}_{date}"`.  Saving overwrites the
//! entry and stamps `updatedAt`; submission cleanup or an explicit delete
//! removes it.  Drafts never travel to the remote store.

use std::collections::BTreeMap;

use chrono::Utc;
use serde_json::Value;

use fieldlog_shared::Draft;
use fieldlog_store::keys;

use crate::error::Result;
use crate::DataLayer;

type DraftMap = BTreeMap<String, Draft>;

/// A draft together with its composite map key, as listed by
/// [`DataLayer::get_all_drafts`].
#[derive(Debug, Clone, PartialEq)]
pub struct DraftEntry {
    pub key: String,
    pub draft: Draft,
}

fn draft_key(project_id: &str, date: &str) -> String {
    format!("{project_id}_{date}")
}

impl DataLayer {
    fn draft_map(&self) -> DraftMap {
        self.flag(keys::DRAFTS).unwrap_or_default()
    }

    /// The draft for a project/date, or `None`.
    pub fn get_current_draft(&self, project_id: &str, date: &str) -> Option<Draft> {
        let mut map = self.draft_map();
        map.remove(&draft_key(project_id, date))
    }

    /// Overwrite the draft for a project/date, stamping `updatedAt`.
    /// Called on every autosave; debouncing is the caller's job.
    pub fn save_draft(&self, project_id: &str, date: &str, content: Value) -> Result<Draft> {
        let key = draft_key(project_id, date);
        let draft = Draft {
            content,
            updated_at: Utc::now(),
        };

        let mut map = self.draft_map();
        map.insert(key.clone(), draft.clone());
        self.with_flags(|flags| flags.set(keys::DRAFTS, &map))?;

        tracing::debug!(key, "draft saved");
        Ok(draft)
    }

    /// Remove the draft for a project/date.  No-op when absent.
    pub fn delete_draft(&self, project_id: &str, date: &str) -> Result<()> {
        let key = draft_key(project_id, date);
        let mut map = self.draft_map();
        if map.remove(&key).is_some() {
            self.with_flags(|flags| flags.set(keys::DRAFTS, &map))?;
            tracing::debug!(key, "draft deleted");
        }
        Ok(())
    }

    /// Every stored draft with its composite key, for the drafts overview.
    pub fn get_all_drafts(&self) -> Vec<DraftEntry> {
        self.draft_map()
            .into_iter()
            .map(|(key, draft)| DraftEntry { key, draft })
            .collect()
    }
}
