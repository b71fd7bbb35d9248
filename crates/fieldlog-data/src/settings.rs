//! User settings: the one read path that reconciles both tiers.
//!
//! Profiles are the identity record of the inspector, so staleness is worse
//! here than an extra round trip: when online, the remote copy is always
//! consulted and the strictly newer `updated_at` wins.  Ties keep the local
//! record.  Every other entity keeps the cache-first short-circuit.

use chrono::{DateTime, Utc};

use fieldlog_remote::rows::UserProfileRow;
use fieldlog_shared::normalize::normalize_user_profile;
use fieldlog_shared::UserProfile;
use fieldlog_store::keys;

use crate::error::{DataError, Result};
use crate::DataLayer;

/// Outcome of a profile save.
///
/// `LocalOnly` is the "saved locally, retry later" condition: the durable
/// local write succeeded but the remote upsert did not happen (offline) or
/// failed.  It is not an error -- the UI distinguishes it from a full
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Both tiers hold the profile; the remote-issued id is captured.
    Synced,
    /// Only the local tier holds the latest profile.
    LocalOnly,
}

impl DataLayer {
    /// Load the inspector's settings, reconciling local and remote copies.
    pub async fn load_user_settings(&self) -> Result<Option<UserProfile>> {
        let device_id = self.device_id();

        let local: Option<UserProfile> = match &device_id {
            Some(device_id) => match self.with_db(|db| db.get_user_profile(device_id)) {
                Ok(profile) => profile,
                Err(e) => {
                    tracing::warn!(error = %e, "local profile read failed, treating as absent");
                    None
                }
            },
            None => None,
        };

        if !self.is_online() {
            tracing::debug!("offline, serving cached profile");
            return Ok(local);
        }
        let Some(device_id) = device_id else {
            tracing::debug!("no device identity, cannot consult remote profile");
            return Ok(local);
        };

        let row = match self.remote().get_profile_by_device(&device_id).await {
            Ok(row) => row,
            Err(e) => {
                // We may still have a perfectly usable local copy.
                tracing::warn!(error = %e, "remote profile fetch failed, keeping local");
                return Ok(local);
            }
        };
        let Some(row) = row else {
            return Ok(local);
        };

        let Ok(record) = serde_json::to_value(row) else {
            return Ok(local);
        };
        let fetched = normalize_user_profile(&record);

        if stamp(fetched.updated_at) > local.as_ref().map_or(0, |p| stamp(p.updated_at)) {
            tracing::info!("remote profile is newer, caching locally");
            self.cache_profile(&fetched);
            Ok(Some(fetched))
        } else {
            Ok(local)
        }
    }

    /// Save the inspector's settings: local tier first, then remote.
    ///
    /// The profile's durable id is never taken from the caller; it is the
    /// captured remote-issued identity or nothing, and the remote store
    /// mints one on first upsert.
    pub async fn save_user_settings(&self, profile: &UserProfile) -> Result<SaveOutcome> {
        let device_id = self.device_id().ok_or(DataError::NoDeviceIdentity)?;

        let mut record = profile.clone();
        record.device_id = device_id;
        record.id = self.flag(keys::USER_ID);
        record.updated_at = Some(Utc::now());

        // The local write is the durable part of this operation; it must
        // succeed before anything remote is attempted.
        self.with_db(|db| db.upsert_user_profile(&record))?;

        if !self.is_online() {
            tracing::info!("offline, profile saved locally only");
            return Ok(SaveOutcome::LocalOnly);
        }

        match self.remote().upsert_profile(&profile_to_row(&record)).await {
            Ok(stored) => {
                if let Some(id) = stored.id {
                    record.id = Some(id);
                    self.cache_profile(&record);
                }
                tracing::info!("profile synced to remote store");
                Ok(SaveOutcome::Synced)
            }
            Err(e) => {
                tracing::warn!(error = %e, "remote profile save failed, will retry later");
                Ok(SaveOutcome::LocalOnly)
            }
        }
    }

    /// Best-effort write of a profile to the local tier, capturing the
    /// remote-issued identity flag alongside.
    fn cache_profile(&self, profile: &UserProfile) {
        if let Err(e) = self.with_db(|db| db.upsert_user_profile(profile)) {
            tracing::warn!(error = %e, "failed to cache profile");
        }
        if let Some(id) = &profile.id {
            if let Err(e) = self.with_flags(|flags| flags.set(keys::USER_ID, id)) {
                tracing::warn!(error = %e, "failed to record user identity flag");
            }
        }
    }
}

/// Millisecond stamp for last-writer-wins comparison; a missing timestamp
/// always loses.
fn stamp(updated_at: Option<DateTime<Utc>>) -> i64 {
    updated_at.map_or(0, |dt| dt.timestamp_millis())
}

fn profile_to_row(profile: &UserProfile) -> UserProfileRow {
    UserProfileRow {
        id: profile.id.clone(),
        device_id: profile.device_id.clone(),
        full_name: Some(profile.full_name.clone()),
        title: Some(profile.title.clone()),
        company: Some(profile.company.clone()),
        email: Some(profile.email.clone()),
        phone: Some(profile.phone.clone()),
        updated_at: profile.updated_at.map(|dt| dt.to_rfc3339()),
    }
}
