//! AI response cache over the flag store.
//!
//! A per-report memo of the last generated-text artifact so regeneration is
//! a choice, not a page-load cost.  Invalidated by submission cleanup or an
//! explicit clear -- never by age.

use std::collections::BTreeMap;

use chrono::Utc;

use fieldlog_shared::AiCacheEntry;
use fieldlog_store::keys;

use crate::error::Result;
use crate::DataLayer;

type CacheMap = BTreeMap<String, AiCacheEntry>;

impl DataLayer {
    fn cache_map(&self) -> CacheMap {
        self.flag(keys::AI_CACHE).unwrap_or_default()
    }

    /// Memoize a generated response for a report.
    pub fn cache_ai_response(&self, report_id: &str, response: &str) -> Result<()> {
        let mut map = self.cache_map();
        map.insert(
            report_id.to_string(),
            AiCacheEntry {
                response: response.to_string(),
                cached_at: Utc::now(),
            },
        );
        self.with_flags(|flags| flags.set(keys::AI_CACHE, &map))?;
        tracing::debug!(report_id, "ai response cached");
        Ok(())
    }

    /// The memoized response for a report, or `None`.
    pub fn get_cached_ai_response(&self, report_id: &str) -> Option<String> {
        let mut map = self.cache_map();
        map.remove(report_id).map(|entry| entry.response)
    }

    /// Drop the memo for a report.  No-op when absent.
    pub fn clear_ai_response_cache(&self, report_id: &str) -> Result<()> {
        let mut map = self.cache_map();
        if map.remove(report_id).is_some() {
            self.with_flags(|flags| flags.set(keys::AI_CACHE, &map))?;
            tracing::debug!(report_id, "ai response cache cleared");
        }
        Ok(())
    }
}
