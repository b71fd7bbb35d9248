//! The tiered read algorithm.
//!
//! Every entity load follows the same five steps: try the local tier; a
//! non-empty result is served as-is (the remote store is not consulted --
//! freshness is traded for offline availability); an empty result gates on
//! connectivity; online misses query the remote store, normalize, write the
//! result back best-effort and return it.
//!
//! The algorithm is written once, parameterized by the local fetch, the
//! remote fetch, the normalizer and the write-back.  Both tiers produce
//! `serde_json::Value` records so one normalizer signature covers wire rows
//! and possibly-stale cache entries alike.

use std::future::Future;

use serde_json::Value;

use crate::error::Result;

/// Tiered load for list-returning operations.
///
/// Failures never abort the caller: a broken local read falls through to
/// the remote tier, a remote failure degrades to an empty list, and a
/// write-back failure is logged and dropped (the read already succeeded).
pub(crate) async fn tiered_list<T, L, R, Fut, N, W>(
    online: bool,
    entity: &'static str,
    local: L,
    remote: R,
    normalize: N,
    write_back: W,
) -> Result<Vec<T>>
where
    L: FnOnce() -> Result<Vec<Value>>,
    R: FnOnce() -> Fut,
    Fut: Future<Output = fieldlog_remote::Result<Vec<Value>>>,
    N: Fn(&Value) -> T,
    W: FnOnce(&[T]) -> Result<()>,
{
    match local() {
        Ok(records) if !records.is_empty() => {
            tracing::debug!(entity, count = records.len(), "serving from local store");
            return Ok(records.iter().map(|r| normalize(r)).collect());
        }
        Ok(_) => {}
        Err(e) => {
            tracing::warn!(entity, error = %e, "local read failed, treating as empty");
        }
    }

    if !online {
        tracing::debug!(entity, "offline with nothing cached");
        return Ok(Vec::new());
    }

    let rows = match remote().await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::error!(entity, error = %e, "remote query failed, degrading to empty");
            return Ok(Vec::new());
        }
    };

    let items: Vec<T> = rows.iter().map(|r| normalize(r)).collect();
    if let Err(e) = write_back(&items) {
        tracing::warn!(entity, error = %e, "cache write-back failed");
    }
    tracing::debug!(entity, count = items.len(), "served from remote store");
    Ok(items)
}

/// Tiered load for single-entity operations.
///
/// Absence is `Ok(None)` at either tier, but a remote transport failure on
/// a cache miss propagates to the caller -- the entity was asked for by key
/// and "could not find out" is different from "does not exist".
pub(crate) async fn tiered_single<T, L, R, Fut, N, W>(
    online: bool,
    entity: &'static str,
    local: L,
    remote: R,
    normalize: N,
    write_back: W,
) -> Result<Option<T>>
where
    L: FnOnce() -> Result<Option<Value>>,
    R: FnOnce() -> Fut,
    Fut: Future<Output = fieldlog_remote::Result<Option<Value>>>,
    N: Fn(&Value) -> T,
    W: FnOnce(&T) -> Result<()>,
{
    match local() {
        Ok(Some(record)) => {
            tracing::debug!(entity, "serving from local store");
            return Ok(Some(normalize(&record)));
        }
        Ok(None) => {}
        Err(e) => {
            tracing::warn!(entity, error = %e, "local read failed, treating as miss");
        }
    }

    if !online {
        tracing::debug!(entity, "offline with nothing cached");
        return Ok(None);
    }

    let Some(row) = remote().await? else {
        tracing::debug!(entity, "absent from remote store");
        return Ok(None);
    };

    let item = normalize(&row);
    if let Err(e) = write_back(&item) {
        tracing::warn!(entity, error = %e, "cache write-back failed");
    }
    Ok(Some(item))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    use fieldlog_remote::RemoteError;
    use serde_json::json;

    fn remote_failure() -> RemoteError {
        RemoteError::Api {
            code: "mock".to_string(),
            message: "unreachable".to_string(),
        }
    }

    #[tokio::test]
    async fn local_hit_short_circuits_remote() {
        let remote_called = Cell::new(false);

        let result = tiered_list(
            true,
            "test",
            || Ok(vec![json!({ "v": 1 })]),
            || async {
                remote_called.set(true);
                Ok(vec![json!({ "v": 2 })])
            },
            |record| record["v"].as_i64().unwrap_or(0),
            |_| Ok(()),
        )
        .await
        .unwrap();

        assert_eq!(result, vec![1]);
        assert!(!remote_called.get());
    }

    #[tokio::test]
    async fn offline_miss_is_empty_not_error() {
        let result = tiered_list(
            false,
            "test",
            || Ok(Vec::new()),
            || async { Ok(vec![json!({ "v": 2 })]) },
            |record| record["v"].as_i64().unwrap_or(0),
            |_| Ok(()),
        )
        .await
        .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn remote_miss_writes_back_and_returns() {
        let written = RefCell::new(Vec::new());

        let result = tiered_list(
            true,
            "test",
            || Ok(Vec::new()),
            || async { Ok(vec![json!({ "v": 7 }), json!({ "v": 8 })]) },
            |record| record["v"].as_i64().unwrap_or(0),
            |items| {
                written.borrow_mut().extend_from_slice(items);
                Ok(())
            },
        )
        .await
        .unwrap();

        assert_eq!(result, vec![7, 8]);
        assert_eq!(*written.borrow(), vec![7, 8]);
    }

    #[tokio::test]
    async fn list_degrades_remote_failure_to_empty() {
        let result: Vec<i64> = tiered_list(
            true,
            "test",
            || Ok(Vec::new()),
            || async { Err(remote_failure()) },
            |record| record["v"].as_i64().unwrap_or(0),
            |_| Ok(()),
        )
        .await
        .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn single_propagates_remote_failure() {
        let result = tiered_single(
            true,
            "test",
            || Ok(None),
            || async { Err(remote_failure()) },
            |record| record["v"].as_i64().unwrap_or(0),
            |_| Ok(()),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn single_local_error_falls_through_to_remote() {
        let result = tiered_single(
            true,
            "test",
            || Err(fieldlog_store::StoreError::Poisoned.into()),
            || async { Ok(Some(json!({ "v": 3 }))) },
            |record| record["v"].as_i64().unwrap_or(0),
            |_| Ok(()),
        )
        .await
        .unwrap();

        assert_eq!(result, Some(3));
    }
}
