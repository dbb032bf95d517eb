//! Opening the store, and running store work off the async runtime.
//!
//! Opening is the only place the engine retries: transient load failures
//! (missing file, I/O error) are retried with exponential backoff up to the
//! policy's attempt limit, then reported as `StoreError::Unavailable`.
//! Malformed data is never retried.

use crate::config::RetryPolicy;
use crate::error::{EngineError, Result};
use data_loader::{DataLoadError, RecipeIndex, RecipeStore, StoreError};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Load the dataset in `data_dir` into an in-memory store.
///
/// With `refresh_stats`, the derived rating fields are recomputed from the
/// reviews after loading (the batch job the engine itself never runs).
pub async fn open_store(
    data_dir: &Path,
    policy: &RetryPolicy,
    refresh_stats: bool,
) -> Result<Arc<dyn RecipeStore>> {
    let start = Instant::now();

    let index = retry_with_backoff(policy, "loading recipe dataset", || {
        let dir = data_dir.to_path_buf();
        async move {
            tokio::task::spawn_blocking(move || {
                let mut index = RecipeIndex::load_from_dir(&dir)?;
                if refresh_stats {
                    index.refresh_recipe_stats();
                }
                Ok(index)
            })
            .await
            .unwrap_or_else(|e| {
                Err(DataLoadError::ValidationError(format!("loader task failed: {}", e)))
            })
        }
    })
    .await?;

    let (recipes, reviews) = index.counts();
    info!(
        "Opened store with {} recipes and {} reviews in {:.2?}",
        recipes,
        reviews,
        start.elapsed()
    );
    Ok(Arc::new(index))
}

/// Run `op` until it succeeds, fails permanently, or runs out of attempts.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, DataLoadError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        attempt += 1;
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.backoff(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:?}",
                    what, attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) if e.is_transient() => {
                return Err(StoreError::Unavailable(format!(
                    "{} failed after {} attempts: {}",
                    what, attempt, e
                ))
                .into());
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Run CPU-bound store work on the blocking thread pool
pub(crate) async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| EngineError::Task(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::{RECIPES_FILE, REVIEWS_FILE};
    use std::fs;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff_ms: 1,
            multiplier: 2.0,
            max_backoff_ms: 5,
        }
    }

    fn transient() -> DataLoadError {
        DataLoadError::FileNotFound {
            path: "recipes.jsonl".into(),
        }
    }

    #[tokio::test]
    async fn test_retry_then_succeed() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_policy(3), "test", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { if n < 2 { Err(transient()) } else { Ok(n) } }
        })
        .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_attempts_are_unavailable() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(&fast_policy(2), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;

        assert!(result.unwrap_err().is_unavailable());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = AtomicU32::new(0);
        let result: Result<()> = retry_with_backoff(&fast_policy(5), "test", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(DataLoadError::ValidationError("bad".into())) }
        })
        .await;

        assert!(matches!(result, Err(EngineError::Load(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_open_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(RECIPES_FILE),
            "{\"id\": 1, \"original_id\": 10, \"name\": \"toast\"}\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(REVIEWS_FILE),
            "{\"recipe_id\": 1, \"user_id\": 3, \"date\": \"2019-07-01\", \"rating\": 4}\n",
        )
        .unwrap();

        let store = open_store(dir.path(), &fast_policy(1), true).await.unwrap();
        let recipe = store.recipe_by_source_id(10).unwrap().unwrap();
        // Derived stats were refreshed from the single review
        assert_eq!(recipe.avg_rating, Some(4.0));
        assert_eq!(recipe.review_count, Some(1));
    }

    #[tokio::test]
    async fn test_open_missing_dir_is_unavailable() {
        let result = open_store(Path::new("/no/such/dataset"), &fast_policy(2), false).await;
        assert!(result.err().is_some_and(|e| e.is_unavailable()));
    }
}
