use std::sync::Arc;
use std::time::SystemTime;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use upscaler_core::RetentionPolicy;
use upscaler_storage::{AssetStore, StorageResult};

/// Counts from one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub scanned: usize,
    pub deleted: usize,
    pub failed: usize,
    /// Modified within the grace window, never considered for deletion.
    pub skipped: usize,
}

/// Periodically deletes stored files older than the retention TTL.
///
/// Correctness against in-flight uploads comes from the TTL being far longer than any
/// request, not from locking.
#[derive(Clone)]
pub struct RetentionSweeper {
    store: Arc<dyn AssetStore>,
    policy: RetentionPolicy,
}

impl RetentionSweeper {
    pub fn new(store: Arc<dyn AssetStore>, policy: RetentionPolicy) -> Self {
        Self { store, policy }
    }

    /// Start the background sweep loop. The first sweep runs immediately.
    /// Returns a JoinHandle that resolves once `shutdown` is cancelled.
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval(self.policy.sweep_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            tracing::info!(
                ttl_secs = self.policy.ttl.as_secs(),
                interval_secs = self.policy.sweep_interval.as_secs(),
                grace_secs = self.policy.grace.as_secs(),
                "Retention sweeper started"
            );

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        tracing::info!("Retention sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = self.sweep().await {
                            tracing::error!(error = %e, "Retention sweep failed");
                        }
                    }
                }
            }
        })
    }

    pub async fn sweep(&self) -> StorageResult<SweepReport> {
        self.sweep_at(SystemTime::now()).await
    }

    /// Delete every file last modified before `now - ttl`.
    ///
    /// A file that cannot be deleted is logged and counted as failed; the sweep carries on.
    #[tracing::instrument(skip(self, now), fields(cleanup.operation = "retention_sweep"))]
    pub async fn sweep_at(&self, now: SystemTime) -> StorageResult<SweepReport> {
        let cutoff = now.checked_sub(self.policy.ttl.max(self.policy.grace));
        let recent = now.checked_sub(self.policy.grace);

        let files = self.store.list_all().await?;
        let mut report = SweepReport::default();

        for file in files {
            report.scanned += 1;

            if recent.map_or(true, |recent| file.last_modified > recent) {
                report.skipped += 1;
                continue;
            }

            if !cutoff.is_some_and(|cutoff| file.last_modified < cutoff) {
                continue;
            }

            match self.store.delete(&file.path).await {
                Ok(true) => {
                    report.deleted += 1;
                    tracing::debug!(
                        path = %file.path.display(),
                        size_bytes = file.size_bytes,
                        "Deleted expired file"
                    );
                }
                // Already gone.
                Ok(false) => {}
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        path = %file.path.display(),
                        error = %e,
                        "Failed to delete expired file"
                    );
                }
            }
        }

        if report.deleted > 0 || report.failed > 0 {
            tracing::info!(
                scanned = report.scanned,
                deleted = report.deleted,
                failed = report.failed,
                skipped = report.skipped,
                "Retention sweep completed"
            );
        } else {
            tracing::debug!(
                scanned = report.scanned,
                skipped = report.skipped,
                "Retention sweep completed"
            );
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use upscaler_core::{Asset, AssetRole};
    use upscaler_storage::{LocalAssetStore, StorageError, StoredFile};

    const HOUR: Duration = Duration::from_secs(3600);

    fn policy() -> RetentionPolicy {
        RetentionPolicy {
            ttl: 6 * HOUR,
            sweep_interval: HOUR,
            grace: Duration::from_secs(60),
        }
    }

    async fn local_store() -> (tempfile::TempDir, Arc<dyn AssetStore>) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalAssetStore::new(dir.path()).await.unwrap();
        (dir, Arc::new(store))
    }

    async fn stored_with_age(store: &Arc<dyn AssetStore>, age: Duration) -> PathBuf {
        let asset = store.allocate(AssetRole::Original, "png");
        store.write(&asset, b"bytes").await.unwrap();
        let file = std::fs::File::options()
            .write(true)
            .open(&asset.path)
            .unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
        asset.path
    }

    #[tokio::test]
    async fn test_sweep_deletes_only_expired() {
        let (_dir, store) = local_store().await;
        let old = stored_with_age(&store, 7 * HOUR).await;
        let fresh = stored_with_age(&store, HOUR).await;

        let sweeper = RetentionSweeper::new(store, policy());
        let report = sweeper.sweep().await.unwrap();

        assert_eq!(report.scanned, 2);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.failed, 0);
        assert!(!old.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_sweep_skips_files_in_grace_window() {
        let (_dir, store) = local_store().await;
        let future = stored_with_age(&store, Duration::ZERO).await;
        let file = std::fs::File::options().write(true).open(&future).unwrap();
        file.set_modified(SystemTime::now() + HOUR).unwrap();

        // With a TTL shorter than the grace window, grace still wins.
        let sweeper = RetentionSweeper::new(
            store,
            RetentionPolicy {
                ttl: Duration::from_secs(1),
                sweep_interval: HOUR,
                grace: Duration::from_secs(120),
            },
        );
        let report = sweeper.sweep().await.unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.deleted, 0);
        assert!(future.exists());
    }

    #[tokio::test]
    async fn test_sweep_at_uses_given_clock() {
        let (_dir, store) = local_store().await;
        let path = stored_with_age(&store, Duration::ZERO).await;
        let sweeper = RetentionSweeper::new(store, policy());

        let report = sweeper
            .sweep_at(SystemTime::now() + 5 * HOUR)
            .await
            .unwrap();
        assert_eq!(report.deleted, 0);
        assert!(path.exists());

        let report = sweeper
            .sweep_at(SystemTime::now() + 7 * HOUR)
            .await
            .unwrap();
        assert_eq!(report.deleted, 1);
        assert!(!path.exists());
    }

    /// Lists two expired files and refuses to delete the first.
    struct FlakyStore {
        root: PathBuf,
    }

    #[async_trait]
    impl AssetStore for FlakyStore {
        fn root(&self) -> &Path {
            &self.root
        }

        fn allocate(&self, _role: AssetRole, _extension: &str) -> Asset {
            unimplemented!("not used by the sweeper")
        }

        async fn write(&self, _asset: &Asset, _data: &[u8]) -> StorageResult<u64> {
            unimplemented!("not used by the sweeper")
        }

        async fn read(&self, id: &str, _role: AssetRole, _extension: &str) -> StorageResult<Vec<u8>> {
            Err(StorageError::NotFound(id.to_string()))
        }

        async fn list_all(&self) -> StorageResult<Vec<StoredFile>> {
            let expired = SystemTime::now() - 24 * HOUR;
            Ok(["stuck_original.png", "gone_original.png"]
                .iter()
                .map(|name| StoredFile {
                    path: self.root.join(name),
                    last_modified: expired,
                    size_bytes: 1,
                })
                .collect())
        }

        async fn delete(&self, path: &Path) -> StorageResult<bool> {
            if path.ends_with("stuck_original.png") {
                Err(StorageError::DeleteFailed("permission denied".to_string()))
            } else {
                Ok(true)
            }
        }
    }

    #[tokio::test]
    async fn test_sweep_continues_past_failures() {
        let store = Arc::new(FlakyStore {
            root: PathBuf::from("/nonexistent"),
        });
        let sweeper = RetentionSweeper::new(store, policy());

        let report = sweeper.sweep().await.unwrap();
        assert_eq!(
            report,
            SweepReport {
                scanned: 2,
                deleted: 1,
                failed: 1,
                skipped: 0
            }
        );
    }

    #[tokio::test]
    async fn test_start_sweeps_and_stops_on_cancel() {
        let (_dir, store) = local_store().await;
        let old = stored_with_age(&store, 7 * HOUR).await;

        let sweeper = Arc::new(RetentionSweeper::new(store, policy()));
        let shutdown = CancellationToken::new();
        let handle = sweeper.start(shutdown.clone());

        // First tick fires immediately.
        for _ in 0..100 {
            if !old.exists() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!old.exists());

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("sweeper did not stop")
            .unwrap();
    }
}
