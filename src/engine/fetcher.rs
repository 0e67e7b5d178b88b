/*!
§4.3 Fetcher: bounded-concurrency downloader with a cache-or-tempfile
storage policy. Downloads are streamed to a sibling temp file and atomically
renamed into place so concurrent fetchers never observe a partially-written
target path (§5 "Shared resources").
*/
use crate::engine::backoff::retry_with_backoff;
use crate::engine::broker::ArchiveDescriptor;
use crate::engine::error::EngineError;
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;

/// A file that has finished downloading (or was already cache-resident) and
/// is ready for the [`ParserDriver`](crate::engine::parser_driver).
#[derive(Debug, Clone)]
pub struct ReadyFile {
    pub path: PathBuf,
    pub collector: String,
    pub nominal_time: f64,
}

/// §4.3's shared-memory-or-OS-temp selection for `ram_fetch`. Linux exposes
/// `/dev/shm`; other platforms fall back to the OS temp dir.
pub fn ram_fetch_dir() -> Option<PathBuf> {
    let shm = Path::new("/dev/shm");
    if shm.is_dir() {
        Some(shm.to_path_buf())
    } else {
        None
    }
}

/// Picks the parent directory new chunk tempdirs are created under, per
/// §4.3's `ram_fetch`/`cache_dir` policy.
pub fn storage_root(cache_dir: Option<&Path>, ram_fetch: bool) -> PathBuf {
    if let Some(dir) = cache_dir {
        return dir.to_path_buf();
    }
    if ram_fetch {
        if let Some(shm) = ram_fetch_dir() {
            return shm;
        }
    }
    std::env::temp_dir()
}

fn basename(url: &str) -> &str {
    url.rsplit('/').next().unwrap_or(url)
}

/// Bounded-concurrency downloader. One instance is shared (via `Arc`) across
/// all fetch tasks within a stream so the semaphore is enforced process-wide
/// rather than per chunk.
pub struct Fetcher {
    client: reqwest::Client,
    semaphore: Arc<Semaphore>,
    target_dir: PathBuf,
    cached: bool,
    // Kept alive so the scratch directory isn't removed early; `None` when
    // `cached` is true and `target_dir` is a persistent, caller-owned cache.
    _scratch_dir: Option<tempfile::TempDir>,
}

impl Fetcher {
    /// When `cached` is true, `storage_root` is used directly as a
    /// persistent cache directory and [`reclaim`](Fetcher::reclaim) is a
    /// no-op. When `cached` is false, `storage_root` names a *shared*
    /// scratch root (e.g. `/dev/shm` or the OS temp dir) and this fetcher
    /// carves out its own unique subdirectory under it, so `reclaim` only
    /// ever deletes this stream's own files, never the shared root.
    pub fn new(max_concurrent_downloads: usize, storage_root: PathBuf, cached: bool) -> Result<Self, EngineError> {
        let (target_dir, scratch_dir) = if cached {
            (storage_root, None)
        } else {
            std::fs::create_dir_all(&storage_root).map_err(|e| {
                EngineError::Config(format!("cannot create {}: {e}", storage_root.display()))
            })?;
            let dir = tempfile::Builder::new()
                .prefix("bgpstream-")
                .tempdir_in(&storage_root)
                .map_err(|e| {
                    EngineError::Config(format!(
                        "cannot create scratch dir under {}: {e}",
                        storage_root.display()
                    ))
                })?;
            let path = dir.path().to_path_buf();
            (path, Some(dir))
        };
        Ok(Fetcher {
            client: reqwest::Client::new(),
            semaphore: Arc::new(Semaphore::new(max_concurrent_downloads.max(1))),
            target_dir,
            cached,
            _scratch_dir: scratch_dir,
        })
    }

    /// §4.3 steps 1-4 for one descriptor: computes the cache path, skips the
    /// download if already resident, otherwise streams the body to a sibling
    /// `.part` file and atomically renames it into place.
    pub async fn fetch(&self, descriptor: &ArchiveDescriptor) -> Result<ReadyFile, EngineError> {
        let collector_dir = self.target_dir.join(&descriptor.collector);
        tokio::fs::create_dir_all(&collector_dir).await?;
        let file_name = basename(&descriptor.url);
        let target_path = collector_dir.join(file_name);

        let already_present = if target_path.exists() {
            match (self.cached, descriptor.size) {
                (true, _) => true,
                (false, Some(expected)) => {
                    tokio::fs::metadata(&target_path).await.map(|m| m.len() == expected).unwrap_or(false)
                }
                (false, None) => false,
            }
        } else {
            false
        };

        if already_present {
            tracing::debug!(path = %target_path.display(), "fetch: cache hit");
            return Ok(ReadyFile {
                path: target_path,
                collector: descriptor.collector.clone(),
                nominal_time: descriptor.nominal_time,
            });
        }

        let permit = self
            .semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("fetcher semaphore is never closed while the fetcher is alive");

        let url = descriptor.url.clone();
        let tmp_path = collector_dir.join(format!("{file_name}.part"));
        let client = self.client.clone();

        retry_with_backoff(|| {
            let url = url.clone();
            let tmp_path = tmp_path.clone();
            let client = client.clone();
            async move {
                tracing::debug!(url = %url, "fetch: downloading");
                let resp = client
                    .get(&url)
                    .header("Accept-Encoding", "identity")
                    .send()
                    .await
                    .map_err(|e| EngineError::Config(format!("fetch error: {e}")))?;
                if !resp.status().is_success() {
                    return Err(EngineError::Config(format!(
                        "fetch returned status {} for {url}",
                        resp.status()
                    )));
                }
                let mut file = File::create(&tmp_path)
                    .await
                    .map_err(|e| EngineError::Config(format!("cannot create {}: {e}", tmp_path.display())))?;
                let mut stream = resp.bytes_stream();
                while let Some(chunk) = stream.next().await {
                    let chunk = chunk.map_err(|e| EngineError::Config(format!("fetch stream error: {e}")))?;
                    file.write_all(&chunk)
                        .await
                        .map_err(|e| EngineError::Config(format!("write error: {e}")))?;
                }
                file.flush().await.map_err(|e| EngineError::Config(e.to_string()))?;
                Ok(())
            }
        })
        .await?;

        drop(permit);

        tokio::fs::rename(&tmp_path, &target_path).await?;

        Ok(ReadyFile {
            path: target_path,
            collector: descriptor.collector.clone(),
            nominal_time: descriptor.nominal_time,
        })
    }

    /// Recursively removes this fetcher's own scratch subdirectory, per
    /// §4.4 step 5's chunk-boundary reclamation when `cache_dir` is unset.
    /// A no-op when `cached` is true, since `target_dir` is then the
    /// caller's persistent cache directory, not scratch space this fetcher
    /// owns.
    pub async fn reclaim(&self) -> Result<(), EngineError> {
        if self.cached {
            return Ok(());
        }
        if self.target_dir.exists() {
            tokio::fs::remove_dir_all(&self.target_dir).await?;
        }
        Ok(())
    }
}
