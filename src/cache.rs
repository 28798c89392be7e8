use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::{config::CacheDuration, source::EpisodeSource};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry {
    fetched_at: DateTime<Utc>,
    payload: Vec<Value>,
}

impl CacheEntry {
    fn is_fresh(&self, duration: CacheDuration) -> bool {
        // Entries from the future count as brand new
        let age = (Utc::now() - self.fetched_at).to_std().unwrap_or_default();
        duration.is_fresh(age)
    }
}

/// Wraps an [`EpisodeSource`] and keeps its playlists on disk for `duration`
///
/// When refreshing an expired playlist fails, the expired copy is served instead.
#[derive(Debug)]
pub struct CachedEpisodeSource<S> {
    inner: S,
    dir: PathBuf,
    duration: CacheDuration,
}

impl<S: EpisodeSource> CachedEpisodeSource<S> {
    pub fn new(inner: S, dir: impl Into<PathBuf>, duration: CacheDuration) -> Self {
        Self {
            inner,
            dir: dir.into(),
            duration,
        }
    }

    /// Path of the cache file holding `playlist_id`
    ///
    /// Bytes outside `[A-Za-z0-9_-]` are written as `%XX`, so distinct ids never share a file.
    #[must_use]
    pub fn entry_path(&self, playlist_id: &str) -> PathBuf {
        let mut file_name = String::with_capacity(playlist_id.len() + 5);
        for b in playlist_id.bytes() {
            if b.is_ascii_alphanumeric() || b == b'-' || b == b'_' {
                file_name.push(char::from(b));
            } else {
                file_name.push_str(&format!("%{b:02X}"));
            }
        }
        file_name.push_str(".json");
        self.dir.join(file_name)
    }

    async fn read_entry(path: &Path) -> Option<CacheEntry> {
        let bytes = match tokio::fs::read(path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Unable to read cache file {}: {e}", path.display());
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Ignoring malformed cache file {}: {e}", path.display());
                None
            }
        }
    }

    async fn write_entry(&self, path: &Path, entry: &CacheEntry) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Creating cache directory {}", self.dir.display()))?;
        let bytes = serde_json::to_vec(entry).context("Serializing cache entry")?;
        tokio::fs::write(path, bytes)
            .await
            .with_context(|| format!("Writing cache file {}", path.display()))
    }
}

#[async_trait]
impl<S: EpisodeSource> EpisodeSource for CachedEpisodeSource<S> {
    #[instrument(skip(self))]
    async fn fetch_episodes(&self, playlist_id: &str) -> Result<Vec<Value>> {
        let path = self.entry_path(playlist_id);
        let cached = match Self::read_entry(&path).await {
            Some(entry) if entry.is_fresh(self.duration) => {
                debug!("Cache hit for {playlist_id}");
                return Ok(entry.payload);
            }
            other => other,
        };
        debug!("Cache miss for {playlist_id}");

        let payload = match self.inner.fetch_episodes(playlist_id).await {
            Ok(p) => p,
            Err(e) => {
                let Some(stale) = cached else {
                    return Err(e);
                };
                warn!(
                    "Refreshing {playlist_id} failed, using copy from {}: {e:#}",
                    stale.fetched_at
                );
                return Ok(stale.payload);
            }
        };

        let entry = CacheEntry {
            fetched_at: Utc::now(),
            payload,
        };
        if let Err(e) = self.write_entry(&path, &entry).await {
            warn!("Unable to cache {playlist_id}: {e:#}");
        }

        Ok(entry.payload)
    }
}
