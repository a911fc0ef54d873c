//! Flat-directory disk store.
//!
//! Every entry is a single file named after its cache key:
//!
//! ```text
//! <cache_dir>/ui-icons_ffffff_256x240.png
//! <cache_dir>/ui-bg_glass_55_fbf9ee_1x400.png
//! ```
//!
//! Writes go to a hidden temporary sibling first and are renamed into
//! place, so readers in this or another process never observe a partial
//! file. There is no eviction: entries live until removed externally.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tracing::{debug, instrument};

use super::traits::{is_valid_key, BoxFuture, CacheError, ImageStore};

/// Disk-backed image store rooted at a single directory.
#[derive(Debug)]
pub struct DiskImageStore {
    directory: PathBuf,
    temp_counter: AtomicU64,
}

impl DiskImageStore {
    /// Creates a store over an existing directory.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            temp_counter: AtomicU64::new(0),
        }
    }

    /// Returns the cache directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the on-disk path for a key.
    pub fn entry_path(&self, key: &str) -> Result<PathBuf, CacheError> {
        if !is_valid_key(key) {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.directory.join(key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        let n = self.temp_counter.fetch_add(1, Ordering::Relaxed);
        self.directory
            .join(format!(".{}.{}.{}.tmp", key, std::process::id(), n))
    }

    #[instrument(skip(self), fields(dir = %self.directory.display()))]
    async fn read_entry(&self, key: String) -> Result<Option<Bytes>, CacheError> {
        let path = self.entry_path(&key)?;
        match tokio::fs::read(&path).await {
            Ok(data) => {
                debug!(size_bytes = data.len(), "Disk cache hit");
                Ok(Some(Bytes::from(data)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Disk cache miss");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self, data), fields(dir = %self.directory.display(), size_bytes = data.len()))]
    async fn write_entry(&self, key: String, data: Bytes) -> Result<(), CacheError> {
        let path = self.entry_path(&key)?;
        let temp = self.temp_path(&key);

        if let Err(e) = tokio::fs::write(&temp, &data).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(e.into());
        }

        debug!("Disk cache write complete");
        Ok(())
    }
}

impl ImageStore for DiskImageStore {
    fn read(&self, key: &str) -> BoxFuture<'_, Result<Option<Bytes>, CacheError>> {
        Box::pin(self.read_entry(key.to_string()))
    }

    fn write(&self, key: &str, data: Bytes) -> BoxFuture<'_, Result<(), CacheError>> {
        Box::pin(self.write_entry(key.to_string(), data))
    }
}

/// Summary of a cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskCacheStats {
    /// Number of cached images.
    pub files: u64,
    /// Total size of cached images in bytes.
    pub bytes: u64,
}

/// Counts cached images and their total size.
///
/// Temporary files from in-progress writes are ignored.
pub fn disk_cache_stats(directory: &Path) -> std::io::Result<DiskCacheStats> {
    let mut stats = DiskCacheStats::default();
    for entry in std::fs::read_dir(directory)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        if !metadata.is_file() || !is_valid_key(&entry.file_name().to_string_lossy()) {
            continue;
        }
        stats.files += 1;
        stats.bytes += metadata.len();
    }
    Ok(stats)
}
