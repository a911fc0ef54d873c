//! Core traits for the image cache store.
//!
//! The `ImageStore` trait is a minimal key-value interface over rendered
//! images. Keys are canonical image filenames; values are encoded bytes.
//!
//! # Design Principles
//!
//! - **String keys**: the canonical filename, readable in logs and on disk
//! - **Bytes values**: encoded images, cheap to clone and fan out
//! - **Minimal interface**: read and write only; entries are never evicted
//! - **Dyn-compatible**: uses `Pin<Box<dyn Future>>` for trait object support

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use thiserror::Error;

/// Errors that can occur during cache store operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// I/O error while reading or writing an entry.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used as a flat filename.
    #[error("Invalid cache key: {0:?}")]
    InvalidKey(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Persistent storage for rendered images.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync` for use across async tasks.
///
/// # Dyn Compatibility
///
/// Async methods return [`BoxFuture`] so the service can hold an
/// `Arc<dyn ImageStore>` and tests can substitute their own stores.
pub trait ImageStore: Send + Sync {
    /// Retrieve an entry.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(data))` if the entry exists
    /// - `Ok(None)` if the entry is absent
    /// - `Err(_)` for any other failure
    fn read(&self, key: &str) -> BoxFuture<'_, Result<Option<Bytes>, CacheError>>;

    /// Store an entry, replacing any previous value.
    ///
    /// Writes for the same key always carry the same bytes, so concurrent
    /// writers may race harmlessly.
    fn write(&self, key: &str, data: Bytes) -> BoxFuture<'_, Result<(), CacheError>>;
}

/// Returns true if `key` is a single, plain path component.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && !key.starts_with('.')
        && !key.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let cache_err: CacheError = io_err.into();
        assert!(matches!(cache_err, CacheError::Io(_)));
        assert!(cache_err.to_string().contains("denied"));
    }

    #[test]
    fn test_valid_keys() {
        assert!(is_valid_key("ui-icons_ffffff_256x240.png"));
        assert!(is_valid_key("ui-bg_glass_55_fbf9ee_1x400.png"));
    }

    #[test]
    fn test_invalid_keys() {
        for key in ["", ".", "..", ".hidden", "a/b.png", "..\\x.png", "nul\0.png"] {
            assert!(!is_valid_key(key), "{key:?} should be rejected");
        }
    }
}
