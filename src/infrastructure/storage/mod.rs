//! Object storage backends for link records.
//!
//! Provides three [`MappingStore`] implementations:
//! - [`S3Store`] - Production S3-compatible bucket
//! - [`MockStore`] - Discards writes and returns empty reads, for offline runs
//! - [`MemoryStore`] - In-process map honouring read-after-write
//!
//! The backend is chosen once at startup by [`build_store`] from the bucket
//! setting.

mod credentials;
mod memory_store;
mod mock_store;
mod s3_store;

pub use credentials::{BASE64_PREFIX, StorageCredentials};
pub use memory_store::MemoryStore;
pub use mock_store::{DiscardSink, MockStore};
pub use s3_store::S3Store;

use crate::config::StorageSettings;
use crate::domain::repositories::{MappingStore, StoreError, StoreResult};
use std::sync::Arc;
use tracing::info;

/// Bucket value selecting [`MockStore`].
pub const MOCKED_BUCKET: &str = "MOCKED";

/// Bucket value selecting [`MemoryStore`].
pub const MEMORY_BUCKET: &str = "MEMORY";

pub const BACKEND_S3: &str = "s3";
pub const BACKEND_MOCKED: &str = "mocked";
pub const BACKEND_MEMORY: &str = "memory";

/// Instantiates the storage backend described by `settings`.
///
/// # Selection
///
/// - `MOCKED` - [`MockStore`]
/// - `MEMORY` - [`MemoryStore`]
/// - any other bucket name - [`S3Store`] bound to that bucket
///
/// # Errors
///
/// Returns [`StoreError::Configuration`] if no bucket is configured or the
/// credentials cannot be resolved. Reachability is not checked here; call
/// [`MappingStore::ping`] for that.
pub async fn build_store(settings: &StorageSettings) -> StoreResult<Arc<dyn MappingStore>> {
    let bucket = settings
        .bucket
        .as_deref()
        .map(str::trim)
        .filter(|bucket| !bucket.is_empty())
        .ok_or_else(|| StoreError::Configuration("STORAGE_BUCKET must be set".to_string()))?;

    match bucket {
        MOCKED_BUCKET => {
            info!("Storage backend: mocked (writes are discarded)");
            Ok(Arc::new(MockStore::new()))
        }
        MEMORY_BUCKET => {
            info!("Storage backend: in-memory");
            Ok(Arc::new(MemoryStore::new()))
        }
        bucket => {
            let credentials = StorageCredentials::resolve(
                settings.credentials.as_deref(),
                settings.credentials_file.as_deref(),
            )?;
            info!(
                "Storage backend: s3 bucket '{}' ({} credentials)",
                bucket,
                if credentials.is_some() {
                    "static"
                } else {
                    "default chain"
                }
            );

            Ok(Arc::new(
                S3Store::connect(bucket, settings, credentials).await,
            ))
        }
    }
}
