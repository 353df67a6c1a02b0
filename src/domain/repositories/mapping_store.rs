//! Storage abstraction for token → URL records.

use async_trait::async_trait;
use bytes::Bytes;

/// Content type stored on every record object.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Records are write-once, so objects can be cached indefinitely.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Content encoding tagged on objects the caller has already compressed.
pub const COMPRESSED_ENCODING: &str = "gzip";

/// Lifetime of a signed direct-upload URL.
pub const UPLOAD_URL_TTL_SECS: u64 = 15 * 60;

/// Errors raised by [`MappingStore`] implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage configuration error: {0}")]
    Configuration(String),

    #[error("Storage transport error: {0}")]
    Transport(String),

    #[error("Invalid storage request: {0}")]
    InvalidInput(String),

    #[error("{operation} is not supported by the {backend} storage backend")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Object metadata applied when a sink is committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    pub content_type: &'static str,
    pub cache_control: &'static str,
    pub content_encoding: Option<&'static str>,
}

impl WriteOptions {
    /// Metadata for a record object. The write path never compresses; it
    /// only tags the object when the caller says the bytes already are.
    pub fn for_record(pre_compressed: bool) -> Self {
        Self {
            content_type: CONTENT_TYPE,
            cache_control: CACHE_CONTROL,
            content_encoding: pre_compressed.then_some(COMPRESSED_ENCODING),
        }
    }
}

/// Write-once destination for a single object.
///
/// Bytes become visible only after [`ObjectSink::commit`] succeeds. Dropping a
/// sink without committing discards everything written to it, so every exit
/// path (errors and cancelled futures included) ends in either a commit or a
/// discard.
#[async_trait]
pub trait ObjectSink: Send {
    /// Appends a chunk to the pending object.
    fn write(&mut self, chunk: &[u8]) -> StoreResult<()>;

    /// Persists the pending object and consumes the sink.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}

/// Key/value object store holding link records.
///
/// Selected once at startup by [`crate::infrastructure::storage::build_store`]
/// and shared as `Arc<dyn MappingStore>` across concurrent requests.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::S3Store`] - S3-compatible bucket
/// - [`crate::infrastructure::storage::MockStore`] - discards writes, empty reads
/// - [`crate::infrastructure::storage::MemoryStore`] - in-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Checks that the backing store is reachable and the bucket exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Configuration`] if the bucket is missing and
    /// [`StoreError::Transport`] if the service cannot be reached.
    async fn ping(&self) -> StoreResult<()>;

    /// Opens a write-once sink for `key`.
    async fn write_stream(
        &self,
        key: &str,
        pre_compressed: bool,
    ) -> StoreResult<Box<dyn ObjectSink>>;

    /// Returns a signed URL allowing a client to upload `key` directly.
    ///
    /// The URL expires after [`UPLOAD_URL_TTL_SECS`] and only accepts
    /// [`CONTENT_TYPE`] bodies.
    async fn post_upload_url(&self, key: &str, origin: &str) -> StoreResult<String>;

    /// Reads the full contents of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the object does not exist.
    async fn read_file(&self, key: &str) -> StoreResult<Bytes>;

    /// Deletes `key`.
    async fn delete_file(&self, key: &str) -> StoreResult<()>;

    /// Short backend name for logs and health output.
    fn backend_name(&self) -> &'static str;
}
