//! Offline storage backend that persists nothing.

use super::BACKEND_MOCKED;
use crate::domain::repositories::{MappingStore, ObjectSink, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

/// A storage backend that accepts every operation without touching the network.
///
/// Writes are acknowledged and dropped, reads return an empty body. Lets the
/// service run without credentials; expanding a link created through this
/// backend yields an empty URL.
///
/// # Use Cases
///
/// - Local development without a bucket
/// - Tests that only exercise the write path
#[derive(Debug, Clone, Copy)]
pub struct MockStore;

impl MockStore {
    /// Creates a new MockStore instance.
    pub fn new() -> Self {
        debug!("Using MockStore (writes are discarded)");
        Self
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Sink that counts bytes and throws them away.
#[derive(Debug, Default)]
pub struct DiscardSink {
    written: usize,
}

#[async_trait]
impl ObjectSink for DiscardSink {
    fn write(&mut self, chunk: &[u8]) -> StoreResult<()> {
        self.written += chunk.len();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        debug!(bytes = self.written, "MockStore discarded write");
        Ok(())
    }
}

#[async_trait]
impl MappingStore for MockStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn write_stream(
        &self,
        _key: &str,
        _pre_compressed: bool,
    ) -> StoreResult<Box<dyn ObjectSink>> {
        Ok(Box::new(DiscardSink::default()))
    }

    async fn post_upload_url(&self, _key: &str, _origin: &str) -> StoreResult<String> {
        Err(StoreError::Unsupported {
            backend: BACKEND_MOCKED,
            operation: "post_upload_url",
        })
    }

    async fn read_file(&self, _key: &str) -> StoreResult<Bytes> {
        Ok(Bytes::new())
    }

    async fn delete_file(&self, _key: &str) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_MOCKED
    }
}
