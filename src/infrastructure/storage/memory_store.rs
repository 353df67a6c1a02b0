//! In-process storage backend backed by a concurrent map.

use super::BACKEND_MEMORY;
use crate::domain::repositories::{MappingStore, ObjectSink, StoreError, StoreResult};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Stores records in memory for the lifetime of the process.
///
/// Unlike [`super::MockStore`], reads return what was written, so
/// shorten/expand round-trips work without network access. DashMap shards
/// its locks, so concurrent requests on distinct keys do not contend.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<DashMap<String, Bytes>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        debug!("Using MemoryStore (records are lost on restart)");
        Self::default()
    }

    /// Number of committed objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Buffers writes and inserts the object on commit.
struct MemorySink {
    objects: Arc<DashMap<String, Bytes>>,
    key: String,
    buffer: BytesMut,
}

#[async_trait]
impl ObjectSink for MemorySink {
    fn write(&mut self, chunk: &[u8]) -> StoreResult<()> {
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemorySink {
            objects,
            key,
            buffer,
        } = *self;
        objects.insert(key, buffer.freeze());
        Ok(())
    }
}

#[async_trait]
impl MappingStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn write_stream(
        &self,
        key: &str,
        _pre_compressed: bool,
    ) -> StoreResult<Box<dyn ObjectSink>> {
        Ok(Box::new(MemorySink {
            objects: Arc::clone(&self.objects),
            key: key.to_string(),
            buffer: BytesMut::new(),
        }))
    }

    async fn post_upload_url(&self, _key: &str, _origin: &str) -> StoreResult<String> {
        Err(StoreError::Unsupported {
            backend: BACKEND_MEMORY,
            operation: "post_upload_url",
        })
    }

    async fn read_file(&self, key: &str) -> StoreResult<Bytes> {
        self.objects
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn delete_file(&self, key: &str) -> StoreResult<()> {
        self.objects.remove(key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_MEMORY
    }
}
