#![allow(dead_code)]

use async_trait::async_trait;
use bucket_shortener::domain::repositories::{MappingStore, ObjectSink, StoreError, StoreResult};
use bucket_shortener::infrastructure::storage::{MemoryStore, MockStore};
use bucket_shortener::state::AppState;
use bytes::Bytes;
use std::sync::Arc;

pub const ORIGIN: &str = "https://sho.rt";

/// State backed by an in-memory store, returning the store for inspection.
pub fn create_memory_state() -> (AppState, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::with_store(Arc::new(store.clone()), ORIGIN);
    (state, store)
}

/// State backed by the discarding mock store.
pub fn create_mocked_state() -> AppState {
    AppState::with_store(Arc::new(MockStore::new()), ORIGIN)
}

/// State backed by a store that refuses every call.
pub fn create_unavailable_state() -> AppState {
    AppState::with_store(Arc::new(UnavailableStore), ORIGIN)
}

/// Extracts the token from a short URL produced by the service.
pub fn token_of(short_url: &str) -> &str {
    short_url
        .strip_prefix(&format!("{}/s/", ORIGIN))
        .expect("short URL should start with the service origin")
}

/// Backend whose network is down.
pub struct UnavailableStore;

#[async_trait]
impl MappingStore for UnavailableStore {
    async fn ping(&self) -> StoreResult<()> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    async fn write_stream(
        &self,
        _key: &str,
        _pre_compressed: bool,
    ) -> StoreResult<Box<dyn ObjectSink>> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    async fn post_upload_url(&self, _key: &str, _origin: &str) -> StoreResult<String> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    async fn read_file(&self, _key: &str) -> StoreResult<Bytes> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    async fn delete_file(&self, _key: &str) -> StoreResult<()> {
        Err(StoreError::Transport("connection refused".to_string()))
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}
