//! Storage trait definitions for the domain layer.
//!
//! [`MappingStore`] is the contract implemented by the backends in
//! `crate::infrastructure::storage`. A mock implementation is generated via
//! `mockall` for service tests.

pub mod mapping_store;

pub use mapping_store::{
    MappingStore, ObjectSink, StoreError, StoreResult, WriteOptions, CACHE_CONTROL,
    COMPRESSED_ENCODING, CONTENT_TYPE, UPLOAD_URL_TTL_SECS,
};

#[cfg(test)]
pub use mapping_store::MockMappingStore;
