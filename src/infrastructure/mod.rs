//! Infrastructure layer for external integrations.
//!
//! Implements the storage contract defined by the domain layer.
//!
//! # Modules
//!
//! - [`storage`] - S3, mock and in-memory [`crate::domain::repositories::MappingStore`] backends

pub mod storage;
