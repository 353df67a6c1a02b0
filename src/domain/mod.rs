//! Domain layer: link tokens and the storage contract.
//!
//! # Architecture
//!
//! - [`token`] - Token generation and parsing
//! - [`repositories`] - The [`repositories::MappingStore`] trait and its error type
//!
//! The domain layer has no dependency on a concrete storage service.
//! Backends live in [`crate::infrastructure::storage`] and orchestration in
//! [`crate::application::services`].

pub mod repositories;
pub mod token;

pub use token::{KEY_SUFFIX, TOKEN_BYTES, TOKEN_LEN, Token, TokenError};
