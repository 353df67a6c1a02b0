//! # Bucket Shortener
//!
//! A URL shortener that keeps every link as a small object in an
//! S3-compatible bucket.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Tokens and the storage trait
//! - **Application Layer** ([`application`]) - Shorten/expand orchestration
//! - **Infrastructure Layer** ([`infrastructure`]) - S3, mock and in-memory storage
//! - **API Layer** ([`api`]) - REST handlers, DTOs, and middleware
//!
//! ## How links are stored
//!
//! Shortening draws 24 random bytes, encodes them as a 39-character base32
//! token, and writes the long URL verbatim to `<token>.url`. Expanding takes
//! the last path segment of a short URL, checks it is a well-formed token,
//! and reads the object back.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run without any storage credentials (writes are discarded)
//! export STORAGE_BUCKET=MOCKED
//! cargo run
//!
//! # Against a real bucket
//! export STORAGE_BUCKET=my-links
//! export STORAGE_CREDENTIALS_FILE=/run/secrets/storage.json
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;
pub mod utils;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::{LinkError, LinkService};
    pub use crate::domain::repositories::{MappingStore, StoreError};
    pub use crate::domain::{TOKEN_LEN, Token};
    pub use crate::error::AppError;
    pub use crate::infrastructure::storage::{MemoryStore, MockStore, S3Store};
    pub use crate::state::AppState;
}
