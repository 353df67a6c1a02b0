//! Application layer services implementing business logic.
//!
//! Services consume the storage trait and provide a clean API for HTTP
//! handlers and the CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Shorten and expand links

pub mod services;
