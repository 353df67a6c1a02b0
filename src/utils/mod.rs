//! Small self-contained helpers.
//!
//! - [`base32`] - Unpadded RFC 4648 encoding used for tokens
//! - [`url_policy`] - Optional allowed-prefix check for long URLs

pub mod base32;
pub mod url_policy;
