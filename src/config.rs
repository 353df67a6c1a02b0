//! Application configuration loaded from environment variables.
//!
//! Configuration is loaded once at startup, validated, and then passed
//! explicitly into the storage factory and services.
//!
//! ## Storage
//!
//! ```bash
//! export STORAGE_BUCKET="my-links"            # or MOCKED / MEMORY
//! export STORAGE_CREDENTIALS='{"access_key_id":"...","secret_access_key":"..."}'
//! # or, base64-encoded:
//! export STORAGE_CREDENTIALS="base64:eyJhY2Nlc3Nfa2V5X2lkIjoi..."
//! # or a file:
//! export STORAGE_CREDENTIALS_FILE="/run/secrets/storage.json"
//! ```
//!
//! Inline credentials take precedence over the file. With neither set the
//! AWS default provider chain is used.
//!
//! ## Required Variables
//!
//! - `STORAGE_BUCKET`
//!
//! ## Optional Variables
//!
//! - `LISTEN` - Bind address (default: `0.0.0.0:3000`)
//! - `PUBLIC_ORIGIN` - Origin used when composing short URLs (default: `http://localhost:3000`)
//! - `ALLOWED_URL_PREFIX` - Only accept and return long URLs with this prefix (default: disabled)
//! - `STORAGE_REGION`, `STORAGE_ENDPOINT`, `STORAGE_FORCE_PATH_STYLE` - S3 client overrides
//! - `STORAGE_TIMEOUT_SECS` - Deadline for every storage call (default: 10)
//! - `RUST_LOG` - Log level (default: `info`)
//! - `LOG_FORMAT` - Log format: `text` or `json` (default: `text`)

use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

/// Settings consumed by [`crate::infrastructure::storage::build_store`].
#[derive(Clone, Default)]
pub struct StorageSettings {
    /// Bucket name, or the `MOCKED` / `MEMORY` sentinel.
    pub bucket: Option<String>,
    /// Inline JSON credentials, optionally prefixed with `base64:`.
    pub credentials: Option<String>,
    /// Path to a JSON credentials file. Ignored when `credentials` is set.
    pub credentials_file: Option<PathBuf>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    /// Path-style bucket addressing, needed by MinIO and similar services.
    pub force_path_style: bool,
}

impl std::fmt::Debug for StorageSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageSettings")
            .field("bucket", &self.bucket)
            .field("credentials", &self.credentials.as_ref().map(|_| "***"))
            .field("credentials_file", &self.credentials_file)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("force_path_style", &self.force_path_style)
            .finish()
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub listen_addr: String,
    /// Fixed origin prepended to `/s/<token>` in short URLs.
    pub public_origin: String,
    pub log_level: String,
    pub log_format: String,
    /// When set, long URLs must start with this prefix on shorten and expand.
    pub allowed_url_prefix: Option<String>,
    /// Deadline in seconds applied to each storage call.
    pub storage_timeout_secs: u64,
    pub storage: StorageSettings,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let listen_addr = env::var("LISTEN").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let public_origin =
            env::var("PUBLIC_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".to_string());
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

        let allowed_url_prefix = non_empty_var("ALLOWED_URL_PREFIX");

        let storage_timeout_secs = match env::var("STORAGE_TIMEOUT_SECS") {
            Ok(v) => v
                .parse()
                .with_context(|| format!("STORAGE_TIMEOUT_SECS must be an integer, got '{}'", v))?,
            Err(_) => 10,
        };

        Ok(Self {
            listen_addr,
            public_origin,
            log_level,
            log_format,
            allowed_url_prefix,
            storage_timeout_secs,
            storage: Self::load_storage_settings(),
        })
    }

    /// Loads the storage section.
    fn load_storage_settings() -> StorageSettings {
        let force_path_style = env::var("STORAGE_FORCE_PATH_STYLE")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        StorageSettings {
            bucket: non_empty_var("STORAGE_BUCKET"),
            credentials: non_empty_var("STORAGE_CREDENTIALS"),
            credentials_file: non_empty_var("STORAGE_CREDENTIALS_FILE").map(PathBuf::from),
            region: non_empty_var("STORAGE_REGION"),
            endpoint: non_empty_var("STORAGE_ENDPOINT"),
            force_path_style,
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `STORAGE_BUCKET` is missing
    /// - `log_format` is not `text` or `json`
    /// - `listen_addr` is invalid
    /// - `public_origin` is not an absolute http(s) URL
    /// - `storage_timeout_secs` is zero
    pub fn validate(&self) -> Result<()> {
        if self.storage.bucket.is_none() {
            anyhow::bail!("STORAGE_BUCKET must be set (use MOCKED to run without storage)");
        }

        if self.log_format != "text" && self.log_format != "json" {
            anyhow::bail!(
                "LOG_FORMAT must be 'text' or 'json', got '{}'",
                self.log_format
            );
        }

        if !self.listen_addr.contains(':') {
            anyhow::bail!(
                "LISTEN must be in format 'host:port', got '{}'",
                self.listen_addr
            );
        }

        let origin = url::Url::parse(&self.public_origin).with_context(|| {
            format!(
                "PUBLIC_ORIGIN is not a valid URL: '{}'",
                self.public_origin
            )
        })?;
        if !matches!(origin.scheme(), "http" | "https") {
            anyhow::bail!(
                "PUBLIC_ORIGIN must use http or https, got '{}'",
                self.public_origin
            );
        }

        if self.storage_timeout_secs == 0 {
            anyhow::bail!("STORAGE_TIMEOUT_SECS must be greater than 0");
        }

        Ok(())
    }

    /// Prints configuration summary (without sensitive data).
    pub fn print_summary(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Listen address: {}", self.listen_addr);
        tracing::info!("  Public origin: {}", self.public_origin);
        tracing::info!(
            "  Storage bucket: {}",
            self.storage.bucket.as_deref().unwrap_or("<unset>")
        );
        tracing::info!(
            "  Storage credentials: {}",
            credentials_source(&self.storage)
        );
        if let Some(ref endpoint) = self.storage.endpoint {
            tracing::info!("  Storage endpoint: {}", endpoint);
        }
        tracing::info!("  Storage timeout: {}s", self.storage_timeout_secs);
        match self.allowed_url_prefix {
            Some(ref prefix) => tracing::info!("  Allowed URL prefix: {}", prefix),
            None => tracing::info!("  Allowed URL prefix: disabled"),
        }
        tracing::info!("  Log level: {}", self.log_level);
        tracing::info!("  Log format: {}", self.log_format);
    }
}

/// Describes where credentials come from without revealing them.
fn credentials_source(storage: &StorageSettings) -> String {
    match (&storage.credentials, &storage.credentials_file) {
        (Some(inline), _) if inline.starts_with("base64:") => "inline (base64)".to_string(),
        (Some(_), _) => "inline".to_string(),
        (None, Some(path)) => format!("file {}", path.display()),
        (None, None) => "default provider chain".to_string(),
    }
}

/// Reads a variable, treating empty values as unset.
fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Loads and validates configuration from environment variables.
///
/// # Errors
///
/// Returns an error if required variables are missing or validation fails.
///
/// # Note
///
/// This function expects environment variables to be already loaded
/// (e.g., via `dotenvy::dotenv()` in `main.rs`).
pub fn load_from_env() -> Result<Config> {
    let config = Config::from_env()?;
    config.validate()?;
    Ok(config)
}
