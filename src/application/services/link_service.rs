//! Shorten and expand orchestration.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::domain::repositories::{MappingStore, StoreError, StoreResult};
use crate::domain::{Token, TokenError};
use crate::utils::url_policy::UrlPolicy;
use tracing::{debug, info, warn};

/// Default deadline for a single storage call.
pub const DEFAULT_STORAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Path prefix under which short URLs are served.
pub const SHORT_PATH_PREFIX: &str = "/s/";

/// Errors returned by [`LinkService`].
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Long URL must not be empty")]
    MissingUrl,

    #[error("URL is outside the allowed prefix {prefix}")]
    DisallowedUrl { prefix: String },

    #[error("Invalid token: {0}")]
    InvalidToken(TokenError),

    #[error("No link stored for token {0}")]
    NotFound(String),

    #[error("Stored record {0} is not valid UTF-8")]
    CorruptRecord(String),

    #[error("Storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Secure random source failed: {0}")]
    Entropy(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl LinkError {
    /// Returns true if the failure was caused by the caller's input rather
    /// than by the storage backend.
    pub fn is_client_error(&self) -> bool {
        match self {
            Self::MissingUrl
            | Self::DisallowedUrl { .. }
            | Self::InvalidToken(_)
            | Self::NotFound(_) => true,
            Self::Storage(StoreError::InvalidInput(_)) => true,
            _ => false,
        }
    }
}

impl From<TokenError> for LinkError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Entropy(reason) => Self::Entropy(reason),
            other => Self::InvalidToken(other),
        }
    }
}

/// Service turning long URLs into short ones and back.
///
/// Stateless between calls: every record lives in the injected
/// [`MappingStore`]. Tokens are random and never checked for existence, so
/// a collision would silently overwrite (last write wins).
pub struct LinkService {
    store: Arc<dyn MappingStore>,
    public_origin: String,
    url_policy: UrlPolicy,
    timeout: Duration,
}

impl LinkService {
    /// Creates a link service with no URL policy and the default deadline.
    pub fn new(store: Arc<dyn MappingStore>, public_origin: impl Into<String>) -> Self {
        let public_origin = public_origin.into().trim_end_matches('/').to_string();
        Self {
            store,
            public_origin,
            url_policy: UrlPolicy::disabled(),
            timeout: DEFAULT_STORAGE_TIMEOUT,
        }
    }

    /// Creates a link service configured from [`Config`].
    pub fn from_config(store: Arc<dyn MappingStore>, config: &Config) -> Self {
        Self::new(store, config.public_origin.clone())
            .with_url_policy(UrlPolicy::from_option(config.allowed_url_prefix.clone()))
            .with_timeout(Duration::from_secs(config.storage_timeout_secs))
    }

    pub fn with_url_policy(mut self, url_policy: UrlPolicy) -> Self {
        self.url_policy = url_policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Stores `long_url` under a fresh token and returns its short URL.
    ///
    /// The write completes before this returns; nothing is written in the
    /// background.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::MissingUrl`] for an empty URL,
    /// [`LinkError::DisallowedUrl`] if the prefix policy rejects it,
    /// [`LinkError::Timeout`] if storage exceeds the deadline, and
    /// [`LinkError::Storage`] on backend failures.
    pub async fn shorten(&self, long_url: &str) -> Result<String, LinkError> {
        if long_url.trim().is_empty() {
            return Err(LinkError::MissingUrl);
        }
        self.check_policy(long_url)?;

        let token = Token::generate()?;
        let key = token.storage_key();

        self.with_deadline(async {
            let mut sink = self.store.write_stream(&key, false).await?;
            sink.write(long_url.as_bytes())?;
            sink.commit().await
        })
        .await?;

        info!(token = %token, backend = self.store.backend_name(), "Link created");
        Ok(self.short_url(&token))
    }

    /// Resolves a short URL, `/s/<token>` path or bare token to its long URL.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidToken`] without touching storage if the
    /// final path segment is not a well-formed token, and
    /// [`LinkError::NotFound`] if no record exists for it.
    pub async fn expand(&self, short_url: &str) -> Result<String, LinkError> {
        let token = Token::from_short_url(short_url)?;
        let key = token.storage_key();

        let body = self
            .with_deadline(self.store.read_file(&key))
            .await
            .map_err(|err| match err {
                LinkError::Storage(StoreError::NotFound(_)) => {
                    LinkError::NotFound(token.to_string())
                }
                other => other,
            })?;

        let long_url =
            String::from_utf8(body.to_vec()).map_err(|_| LinkError::CorruptRecord(key.clone()))?;

        if let Err(err) = self.check_policy(&long_url) {
            warn!(token = %token, "Refusing to expand link outside allowed prefix");
            return Err(err);
        }

        debug!(token = %token, "Link expanded");
        Ok(long_url)
    }

    /// Deletes the record behind a short URL or token.
    pub async fn delete(&self, short_url: &str) -> Result<(), LinkError> {
        let token = Token::from_short_url(short_url)?;
        self.with_deadline(self.store.delete_file(&token.storage_key()))
            .await?;

        info!(token = %token, "Link deleted");
        Ok(())
    }

    /// Signs a direct upload URL for `key`, valid for 15 minutes.
    pub async fn upload_url(&self, key: &str, origin: &str) -> Result<String, LinkError> {
        self.with_deadline(self.store.post_upload_url(key, origin))
            .await
    }

    /// Checks that the storage backend is reachable.
    pub async fn ping(&self) -> Result<(), LinkError> {
        self.with_deadline(self.store.ping()).await
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    /// Composes `<origin>/s/<token>`.
    pub fn short_url(&self, token: &Token) -> String {
        format!("{}{}{}", self.public_origin, SHORT_PATH_PREFIX, token)
    }

    fn check_policy(&self, url: &str) -> Result<(), LinkError> {
        if self.url_policy.allows(url) {
            return Ok(());
        }

        Err(LinkError::DisallowedUrl {
            prefix: self.url_policy.prefix().unwrap_or_default().to_string(),
        })
    }

    /// Runs a storage call under the configured deadline. A call that misses
    /// the deadline is dropped, which also discards any uncommitted sink.
    async fn with_deadline<T, F>(&self, op: F) -> Result<T, LinkError>
    where
        F: Future<Output = StoreResult<T>>,
    {
        match tokio::time::timeout(self.timeout, op).await {
            Ok(result) => result.map_err(LinkError::from),
            Err(_) => {
                warn!(timeout = ?self.timeout, "Storage operation timed out");
                Err(LinkError::Timeout(self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TOKEN_LEN;
    use crate::domain::repositories::{MockMappingStore, ObjectSink};
    use crate::infrastructure::storage::{MemoryStore, MockStore};
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    const ORIGIN: &str = "https://sho.rt";

    /// Sink that records committed bytes into a shared buffer.
    struct RecordingSink {
        pending: Vec<u8>,
        committed: Arc<Mutex<Option<Vec<u8>>>>,
    }

    #[async_trait]
    impl ObjectSink for RecordingSink {
        fn write(&mut self, chunk: &[u8]) -> StoreResult<()> {
            self.pending.extend_from_slice(chunk);
            Ok(())
        }

        async fn commit(self: Box<Self>) -> StoreResult<()> {
            let RecordingSink { pending, committed } = *self;
            *committed.lock().unwrap() = Some(pending);
            Ok(())
        }
    }

    /// Store whose every operation hangs far past any deadline.
    struct StalledStore;

    #[async_trait]
    impl MappingStore for StalledStore {
        async fn ping(&self) -> StoreResult<()> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }

        async fn write_stream(
            &self,
            _key: &str,
            _pre_compressed: bool,
        ) -> StoreResult<Box<dyn ObjectSink>> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(StoreError::Transport("unreachable".to_string()))
        }

        async fn post_upload_url(&self, _key: &str, _origin: &str) -> StoreResult<String> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(StoreError::Transport("unreachable".to_string()))
        }

        async fn read_file(&self, _key: &str) -> StoreResult<Bytes> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Bytes::new())
        }

        async fn delete_file(&self, _key: &str) -> StoreResult<()> {
            Ok(())
        }

        fn backend_name(&self) -> &'static str {
            "stalled"
        }
    }

    fn valid_token() -> String {
        "A".repeat(TOKEN_LEN)
    }

    #[tokio::test]
    async fn test_shorten_writes_raw_url_under_token_key() {
        let committed = Arc::new(Mutex::new(None));
        let captured_key = Arc::new(Mutex::new(String::new()));

        let mut store = MockMappingStore::new();
        let committed_clone = committed.clone();
        let key_clone = captured_key.clone();
        store
            .expect_write_stream()
            .withf(|key, pre_compressed| key.ends_with(".url") && !*pre_compressed)
            .times(1)
            .returning(move |key, _| {
                *key_clone.lock().unwrap() = key.to_string();
                let sink: Box<dyn ObjectSink> = Box::new(RecordingSink {
                    pending: Vec::new(),
                    committed: committed_clone.clone(),
                });
                Ok(sink)
            });
        store.expect_backend_name().return_const("mock");

        let service = LinkService::new(Arc::new(store), ORIGIN);
        let short_url = service
            .shorten("https://example.com/report/123")
            .await
            .unwrap();

        let token = short_url.strip_prefix("https://sho.rt/s/").unwrap();
        assert_eq!(token.len(), TOKEN_LEN);
        assert_eq!(*captured_key.lock().unwrap(), format!("{}.url", token));
        assert_eq!(
            committed.lock().unwrap().as_deref(),
            Some(&b"https://example.com/report/123"[..])
        );
    }

    #[tokio::test]
    async fn test_shorten_rejects_empty_url_without_storage() {
        let mut store = MockMappingStore::new();
        store.expect_write_stream().times(0);

        let service = LinkService::new(Arc::new(store), ORIGIN);
        let err = service.shorten("   ").await.unwrap_err();

        assert!(matches!(err, LinkError::MissingUrl));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_shorten_surfaces_commit_failure() {
        struct FailingSink;

        #[async_trait]
        impl ObjectSink for FailingSink {
            fn write(&mut self, _chunk: &[u8]) -> StoreResult<()> {
                Ok(())
            }

            async fn commit(self: Box<Self>) -> StoreResult<()> {
                Err(StoreError::Transport("connection reset".to_string()))
            }
        }

        let mut store = MockMappingStore::new();
        store.expect_write_stream().returning(|_, _| {
            let sink: Box<dyn ObjectSink> = Box::new(FailingSink);
            Ok(sink)
        });

        let service = LinkService::new(Arc::new(store), ORIGIN);
        let err = service.shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, LinkError::Storage(StoreError::Transport(_))));
        assert!(!err.is_client_error());
    }

    #[tokio::test]
    async fn test_shorten_respects_url_policy() {
        let mut store = MockMappingStore::new();
        store.expect_write_stream().times(0);

        let service = LinkService::new(Arc::new(store), ORIGIN)
            .with_url_policy(UrlPolicy::with_prefix("https://app.example.com/"));

        let err = service.shorten("https://elsewhere.net/").await.unwrap_err();
        assert!(matches!(err, LinkError::DisallowedUrl { .. }));
    }

    #[tokio::test]
    async fn test_expand_invalid_length_skips_storage() {
        let mut store = MockMappingStore::new();
        store.expect_read_file().times(0);

        let service = LinkService::new(Arc::new(store), ORIGIN);
        let err = service.expand("https://sho.rt/s/short").await.unwrap_err();

        assert!(matches!(
            err,
            LinkError::InvalidToken(TokenError::InvalidLength { actual: 5, .. })
        ));
    }

    #[tokio::test]
    async fn test_expand_reads_token_key() {
        let mut store = MockMappingStore::new();
        let expected_key = format!("{}.url", valid_token());
        store
            .expect_read_file()
            .withf(move |key| key.to_string() == expected_key)
            .times(1)
            .returning(|_| Ok(Bytes::from_static(b"https://example.com/target")));

        let service = LinkService::new(Arc::new(store), ORIGIN);
        let long_url = service
            .expand(&format!("https://sho.rt/s/{}", valid_token()))
            .await
            .unwrap();

        assert_eq!(long_url, "https://example.com/target");
    }

    #[tokio::test]
    async fn test_expand_missing_object_is_not_found() {
        let mut store = MockMappingStore::new();
        store
            .expect_read_file()
            .returning(|key| Err(StoreError::NotFound(key.to_string())));

        let service = LinkService::new(Arc::new(store), ORIGIN);
        let err = service.expand(&valid_token()).await.unwrap_err();

        assert!(matches!(err, LinkError::NotFound(ref token) if *token == valid_token()));
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn test_expand_non_utf8_record_is_corrupt() {
        let mut store = MockMappingStore::new();
        store
            .expect_read_file()
            .returning(|_| Ok(Bytes::from_static(&[0xff, 0xfe])));

        let service = LinkService::new(Arc::new(store), ORIGIN);
        let err = service.expand(&valid_token()).await.unwrap_err();

        assert!(matches!(err, LinkError::CorruptRecord(_)));
    }

    #[tokio::test]
    async fn test_expand_applies_url_policy_to_result() {
        let mut store = MockMappingStore::new();
        store
            .expect_read_file()
            .returning(|_| Ok(Bytes::from_static(b"https://third-party.example/")));

        let service = LinkService::new(Arc::new(store), ORIGIN)
            .with_url_policy(UrlPolicy::with_prefix("https://app.example.com/"));
        let err = service.expand(&valid_token()).await.unwrap_err();

        assert!(matches!(err, LinkError::DisallowedUrl { .. }));
    }

    #[tokio::test]
    async fn test_round_trip_with_memory_store() {
        let service = LinkService::new(Arc::new(MemoryStore::new()), ORIGIN);

        let short_url = service
            .shorten("https://example.com/report/123")
            .await
            .unwrap();
        let long_url = service.expand(&short_url).await.unwrap();

        assert_eq!(long_url, "https://example.com/report/123");
    }

    #[tokio::test]
    async fn test_each_shorten_gets_a_new_token() {
        let service = LinkService::new(Arc::new(MemoryStore::new()), ORIGIN);

        let first = service.shorten("https://example.com").await.unwrap();
        let second = service.shorten("https://example.com").await.unwrap();

        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_round_trip_with_mock_store_returns_empty() {
        let service = LinkService::new(Arc::new(MockStore::new()), ORIGIN);

        let short_url = service.shorten("https://example.com").await.unwrap();
        assert_eq!(service.expand(&short_url).await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_delete_then_expand_is_not_found() {
        let service = LinkService::new(Arc::new(MemoryStore::new()), ORIGIN);

        let short_url = service.shorten("https://example.com").await.unwrap();
        service.delete(&short_url).await.unwrap();

        let err = service.expand(&short_url).await.unwrap_err();
        assert!(matches!(err, LinkError::NotFound(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expand_times_out() {
        let service =
            LinkService::new(Arc::new(StalledStore), ORIGIN).with_timeout(Duration::from_secs(2));

        let err = service.expand(&valid_token()).await.unwrap_err();

        assert!(matches!(err, LinkError::Timeout(d) if d == Duration::from_secs(2)));
        assert!(!err.is_client_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_shorten_times_out() {
        let service =
            LinkService::new(Arc::new(StalledStore), ORIGIN).with_timeout(Duration::from_secs(2));

        let err = service.shorten("https://example.com").await.unwrap_err();
        assert!(matches!(err, LinkError::Timeout(_)));
    }

    #[test]
    fn test_short_url_trims_trailing_slash_on_origin() {
        let service = LinkService::new(Arc::new(MockStore::new()), "https://sho.rt/");
        let token = Token::parse(&valid_token()).unwrap();

        assert_eq!(
            service.short_url(&token),
            format!("https://sho.rt/s/{}", valid_token())
        );
    }

    #[test]
    fn test_entropy_failure_is_not_a_client_error() {
        let err = LinkError::from(TokenError::Entropy("no entropy".to_string()));
        assert!(matches!(err, LinkError::Entropy(_)));
        assert!(!err.is_client_error());
    }
}
