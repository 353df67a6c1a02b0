//! S3-compatible object storage backend.

use super::BACKEND_S3;
use super::credentials::StorageCredentials;
use crate::config::StorageSettings;
use crate::domain::repositories::{
    CONTENT_TYPE, MappingStore, ObjectSink, StoreError, StoreResult, UPLOAD_URL_TTL_SECS,
    WriteOptions,
};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::{Bytes, BytesMut};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Provider name attached to statically configured credentials.
const CREDENTIALS_PROVIDER: &str = "bucket-shortener";

/// Storage backend bound to a single S3 bucket.
///
/// The SDK client is cheap to clone and safe to share, so one instance serves
/// every request.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Builds a client for `bucket` from settings and optional static credentials.
    ///
    /// Region and endpoint come from settings first, then from the credentials
    /// document, then from the AWS default chain. Without static credentials
    /// the default provider chain (environment, profile, instance role) is used.
    pub async fn connect(
        bucket: &str,
        settings: &StorageSettings,
        credentials: Option<StorageCredentials>,
    ) -> Self {
        let region = settings
            .region
            .clone()
            .or_else(|| credentials.as_ref().and_then(|c| c.region.clone()));
        let endpoint = settings
            .endpoint
            .clone()
            .or_else(|| credentials.as_ref().and_then(|c| c.endpoint.clone()));

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        if let Some(endpoint) = endpoint {
            info!("Using custom storage endpoint {}", endpoint);
            loader = loader.endpoint_url(endpoint);
        }
        if let Some(creds) = credentials {
            loader = loader.credentials_provider(Credentials::new(
                creds.access_key_id,
                creds.secret_access_key,
                creds.session_token,
                None,
                CREDENTIALS_PROVIDER,
            ));
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(settings.force_path_style)
            .build();

        Self::from_client(Client::from_conf(s3_config), bucket)
    }

    /// Wraps an existing SDK client.
    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Formats an SDK error with its full source chain.
fn transport<E, R>(err: SdkError<E, R>) -> StoreError
where
    E: std::error::Error + 'static,
    R: std::fmt::Debug,
{
    StoreError::Transport(DisplayErrorContext(&err).to_string())
}

/// Accepts only absolute http(s) origins such as `https://app.example.com`.
fn validate_origin(origin: &str) -> StoreResult<Url> {
    let url = Url::parse(origin)
        .map_err(|e| StoreError::InvalidInput(format!("Invalid origin '{}': {}", origin, e)))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(StoreError::InvalidInput(format!(
            "Origin must be an http(s) origin, got '{}'",
            origin
        )));
    }

    Ok(url)
}

/// Buffers a record and uploads it with a single `PutObject` on commit.
struct S3Sink {
    client: Client,
    bucket: String,
    key: String,
    options: WriteOptions,
    buffer: BytesMut,
    committed: bool,
}

#[async_trait]
impl ObjectSink for S3Sink {
    fn write(&mut self, chunk: &[u8]) -> StoreResult<()> {
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut this = *self;
        let body: Bytes = std::mem::take(&mut this.buffer).freeze();
        let size = body.len();

        this.client
            .put_object()
            .bucket(&this.bucket)
            .key(&this.key)
            .body(ByteStream::from(body))
            .content_type(this.options.content_type)
            .cache_control(this.options.cache_control)
            .set_content_encoding(this.options.content_encoding.map(str::to_string))
            .send()
            .await
            .map_err(transport)?;

        this.committed = true;
        debug!(key = %this.key, bytes = size, "Uploaded object");
        Ok(())
    }
}

impl Drop for S3Sink {
    fn drop(&mut self) {
        if !self.committed {
            debug!(key = %self.key, "Discarding uncommitted object");
        }
    }
}

#[async_trait]
impl MappingStore for S3Store {
    async fn ping(&self) -> StoreResult<()> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(()),
            Err(err) => {
                let missing = err.as_service_error().is_some_and(|e| e.is_not_found());
                if missing {
                    Err(StoreError::Configuration(format!(
                        "Bucket '{}' does not exist",
                        self.bucket
                    )))
                } else {
                    Err(transport(err))
                }
            }
        }
    }

    async fn write_stream(
        &self,
        key: &str,
        pre_compressed: bool,
    ) -> StoreResult<Box<dyn ObjectSink>> {
        Ok(Box::new(S3Sink {
            client: self.client.clone(),
            bucket: self.bucket.clone(),
            key: key.to_string(),
            options: WriteOptions::for_record(pre_compressed),
            buffer: BytesMut::new(),
            committed: false,
        }))
    }

    async fn post_upload_url(&self, key: &str, origin: &str) -> StoreResult<String> {
        let origin = validate_origin(origin)?;

        let presigning = PresigningConfig::expires_in(Duration::from_secs(UPLOAD_URL_TTL_SECS))
            .map_err(|e| StoreError::Configuration(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(CONTENT_TYPE)
            .presigned(presigning)
            .await
            .map_err(transport)?;

        debug!(key, origin = %origin, "Signed direct upload URL");
        Ok(request.uri().to_string())
    }

    async fn read_file(&self, key: &str) -> StoreResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| {
                let missing = err.as_service_error().is_some_and(|e| e.is_no_such_key());
                if missing {
                    StoreError::NotFound(key.to_string())
                } else {
                    transport(err)
                }
            })?;

        let body = output.body.collect().await.map_err(|e| {
            warn!(key, "Object body read failed: {}", e);
            StoreError::Transport(e.to_string())
        })?;

        Ok(body.into_bytes())
    }

    async fn delete_file(&self, key: &str) -> StoreResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(transport)?;

        debug!(key, "Deleted object");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        BACKEND_S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::{CACHE_CONTROL, COMPRESSED_ENCODING};
    use aws_sdk_s3::error::ErrorMetadata;
    use aws_sdk_s3::operation::get_object::{GetObjectError, GetObjectOutput};
    use aws_sdk_s3::operation::head_bucket::{HeadBucketError, HeadBucketOutput};
    use aws_sdk_s3::operation::put_object::PutObjectOutput;
    use aws_sdk_s3::types::error::{NoSuchKey, NotFound};
    use aws_smithy_mocks::{Rule, mock, mock_client};

    fn mocked_store(rule: &Rule) -> S3Store {
        S3Store::from_client(mock_client!(aws_sdk_s3, [rule]), "links")
    }

    fn access_denied() -> ErrorMetadata {
        ErrorMetadata::builder()
            .code("AccessDenied")
            .message("Access Denied")
            .build()
    }

    /// Client pointing at a closed local port; presigning never touches the network.
    fn offline_store() -> S3Store {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(Credentials::new("AKIDTEST", "secret", None, None, "test"))
            .endpoint_url("http://127.0.0.1:9")
            .force_path_style(true)
            .build();

        S3Store::from_client(Client::from_conf(config), "links")
    }

    #[tokio::test]
    async fn test_upload_url_is_scoped_and_time_limited() {
        let store = offline_store();

        let url = store
            .post_upload_url("ABC.url", "https://app.example.com")
            .await
            .unwrap();

        assert!(url.starts_with("http://127.0.0.1:9/links/ABC.url?"));
        assert!(url.contains("X-Amz-Expires=900"));
        assert!(url.contains("content-type"));
        assert!(url.contains("X-Amz-Signature="));
    }

    #[tokio::test]
    async fn test_upload_url_rejects_bad_origin() {
        let store = offline_store();

        let err = store
            .post_upload_url("ABC.url", "not an origin")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));

        let err = store
            .post_upload_url("ABC.url", "ftp://files.example.com")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_uncommitted_sink_is_discarded_without_network() {
        let store = offline_store();

        let mut sink = store.write_stream("ABC.url", false).await.unwrap();
        sink.write(b"https://example.com").unwrap();
        drop(sink);
    }

    #[test]
    fn test_validate_origin_accepts_http_and_https() {
        assert!(validate_origin("https://app.example.com").is_ok());
        assert!(validate_origin("http://localhost:5173").is_ok());
    }

    #[tokio::test]
    async fn test_commit_puts_plain_text_record() {
        let rule = mock!(Client::put_object)
            .match_requests(|req| {
                req.bucket() == Some("links")
                    && req.key() == Some("ABC.url")
                    && req.content_type() == Some(CONTENT_TYPE)
                    && req.cache_control() == Some(CACHE_CONTROL)
                    && req.content_encoding().is_none()
            })
            .then_output(|| PutObjectOutput::builder().build());
        let store = mocked_store(&rule);

        let mut sink = store.write_stream("ABC.url", false).await.unwrap();
        sink.write(b"https://example.com/report/123").unwrap();
        sink.commit().await.unwrap();

        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_commit_tags_pre_compressed_record() {
        let rule = mock!(Client::put_object)
            .match_requests(|req| {
                req.content_type() == Some(CONTENT_TYPE)
                    && req.cache_control() == Some(CACHE_CONTROL)
                    && req.content_encoding() == Some(COMPRESSED_ENCODING)
            })
            .then_output(|| PutObjectOutput::builder().build());
        let store = mocked_store(&rule);

        let mut sink = store.write_stream("ABC.url", true).await.unwrap();
        sink.write(&[0x1f, 0x8b, 0x08]).unwrap();
        sink.commit().await.unwrap();

        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_read_file_returns_body() {
        let rule = mock!(Client::get_object)
            .match_requests(|req| req.bucket() == Some("links") && req.key() == Some("ABC.url"))
            .then_output(|| {
                GetObjectOutput::builder()
                    .body(ByteStream::from_static(b"https://example.com"))
                    .build()
            });
        let store = mocked_store(&rule);

        let body = store.read_file("ABC.url").await.unwrap();
        assert_eq!(&body[..], b"https://example.com");
    }

    #[tokio::test]
    async fn test_read_missing_key_is_not_found() {
        let rule = mock!(Client::get_object)
            .then_error(|| GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        let store = mocked_store(&rule);

        let err = store.read_file("ABC.url").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(key) if key == "ABC.url"));
    }

    #[tokio::test]
    async fn test_read_other_failure_is_transport() {
        let rule =
            mock!(Client::get_object).then_error(|| GetObjectError::generic(access_denied()));
        let store = mocked_store(&rule);

        let err = store.read_file("ABC.url").await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    #[tokio::test]
    async fn test_expand_missing_record_is_not_found() {
        use crate::application::services::{LinkError, LinkService};
        use crate::domain::TOKEN_LEN;
        use std::sync::Arc;

        let rule = mock!(Client::get_object)
            .then_error(|| GetObjectError::NoSuchKey(NoSuchKey::builder().build()));
        let service = LinkService::new(Arc::new(mocked_store(&rule)), "https://sho.rt");

        let err = service.expand(&"A".repeat(TOKEN_LEN)).await.unwrap_err();
        assert!(matches!(err, LinkError::NotFound(_)));
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_ping_succeeds_for_existing_bucket() {
        let rule = mock!(Client::head_bucket)
            .match_requests(|req| req.bucket() == Some("links"))
            .then_output(|| HeadBucketOutput::builder().build());
        let store = mocked_store(&rule);

        store.ping().await.unwrap();
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_ping_missing_bucket_is_configuration_error() {
        let rule = mock!(Client::head_bucket)
            .then_error(|| HeadBucketError::NotFound(NotFound::builder().build()));
        let store = mocked_store(&rule);

        let err = store.ping().await.unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_ping_other_failure_is_transport() {
        let rule =
            mock!(Client::head_bucket).then_error(|| HeadBucketError::generic(access_denied()));
        let store = mocked_store(&rule);

        let err = store.ping().await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)));
    }

    #[test]
    fn test_bucket_accessor() {
        assert_eq!(offline_store().bucket(), "links");
    }
}
