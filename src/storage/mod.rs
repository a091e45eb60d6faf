// pg-s3-backup/src/storage/mod.rs
use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::error::DisplayErrorContext;
use s3::primitives::ByteStream;
use tokio::sync::OnceCell;

use crate::errors::{AppError, Result};

/// Object storage as seen by the backup and restore flows.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Uploads `body` as a single object.
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()>;

    /// Returns the complete body of the object.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;
}

/// S3 (or S3-compatible) storage using the default AWS credential chain.
///
/// The SDK client is built on first use, so a run that fails validation never
/// loads credentials or contacts the service.
pub struct S3ObjectStore {
    endpoint_url: Option<String>,
    client: OnceCell<s3::Client>,
}

impl S3ObjectStore {
    pub fn new(endpoint_url: Option<String>) -> Self {
        S3ObjectStore {
            endpoint_url,
            client: OnceCell::new(),
        }
    }

    async fn client(&self) -> &s3::Client {
        self.client
            .get_or_init(|| async {
                let sdk_config = aws_config::defaults(s3::config::BehaviorVersion::latest())
                    .load()
                    .await;
                let builder = with_endpoint(
                    s3::config::Builder::from(&sdk_config),
                    self.endpoint_url.as_deref(),
                );
                s3::Client::from_conf(builder.build())
            })
            .await
    }
}

/// S3-compatible services are addressed path-style (`<endpoint>/<bucket>/<key>`).
fn with_endpoint(builder: s3::config::Builder, endpoint_url: Option<&str>) -> s3::config::Builder {
    match endpoint_url {
        Some(endpoint) => builder.endpoint_url(endpoint).force_path_style(true),
        None => builder,
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<()> {
        self.client()
            .await
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| AppError::Upload {
                bucket: bucket.to_string(),
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }

    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let retrieval_error = |message: String| AppError::Retrieval {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message,
        };

        let mut object = self
            .client()
            .await
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| retrieval_error(DisplayErrorContext(&e).to_string()))?;

        let mut body = Vec::with_capacity(object.content_length().unwrap_or(0).max(0) as usize);
        while let Some(chunk) = object
            .body
            .try_next()
            .await
            .map_err(|e| retrieval_error(DisplayErrorContext(&e).to_string()))?
        {
            body.extend_from_slice(&chunk);
        }
        Ok(body)
    }
}
