//! S3-backed object store.
//!
//! Production backend speaking to any S3-compatible store via the AWS SDK.
//! The underlying `Client` is cheaply cloneable and safe for concurrent use,
//! so one `S3ObjectStore` is shared across all in-flight requests.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use super::{paths, public_object_url, ObjectStore, StorageError, DOWNLOAD_TOKEN_KEY};
use crate::config::StorageConfig;

pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_host: String,
}

impl S3ObjectStore {
    /// Wrap an existing SDK client.
    pub fn new(client: Client, bucket: impl Into<String>, public_host: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_host: public_host.into(),
        }
    }

    /// Build a store from configuration.
    ///
    /// Credentials fall back to the SDK's default provider chain (env vars,
    /// instance metadata) when not set explicitly; `endpoint` and
    /// `force_path_style` support S3-compatible stores like MinIO.
    pub async fn connect(cfg: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &cfg.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let (Some(access_key), Some(secret_key)) = (&cfg.access_key, &cfg.secret_key) {
            loader = loader.credentials_provider(Credentials::new(
                access_key.clone(),
                secret_key.clone(),
                None,
                None,
                "sukashi-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &cfg.endpoint {
            builder = builder.endpoint_url(endpoint.clone());
        }
        if cfg.force_path_style {
            builder = builder.force_path_style(true);
        }

        Self::new(
            Client::from_conf(builder.build()),
            cfg.bucket.clone(),
            cfg.public_host.clone(),
        )
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(path)
            .send()
            .await
        {
            Ok(output) => {
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StorageError::Io(e.to_string()))?;
                Ok(data.into_bytes().to_vec())
            }
            Err(err) => {
                if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
                    Err(StorageError::NotFound {
                        path: path.to_string(),
                    })
                } else {
                    Err(StorageError::Io(format!("{}", DisplayErrorContext(&err))))
                }
            }
        }
    }

    async fn put(
        &self,
        path: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let token = paths::download_token();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .metadata(DOWNLOAD_TOKEN_KEY, &token)
            .send()
            .await
            .map_err(|e| StorageError::Io(format!("{}", DisplayErrorContext(&e))))?;

        tracing::debug!(path = %path, content_type = %content_type, "object stored");

        Ok(public_object_url(
            &self.public_host,
            &self.bucket,
            path,
            &token,
        ))
    }
}
