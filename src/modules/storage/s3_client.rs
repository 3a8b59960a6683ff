//! S3-compatible storage client
//!
//! Issues presigned upload/download URLs and manages objects in AWS S3 or
//! any S3-compatible service (MinIO, LocalStack).
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use axum::http::{header, HeaderMap, HeaderValue};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};
use crate::modules::storage::ObjectStorage;

/// S3-compatible storage client
pub struct S3StorageClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    path_style: bool,
    key_prefix: String,
    presigned_url_expiry_secs: u32,
}

impl S3StorageClient {
    /// Create a new client from configuration
    ///
    /// No network calls are made; presigning is a local computation.
    pub fn new(config: StorageConfig) -> Result<Self> {
        let credentials = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                Credentials::new(
                    Some(access_key.as_str()),
                    Some(secret_key.as_str()),
                    None,
                    None,
                    None,
                )
            }
            _ => Credentials::from_env(),
        }
        .map_err(|e| AppError::Internal(format!("Failed to load storage credentials: {}", e)))?;

        let (region, path_style) = match &config.endpoint {
            Some(endpoint) => (
                Region::Custom {
                    region: config.region.clone(),
                    endpoint: endpoint.clone(),
                },
                true,
            ),
            None => (
                config.region.parse::<Region>().map_err(|e| {
                    AppError::Internal(format!("Invalid region '{}': {}", config.region, e))
                })?,
                false,
            ),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Internal(format!("Failed to create bucket handle: {}", e)))?;

        // Custom endpoints are addressed as http://endpoint/bucket
        if path_style {
            bucket.set_path_style();
        }

        info!(
            "Storage client initialized for bucket: {}, region: {}, path_style: {}, key_prefix: {}",
            bucket.name(),
            config.region,
            path_style,
            config.key_prefix
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            path_style,
            key_prefix: config.key_prefix,
            presigned_url_expiry_secs: config.presigned_url_expiry_secs,
        })
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<()> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<()> {
        let name = self.bucket.name();
        let bucket_config = BucketConfiguration::default();

        let created = if self.path_style {
            Bucket::create_with_path_style(
                &name,
                self.region.clone(),
                self.credentials.clone(),
                bucket_config,
            )
            .await
        } else {
            Bucket::create(
                &name,
                self.region.clone(),
                self.credentials.clone(),
                bucket_config,
            )
            .await
        };

        let response = created
            .map_err(|e| AppError::Storage(format!("Failed to create bucket '{}': {}", name, e)))?;

        if !response.success() {
            return Err(AppError::Storage(format!(
                "Failed to create bucket '{}': {} {}",
                name, response.response_code, response.response_text
            )));
        }

        Ok(())
    }

    /// Get the bucket name
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[async_trait]
impl ObjectStorage for S3StorageClient {
    fn key_prefix(&self) -> &str {
        &self.key_prefix
    }

    fn presigned_url_expiry_secs(&self) -> u32 {
        self.presigned_url_expiry_secs
    }

    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String> {
        // The uploader must send the same Content-Type it was signed for
        let content_type = HeaderValue::from_str(content_type).map_err(|_| {
            AppError::Validation(format!("fileType '{}' is not a valid content type", content_type))
        })?;
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, content_type);

        self.bucket
            .presign_put(key, self.presigned_url_expiry_secs, Some(headers), None)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to generate upload URL for '{}': {}",
                    key, e
                ))
            })
    }

    async fn presign_download(&self, key: &str) -> Result<String> {
        self.bucket
            .presign_get(key, self.presigned_url_expiry_secs, None)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to generate download URL for '{}': {}",
                    key, e
                ))
            })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete object '{}': {}", key, e)))?;

        // S3 answers 204 for deletes, including keys that never existed
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::Storage(format!(
                "Failed to delete object '{}': status {}",
                key, status
            )));
        }

        debug!("Deleted object '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn object_size(&self, key: &str) -> Result<Option<i64>> {
        match self.bucket.head_object(key).await {
            Ok((_, 404)) => Ok(None),
            Ok((head, status)) if (200..300).contains(&status) => {
                Ok(Some(head.content_length.unwrap_or(0)))
            }
            Ok((_, status)) => Err(AppError::Storage(format!(
                "Failed to inspect object '{}': status {}",
                key, status
            ))),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(None)
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to inspect object '{}': {}",
                        key, e
                    )))
                }
            }
        }
    }
}
