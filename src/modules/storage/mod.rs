//! Object storage for uploaded file bytes
//!
//! The API never proxies file content. It only hands out presigned URLs
//! and manages objects by key, so the storage seam is small.

mod s3_client;

pub use s3_client::S3StorageClient;

use async_trait::async_trait;

use crate::core::error::Result;

/// Object storage capability used by the file service
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Prefix every object key starts with (e.g. "uploads")
    fn key_prefix(&self) -> &str;

    /// Lifetime of issued presigned URLs in seconds
    fn presigned_url_expiry_secs(&self) -> u32;

    /// Presigned PUT URL for `key`, signed for the given content type
    async fn presign_upload(&self, key: &str, content_type: &str) -> Result<String>;

    /// Presigned GET URL for `key`
    async fn presign_download(&self, key: &str) -> Result<String>;

    /// Remove the object at `key`
    async fn delete(&self, key: &str) -> Result<()>;

    /// Stored size of the object at `key`, `None` if it does not exist
    async fn object_size(&self, key: &str) -> Result<Option<i64>>;
}
