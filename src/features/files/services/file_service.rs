use std::sync::Arc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::files::dtos::{FileDownloadDto, FileRecordDto, UploadUrlResponseDto};
use crate::features::files::models::File;
use crate::features::files::repositories::FileRecordStore;
use crate::modules::storage::ObjectStorage;

/// Service for the presigned upload lifecycle
///
/// Holds no state of its own; every call goes straight to the injected
/// record store and object storage.
pub struct FileService {
    records: Arc<dyn FileRecordStore>,
    storage: Arc<dyn ObjectStorage>,
}

impl FileService {
    pub fn new(records: Arc<dyn FileRecordStore>, storage: Arc<dyn ObjectStorage>) -> Self {
        Self { records, storage }
    }

    /// Issue a presigned upload URL and record the pending upload
    ///
    /// # Arguments
    /// * `file_name` - Client supplied file name, becomes part of the key
    /// * `file_type` - MIME type the upload URL is signed for
    ///
    /// # Returns
    /// The upload URL together with the new file id and storage key
    pub async fn create_upload_url(
        &self,
        file_name: &str,
        file_type: &str,
    ) -> Result<UploadUrlResponseDto> {
        let file_id = Uuid::new_v4();
        let file = File::new_upload(file_id, file_name, file_type, self.storage.key_prefix());

        let upload_url = self
            .storage
            .presign_upload(&file.storage_key, &file.file_type)
            .await?;

        self.records.put(&file).await?;

        info!(
            "Upload URL issued: id={}, key={}, type={}",
            file.file_id, file.storage_key, file.file_type
        );

        Ok(UploadUrlResponseDto {
            upload_url,
            file_id: file.file_id,
            key: file.storage_key,
            expires_in: self.storage.presigned_url_expiry_secs(),
        })
    }

    /// List every file record
    pub async fn list_files(&self) -> Result<Vec<FileRecordDto>> {
        let files = self.records.scan().await?;
        debug!("Listed {} file records", files.len());

        Ok(files.into_iter().map(FileRecordDto::from).collect())
    }

    /// Get one file record with a presigned download URL
    pub async fn get_file(&self, file_id: Uuid) -> Result<FileDownloadDto> {
        let file = self.find_file(file_id).await?;

        let download_url = self.storage.presign_download(&file.storage_key).await?;

        Ok(FileDownloadDto {
            file: file.into(),
            download_url,
        })
    }

    /// Delete the stored object, then its record
    ///
    /// The two steps are not atomic. If the record delete fails the record
    /// outlives its object and the error is returned.
    pub async fn delete_file(&self, file_id: Uuid) -> Result<()> {
        let file = self.find_file(file_id).await?;

        self.storage.delete(&file.storage_key).await?;
        debug!("Object deleted from storage: {}", file.storage_key);

        self.records.delete(file.file_id).await.inspect_err(|e| {
            error!(
                "Object removed but record delete failed, record is orphaned: id={}, key={}, error={}",
                file.file_id, file.storage_key, e
            );
        })?;

        info!("File deleted: id={}, key={}", file.file_id, file.storage_key);
        Ok(())
    }

    /// Confirm an upload by checking the object in storage
    ///
    /// Records the stored size and moves the status to "uploaded".
    /// Calling it again refreshes the size.
    pub async fn complete_upload(&self, file_id: Uuid) -> Result<FileRecordDto> {
        let mut file = self.find_file(file_id).await?;

        let size = self
            .storage
            .object_size(&file.storage_key)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("File has not been uploaded to storage yet".to_string())
            })?;

        file.mark_uploaded(size);

        // A delete may have landed while storage was being checked
        if !self.records.update(&file).await? {
            return Err(AppError::NotFound("File not found".to_string()));
        }

        info!(
            "Upload completed: id={}, key={}, size={}",
            file.file_id, file.storage_key, file.file_size
        );

        Ok(file.into())
    }

    async fn find_file(&self, file_id: Uuid) -> Result<File> {
        self.records
            .get(file_id)
            .await?
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))
    }
}
