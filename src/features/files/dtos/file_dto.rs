use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::features::files::models::File;

/// Request DTO for issuing an upload URL
///
/// Both fields default to empty so that a missing field is reported by
/// validation instead of as a JSON decoding failure.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateUploadUrlDto {
    /// Name of the file being uploaded
    #[serde(default)]
    #[validate(length(min = 1, message = "fileName is required"))]
    #[schema(example = "report.pdf")]
    pub file_name: String,

    /// MIME type the client will send with the upload
    #[serde(default)]
    #[validate(length(min = 1, message = "fileType is required"))]
    #[schema(example = "application/pdf")]
    pub file_type: String,
}

/// Response DTO for an issued upload URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponseDto {
    /// Presigned PUT URL; send the raw bytes with the same Content-Type
    pub upload_url: String,
    /// Identifier of the created file record
    pub file_id: Uuid,
    /// Storage key the object will be written to
    pub key: String,
    /// Seconds until `upload_url` stops working
    pub expires_in: u32,
}

/// File record as exposed by the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecordDto {
    pub file_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub storage_key: String,
    pub upload_date: DateTime<Utc>,
    /// Size in bytes; 0 until the upload is completed
    pub file_size: i64,
    /// "uploading" or "uploaded"
    #[schema(example = "uploading")]
    pub status: String,
}

impl From<File> for FileRecordDto {
    fn from(file: File) -> Self {
        Self {
            file_id: file.file_id,
            file_name: file.file_name,
            file_type: file.file_type,
            storage_key: file.storage_key,
            upload_date: file.upload_date,
            file_size: file.file_size,
            status: file.status,
        }
    }
}

/// File record merged with a time-boxed download URL
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileDownloadDto {
    #[serde(flatten)]
    pub file: FileRecordDto,
    /// Presigned GET URL for the stored object
    pub download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fail_validation() {
        let dto: GenerateUploadUrlDto = serde_json::from_str(r#"{"fileName":"a.txt"}"#).unwrap();
        let errors = dto.validate().unwrap_err();

        assert!(errors.field_errors().contains_key("file_type"));
        assert!(!errors.field_errors().contains_key("file_name"));
    }

    #[test]
    fn test_empty_fields_fail_validation() {
        let dto = GenerateUploadUrlDto {
            file_name: String::new(),
            file_type: String::new(),
        };

        assert_eq!(dto.validate().unwrap_err().field_errors().len(), 2);
    }

    #[test]
    fn test_download_dto_flattens_record() {
        let file = File::new_upload(Uuid::new_v4(), "a.txt", "text/plain", "uploads");
        let dto = FileDownloadDto {
            file: file.clone().into(),
            download_url: "https://example.test/a".to_string(),
        };

        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["fileId"], file.file_id.to_string());
        assert_eq!(value["storageKey"], file.storage_key);
        assert_eq!(value["status"], "uploading");
        assert_eq!(value["downloadUrl"], "https://example.test/a");
        assert!(value.get("file").is_none());
    }
}
