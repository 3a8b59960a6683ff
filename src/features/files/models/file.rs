use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use uuid::Uuid;

/// Upload lifecycle of a file record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// Upload URL issued, bytes not confirmed in storage
    Uploading,
    /// Object confirmed in storage
    Uploaded,
}

impl FileStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileStatus::Uploading => "uploading",
            FileStatus::Uploaded => "uploaded",
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database model for file records
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct File {
    pub file_id: Uuid,
    pub file_name: String,
    pub file_type: String,
    pub storage_key: String,
    pub upload_date: DateTime<Utc>,
    pub file_size: i64,
    /// Free text in storage; known values are [`FileStatus`]
    pub status: String,
}

impl File {
    /// New record for an upload that has not happened yet
    pub fn new_upload(file_id: Uuid, file_name: &str, file_type: &str, key_prefix: &str) -> Self {
        Self {
            file_id,
            file_name: file_name.to_string(),
            file_type: file_type.to_string(),
            storage_key: storage_key(key_prefix, file_id, file_name),
            upload_date: Utc::now(),
            file_size: 0,
            status: FileStatus::Uploading.to_string(),
        }
    }

    pub fn mark_uploaded(&mut self, file_size: i64) {
        self.file_size = file_size;
        self.status = FileStatus::Uploaded.to_string();
    }
}

/// Object key for a file: `{prefix}/{file_id}-{file_name}`
///
/// The id prefix keeps keys unique even when names repeat.
pub fn storage_key(key_prefix: &str, file_id: Uuid, file_name: &str) -> String {
    if key_prefix.is_empty() {
        format!("{}-{}", file_id, file_name)
    } else {
        format!("{}/{}-{}", key_prefix, file_id, file_name)
    }
}
