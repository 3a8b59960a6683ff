use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::files::models::File;

/// Key-value store for file records, keyed by `file_id`
#[async_trait]
pub trait FileRecordStore: Send + Sync {
    /// Insert or replace the record with the same `file_id`
    async fn put(&self, file: &File) -> Result<()>;

    async fn get(&self, file_id: Uuid) -> Result<Option<File>>;

    /// Write `file_size` and `status` of an existing record.
    /// Returns `false` when no record has that `file_id`; never inserts.
    async fn update(&self, file: &File) -> Result<bool>;

    /// Remove the record; removing a missing id is not an error
    async fn delete(&self, file_id: Uuid) -> Result<()>;

    /// Every record, in whatever order the store yields them
    async fn scan(&self) -> Result<Vec<File>>;
}

/// PostgreSQL-backed record store
pub struct PgFileRecordStore {
    pool: PgPool,
}

impl PgFileRecordStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FileRecordStore for PgFileRecordStore {
    async fn put(&self, file: &File) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO files (file_id, file_name, file_type, storage_key, upload_date, file_size, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (file_id) DO UPDATE
            SET file_name = EXCLUDED.file_name,
                file_type = EXCLUDED.file_type,
                storage_key = EXCLUDED.storage_key,
                upload_date = EXCLUDED.upload_date,
                file_size = EXCLUDED.file_size,
                status = EXCLUDED.status
            "#,
        )
        .bind(file.file_id)
        .bind(&file.file_name)
        .bind(&file.file_type)
        .bind(&file.storage_key)
        .bind(file.upload_date)
        .bind(file.file_size)
        .bind(&file.status)
        .execute(&self.pool)
        .await?;

        debug!("File record stored: id={}", file.file_id);
        Ok(())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<File>> {
        let file = sqlx::query_as::<_, File>(
            r#"
            SELECT file_id, file_name, file_type, storage_key, upload_date, file_size, status
            FROM files
            WHERE file_id = $1
            "#,
        )
        .bind(file_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn update(&self, file: &File) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE files
            SET file_size = $2, status = $3
            WHERE file_id = $1
            "#,
        )
        .bind(file.file_id)
        .bind(file.file_size)
        .bind(&file.status)
        .execute(&self.pool)
        .await?;

        debug!(
            "File record updated: id={}, rows={}",
            file.file_id,
            result.rows_affected()
        );
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, file_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM files WHERE file_id = $1")
            .bind(file_id)
            .execute(&self.pool)
            .await?;

        debug!(
            "File record deleted: id={}, rows={}",
            file_id,
            result.rows_affected()
        );
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<File>> {
        let files = sqlx::query_as::<_, File>(
            r#"
            SELECT file_id, file_name, file_type, storage_key, upload_date, file_size, status
            FROM files
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }
}
