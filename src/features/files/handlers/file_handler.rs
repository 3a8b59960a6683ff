use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::files::dtos::{
    FileDownloadDto, FileRecordDto, GenerateUploadUrlDto, UploadUrlResponseDto,
};
use crate::features::files::services::FileService;
use crate::shared::types::{ErrorResponse, MessageResponse};

/// Ids that are not UUIDs cannot exist, so they are reported as missing
fn parse_file_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::NotFound("File not found".to_string()))
}

/// Issue a presigned upload URL
///
/// Creates a file record in "uploading" status and returns a short-lived URL.
/// The client then PUTs the raw bytes to `uploadUrl` with the same Content-Type.
#[utoipa::path(
    post,
    path = "/generate-presigned-url",
    tag = "files",
    request_body = GenerateUploadUrlDto,
    responses(
        (status = 200, description = "Upload URL issued", body = UploadUrlResponseDto),
        (status = 400, description = "fileName or fileType missing", body = ErrorResponse),
        (status = 500, description = "Storage or record store failure", body = ErrorResponse)
    )
)]
pub async fn generate_upload_url(
    State(service): State<Arc<FileService>>,
    AppJson(dto): AppJson<GenerateUploadUrlDto>,
) -> Result<Json<UploadUrlResponseDto>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let response = service
        .create_upload_url(&dto.file_name, &dto.file_type)
        .await?;

    Ok(Json(response))
}

/// List all file records
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    responses(
        (status = 200, description = "All file records", body = Vec<FileRecordDto>),
        (status = 500, description = "Record store failure", body = ErrorResponse)
    )
)]
pub async fn list_files(
    State(service): State<Arc<FileService>>,
) -> Result<Json<Vec<FileRecordDto>>> {
    let files = service.list_files().await?;
    Ok(Json(files))
}

/// Get a file record with a presigned download URL
#[utoipa::path(
    get,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File record with download URL", body = FileDownloadDto),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage or record store failure", body = ErrorResponse)
    )
)]
pub async fn get_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<FileDownloadDto>> {
    let file_id = parse_file_id(&id)?;
    let file = service.get_file(file_id).await?;
    Ok(Json(file))
}

/// Delete a file from storage and its record
#[utoipa::path(
    delete,
    path = "/files/{id}",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 500, description = "Storage or record store failure", body = ErrorResponse)
    )
)]
pub async fn delete_file(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    let file_id = parse_file_id(&id)?;
    service.delete_file(file_id).await?;

    Ok(Json(MessageResponse::new("File deleted successfully")))
}

/// Mark an upload as complete
///
/// Checks that the object exists in storage, then records its size and
/// moves the status to "uploaded".
#[utoipa::path(
    post,
    path = "/files/{id}/complete",
    tag = "files",
    params(
        ("id" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Upload confirmed", body = FileRecordDto),
        (status = 404, description = "File not found", body = ErrorResponse),
        (status = 409, description = "Object not present in storage yet", body = ErrorResponse),
        (status = 500, description = "Storage or record store failure", body = ErrorResponse)
    )
)]
pub async fn complete_upload(
    State(service): State<Arc<FileService>>,
    Path(id): Path<String>,
) -> Result<Json<FileRecordDto>> {
    let file_id = parse_file_id(&id)?;
    let file = service.complete_upload(file_id).await?;
    Ok(Json(file))
}
