use utoipa::{Modify, OpenApi};

use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ErrorResponse, MessageResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        files_handlers::generate_upload_url,
        files_handlers::list_files,
        files_handlers::get_file,
        files_handlers::delete_file,
        files_handlers::complete_upload,
    ),
    components(
        schemas(
            // Shared
            ErrorResponse,
            MessageResponse,
            // Files
            files_dtos::GenerateUploadUrlDto,
            files_dtos::UploadUrlResponseDto,
            files_dtos::FileRecordDto,
            files_dtos::FileDownloadDto,
        )
    ),
    tags(
        (name = "files", description = "Presigned uploads and file records"),
    ),
    info(
        title = "Filedrop API",
        version = "0.1.0",
        description = "Presigned direct-to-storage file uploads",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
