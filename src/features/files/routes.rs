use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::files::handlers::{
    complete_upload, delete_file, generate_upload_url, get_file, list_files,
};
use crate::features::files::services::FileService;

/// Create routes for the files feature
pub fn routes(file_service: Arc<FileService>) -> Router {
    Router::new()
        .route("/generate-presigned-url", post(generate_upload_url))
        .route("/files", get(list_files))
        .route("/files/{id}", get(get_file).delete(delete_file))
        .route("/files/{id}/complete", post(complete_upload))
        .with_state(file_service)
}

#[cfg(test)]
mod tests {
    use axum::http::{header, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    use crate::features::files::dtos::{FileDownloadDto, FileRecordDto, UploadUrlResponseDto};
    use crate::shared::test_helpers::{test_app, TestApp};

    fn server() -> (TestServer, TestApp) {
        let app = test_app();
        let server = TestServer::new(app.router.clone()).unwrap();
        (server, app)
    }

    async fn issue(server: &TestServer, name: &str, mime: &str) -> UploadUrlResponseDto {
        let response = server
            .post("/generate-presigned-url")
            .json(&json!({ "fileName": name, "fileType": mime }))
            .await;
        response.assert_status_ok();
        response.json::<UploadUrlResponseDto>()
    }

    #[tokio::test]
    async fn test_issued_upload_is_listed_as_uploading() {
        let (server, _app) = server();

        let issued = issue(&server, "notes.txt", "text/plain").await;

        let files = server.get("/files").await.json::<Vec<FileRecordDto>>();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_id, issued.file_id);
        assert_eq!(files[0].file_name, "notes.txt");
        assert_eq!(files[0].storage_key, issued.key);
        assert_eq!(files[0].status, "uploading");
    }

    #[tokio::test]
    async fn test_issue_response_uses_camel_case() {
        let (server, _app) = server();

        let body = server
            .post("/generate-presigned-url")
            .json(&json!({ "fileName": "a.png", "fileType": "image/png" }))
            .await
            .json::<Value>();

        assert!(body["uploadUrl"].is_string());
        assert!(body["fileId"].is_string());
        assert!(body["key"].as_str().unwrap().ends_with("-a.png"));
        assert_eq!(body["expiresIn"], 300);
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected_without_record() {
        let (server, app) = server();

        for body in [
            json!({ "fileType": "text/plain" }),
            json!({ "fileName": "a.txt" }),
            json!({ "fileName": "", "fileType": "text/plain" }),
            json!({}),
        ] {
            let response = server.post("/generate-presigned-url").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            assert!(response.json::<Value>()["error"].is_string());
        }

        assert!(app.records.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let (server, app) = server();

        let response = server
            .post("/generate-presigned-url")
            .text("{not json")
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(app.records.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (server, _app) = server();
        let missing = uuid::Uuid::new_v4();

        for path in [format!("/files/{}", missing), "/files/not-a-uuid".to_string()] {
            let response = server.get(&path).await;
            response.assert_status(StatusCode::NOT_FOUND);
            assert_eq!(response.json::<Value>()["error"], "File not found");

            server
                .delete(&path)
                .await
                .assert_status(StatusCode::NOT_FOUND);
        }

        server
            .post(&format!("/files/{}/complete", missing))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_then_lookups_miss() {
        let (server, _app) = server();
        let keep = issue(&server, "keep.txt", "text/plain").await;
        let removed = issue(&server, "removed.txt", "text/plain").await;

        let response = server.delete(&format!("/files/{}", removed.file_id)).await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>()["message"],
            "File deleted successfully"
        );

        let files = server.get("/files").await.json::<Vec<FileRecordDto>>();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_id, keep.file_id);

        server
            .get(&format!("/files/{}", removed.file_id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_round_trip_serves_identical_bytes() {
        let (server, app) = server();
        let payload = b"%PDF-1.7 not really a pdf".to_vec();

        let issued = issue(&server, "doc.pdf", "application/pdf").await;
        app.storage
            .put_via_url(&issued.upload_url, payload.clone())
            .unwrap();

        let file = server
            .get(&format!("/files/{}", issued.file_id))
            .await
            .json::<FileDownloadDto>();

        assert_eq!(file.file.file_type, "application/pdf");
        assert_eq!(app.storage.get_via_url(&file.download_url).unwrap(), payload);
    }

    #[tokio::test]
    async fn test_retrieve_merges_record_and_download_url() {
        let (server, _app) = server();
        let issued = issue(&server, "pic.gif", "image/gif").await;

        let body = server
            .get(&format!("/files/{}", issued.file_id))
            .await
            .json::<Value>();

        assert_eq!(body["fileId"], issued.file_id.to_string());
        assert_eq!(body["fileName"], "pic.gif");
        assert_eq!(body["fileSize"], 0);
        assert!(body["uploadDate"].is_string());
        assert!(body["downloadUrl"].as_str().unwrap().contains(&issued.key));
    }

    #[tokio::test]
    async fn test_complete_upload_flow() {
        let (server, app) = server();
        let issued = issue(&server, "data.csv", "text/csv").await;

        server
            .post(&format!("/files/{}/complete", issued.file_id))
            .await
            .assert_status(StatusCode::CONFLICT);

        app.storage
            .put_via_url(&issued.upload_url, b"a,b\n1,2\n".to_vec())
            .unwrap();

        let file = server
            .post(&format!("/files/{}/complete", issued.file_id))
            .await
            .json::<FileRecordDto>();
        assert_eq!(file.status, "uploaded");
        assert_eq!(file.file_size, 8);
    }

    #[tokio::test]
    async fn test_backend_failure_is_generic_500() {
        let (server, app) = server();
        app.storage.set_failing(true);

        let response = server
            .post("/generate-presigned-url")
            .json(&json!({ "fileName": "a.txt", "fileType": "text/plain" }))
            .await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "Internal server error");
        assert!(app.records.is_empty());

        app.storage.set_failing(false);
        app.records.fail_scans(true);
        server
            .get("/files")
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_responses_carry_cors_headers() {
        let (server, _app) = server();

        let response = server
            .get("/files")
            .add_header(header::ORIGIN, HeaderValue::from_static("https://upload.example"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.header(header::ACCESS_CONTROL_ALLOW_ORIGIN), "*");
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let (server, _app) = server();

        let response = server.get("/health").await;

        response.assert_status_ok();
        assert!(!response.header("x-request-id").is_empty());
    }
}
