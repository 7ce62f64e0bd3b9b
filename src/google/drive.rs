use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::path::Path;

use super::{check_status, ArchiveUploader, GoogleApiError, GoogleWorkspace};

const DRIVE_UPLOAD_API: &str = "https://www.googleapis.com/upload/drive/v3/files";
const BOUNDARY: &str = "eventtool-upload-boundary";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadedFile {
    id: String,
    #[serde(default)]
    web_view_link: Option<String>,
}

/// Builds a `multipart/related` body: JSON metadata part, then the media part.
pub fn related_body(metadata: &serde_json::Value, mime: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(content.len() + 512);
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n{metadata}\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("--{BOUNDARY}\r\nContent-Type: {mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

#[async_trait]
impl ArchiveUploader for GoogleWorkspace {
    async fn upload_archive(&self, path: &Path) -> Result<String, GoogleApiError> {
        let folder_id = self.submission_folder_id.as_deref().ok_or_else(|| {
            GoogleApiError::NotConfigured("set SUBMISSION_DRIVE_FOLDER_ID".to_string())
        })?;
        let token = self.bearer().await?;

        let content = tokio::fs::read(path).await.map_err(GoogleApiError::UploadIo)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Abrechnung.zip".to_string());
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        let metadata = json!({ "name": name, "parents": [folder_id] });

        let uploaded: UploadedFile = check_status(
            self.http
                .post(DRIVE_UPLOAD_API)
                .query(&[("uploadType", "multipart"), ("fields", "id,name,webViewLink")])
                .bearer_auth(&token)
                .header(
                    reqwest::header::CONTENT_TYPE,
                    format!("multipart/related; boundary={BOUNDARY}"),
                )
                .body(related_body(&metadata, mime.essence_str(), &content))
                .send()
                .await?,
        )
        .await?
        .json()
        .await?;

        log::info!("Uploaded {} to Drive as {}", name, uploaded.id);
        uploaded.web_view_link.ok_or_else(|| {
            GoogleApiError::UnexpectedResponse(format!("no webViewLink for file {}", uploaded.id))
        })
    }
}
