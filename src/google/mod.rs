//! Google Sheets, Forms and Drive over their REST APIs.

pub mod auth;
pub mod drive;
pub mod forms;
pub mod sheets;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::participant::RawTable;
pub use auth::{AccessTokenSource, ServiceAccountAuth, StaticToken};
pub use forms::{EventForm, PublishedForm};
pub use sheets::extract_sheet_id;

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("Google integration is not configured: {0}")]
    NotConfigured(String),
    #[error("invalid Google Sheet link: {0}")]
    InvalidSheetLink(String),
    #[error("failed to read service account key: {0}")]
    KeyIo(#[source] std::io::Error),
    #[error("invalid service account key: {0}")]
    KeyFormat(String),
    #[error("failed to sign token request: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("request to Google failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected Google API response: {0}")]
    UnexpectedResponse(String),
    #[error("failed to read file for upload: {0}")]
    UploadIo(#[source] std::io::Error),
}

/// Reads the first worksheet of a spreadsheet as a header plus rows.
#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_table(&self, sheet_id: &str) -> Result<RawTable, GoogleApiError>;
}

/// Creates the sign-up form for an event.
#[async_trait]
pub trait FormPublisher: Send + Sync {
    async fn publish_form(&self, form: &EventForm) -> Result<PublishedForm, GoogleApiError>;
}

/// Uploads a settlement archive and returns a shareable link.
#[async_trait]
pub trait ArchiveUploader: Send + Sync {
    async fn upload_archive(&self, path: &Path) -> Result<String, GoogleApiError>;
}

/// HTTP client for the Google APIs, sharing one token source.
pub struct GoogleWorkspace {
    http: reqwest::Client,
    tokens: Option<Arc<dyn AccessTokenSource>>,
    forms_folder_id: Option<String>,
    submission_folder_id: Option<String>,
}

impl GoogleWorkspace {
    pub fn new(
        http: reqwest::Client,
        tokens: Option<Arc<dyn AccessTokenSource>>,
        forms_folder_id: Option<String>,
        submission_folder_id: Option<String>,
    ) -> Self {
        Self {
            http,
            tokens,
            forms_folder_id,
            submission_folder_id,
        }
    }

    async fn bearer(&self) -> Result<String, GoogleApiError> {
        match &self.tokens {
            Some(tokens) => tokens.access_token().await,
            None => Err(GoogleApiError::NotConfigured(
                "set GOOGLE_SERVICE_ACCOUNT_KEY, GOOGLE_SERVICE_ACCOUNT_JSON or GOOGLE_ACCESS_TOKEN"
                    .to_string(),
            )),
        }
    }
}

/// Turns a non-success status into [`GoogleApiError::Api`] with the response body.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, GoogleApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(GoogleApiError::Api {
        status: status.as_u16(),
        body,
    })
}
