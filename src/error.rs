//! Crate-level error and its mapping onto HTTP responses.

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use uuid::Uuid;

use crate::google::GoogleApiError;
use crate::multipart_parser::MultipartParseError;
use crate::participant::CsvError;
use crate::pdf::PdfError;
use crate::report::ReportError;
use crate::signature::{QrError, SignatureError};
use crate::submission::ArchiveError;
use crate::validation::ValidationErrors;
use crate::ErrorResponse;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    BadRequest(String),
    #[error("session {0} not found or expired")]
    SessionNotFound(Uuid),
    #[error("{0}")]
    NotFound(String),
    #[error("no participants loaded")]
    NoParticipants,
    #[error(transparent)]
    Csv(#[from] CsvError),
    #[error(transparent)]
    Google(#[from] GoogleApiError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Qr(#[from] QrError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
    #[error(transparent)]
    Multipart(#[from] MultipartParseError),
}

fn pdf_status(error: &PdfError) -> StatusCode {
    match error {
        PdfError::FontRequired(_) => StatusCode::SERVICE_UNAVAILABLE,
        PdfError::Image { .. } | PdfError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::NoParticipants => {
                StatusCode::BAD_REQUEST
            }
            AppError::SessionNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Csv(e) => match e {
                CsvError::Parse(_) => StatusCode::BAD_REQUEST,
                CsvError::SnapshotMissing(_) => StatusCode::NOT_FOUND,
                CsvError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Google(e) => match e {
                GoogleApiError::NotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
                GoogleApiError::InvalidSheetLink(_) => StatusCode::BAD_REQUEST,
                GoogleApiError::Http(_)
                | GoogleApiError::Api { .. }
                | GoogleApiError::UnexpectedResponse(_) => StatusCode::BAD_GATEWAY,
                GoogleApiError::KeyIo(_)
                | GoogleApiError::KeyFormat(_)
                | GoogleApiError::Jwt(_)
                | GoogleApiError::UploadIo(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Signature(e) => match e {
                SignatureError::InvalidName(_)
                | SignatureError::BufferSize { .. }
                | SignatureError::EmptyImage
                | SignatureError::Decode(_) => StatusCode::BAD_REQUEST,
                SignatureError::Encode(_) | SignatureError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            AppError::Qr(e) => match e {
                QrError::MissingInput(_) => StatusCode::BAD_REQUEST,
                QrError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Pdf(e) => pdf_status(e),
            AppError::Report(e) => match e {
                ReportError::Unavailable(_) | ReportError::Api { .. } | ReportError::EmptyAnswer => {
                    StatusCode::BAD_GATEWAY
                }
                ReportError::Pdf(pdf) => pdf_status(pdf),
            },
            AppError::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Multipart(e) => match e {
                MultipartParseError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            },
        }
    }
}

impl From<AppError> for HttpResponse {
    fn from(error: AppError) -> Self {
        let status = error.status_code();
        let message = error.to_string();
        if status.is_server_error() {
            log::error!("Request failed: {}", message);
        } else {
            log::warn!("Request rejected: {}", message);
        }

        let body = match status {
            StatusCode::BAD_REQUEST => ErrorResponse::bad_request(&message),
            StatusCode::NOT_FOUND => ErrorResponse::not_found(&message),
            StatusCode::BAD_GATEWAY => ErrorResponse::bad_gateway(&message),
            StatusCode::SERVICE_UNAVAILABLE => ErrorResponse::service_unavailable(&message),
            _ => ErrorResponse::internal_error(&message),
        };
        HttpResponse::build(status).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_status_mapping() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::empty_field("title", "Event title"));
        assert_eq!(AppError::from(errors).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::SessionNotFound(Uuid::nil()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(GoogleApiError::NotConfigured("x".into())).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(GoogleApiError::Api { status: 403, body: String::new() }).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(CsvError::SnapshotMissing("data/teilnehmer.csv".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(ReportError::EmptyAnswer).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::from(ReportError::Pdf(PdfError::FontRequired("x".into()))).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            AppError::from(MultipartParseError::MissingPart("participant_list".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_http_response_status() {
        let response: HttpResponse = AppError::NoParticipants.into();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response: HttpResponse = AppError::from(SignatureError::EmptyImage).into();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
