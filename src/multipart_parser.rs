use actix_multipart::Multipart;
use actix_web::HttpResponse;
use futures::StreamExt;
use log::debug;
use sanitize_filename::sanitize;
use std::collections::HashMap;

use crate::ErrorResponse;

/// A file part of a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub field: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct ParsedMultipart {
    pub fields: HashMap<String, String>,
    pub files: Vec<UploadedFile>,
}

impl ParsedMultipart {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    pub fn require_text(&self, name: &str) -> Result<&str, MultipartParseError> {
        self.text(name)
            .ok_or_else(|| MultipartParseError::MissingPart(name.to_string()))
    }

    /// First file uploaded under `name`.
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.iter().find(|file| file.field == name)
    }

    pub fn require_file(&self, name: &str) -> Result<&UploadedFile, MultipartParseError> {
        self.file(name)
            .ok_or_else(|| MultipartParseError::MissingPart(name.to_string()))
    }

    /// Files whose field name starts with `prefix`, in upload order.
    pub fn files_with_prefix(&self, prefix: &str) -> Vec<&UploadedFile> {
        self.files
            .iter()
            .filter(|file| file.field.starts_with(prefix))
            .collect()
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        let index = self.files.iter().position(|file| file.field == name)?;
        Some(self.files.remove(index))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("Missing form part: {0}")]
    MissingPart(String),
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::MissingPart(_)
            | MultipartParseError::Utf8Error(_)
            | MultipartParseError::FieldError(_) => {
                HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!("{}", error)))
            }
            MultipartParseError::IoError(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error(&format!("{}", error))),
        }
    }
}

pub struct MultipartParser;

impl MultipartParser {
    /// Reads every part. Parts with a filename become files, the rest text fields.
    pub async fn parse(mut multipart: Multipart) -> Result<ParsedMultipart, MultipartParseError> {
        let mut parsed = ParsedMultipart::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field.content_disposition().ok_or_else(|| {
                MultipartParseError::FieldError("Content disposition not found".to_string())
            })?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let maybe_filename = content_disposition.get_filename().map(|s| s.to_string());

            let mut buffer = Vec::new();
            while let Some(chunk) = field.next().await {
                let data_chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
                buffer.extend_from_slice(&data_chunk);
            }

            match maybe_filename {
                Some(filename) => {
                    let filename = match sanitize(&filename) {
                        safe if safe.is_empty() => format!("file_{}.dat", parsed.files.len()),
                        safe => safe,
                    };
                    debug!("Received file '{}' ({} bytes) in part '{}'", filename, buffer.len(), name);
                    parsed.files.push(UploadedFile {
                        field: name,
                        filename,
                        bytes: buffer,
                    });
                }
                None => {
                    let value = String::from_utf8(buffer)
                        .map_err(|e| MultipartParseError::Utf8Error(e.to_string()))?;
                    parsed.fields.insert(name, value);
                }
            }
        }

        Ok(parsed)
    }
}
