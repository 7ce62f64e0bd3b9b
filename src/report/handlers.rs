use actix_multipart::Multipart;
use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{generate_report, uploaded_report_name, ReportRequest, ReportResponse};
use crate::error::AppError;
use crate::multipart_parser::{MultipartParseError, MultipartParser};
use crate::session::StoredDocument;
use crate::state::AppState;
use crate::validation::Validator;
use crate::ErrorResponse;

pub const REPORT_FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, ToSchema)]
pub struct StoredReport {
    pub filename: String,
    pub size: usize,
}

#[utoipa::path(
    context_path = "/api",
    tag = "Report",
    post,
    path = "/sessions/{id}/report",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report generated and kept in the session", body = ReportResponse),
        (status = 400, description = "Missing title or notes", body = ErrorResponse),
        (status = 502, description = "Chat model unavailable or returned nothing", body = ErrorResponse)
    )
)]
pub async fn create_report(
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
    req: web::Json<ReportRequest>,
) -> impl Responder {
    info!("Executing create_report handler");
    let result: Result<ReportResponse, AppError> = async {
        let session = data.session(&id).await?;
        req.validate()?;
        let report = generate_report(
            data.chat.as_ref(),
            &data.fonts,
            data.config.require_embedded_font,
            &req,
        )
        .await?;

        let response = ReportResponse {
            filename: report.document.filename.clone(),
            text: report.text,
            model: data.chat.model_name().to_string(),
        };
        session.write().report = Some(report.document);
        Ok(response)
    }
    .await;

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Report",
    post,
    path = "/sessions/{id}/report/upload",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body(content_type = "multipart/form-data", description = "Report document in the `file` part"),
    responses(
        (status = 200, description = "Uploaded report replaces the session report", body = StoredReport),
        (status = 400, description = "No file part", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn upload_report(
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
    payload: Multipart,
) -> impl Responder {
    info!("Executing upload_report handler");
    let result: Result<StoredReport, AppError> = async {
        let session = data.session(&id).await?;
        let mut parts = MultipartParser::parse(payload).await?;
        let file = parts
            .take_file(REPORT_FILE_FIELD)
            .ok_or_else(|| MultipartParseError::MissingPart(REPORT_FILE_FIELD.to_string()))?;

        let document = StoredDocument {
            filename: uploaded_report_name(&file.filename),
            bytes: file.bytes,
        };
        let stored = StoredReport {
            filename: document.filename.clone(),
            size: document.bytes.len(),
        };
        session.write().report = Some(document);
        Ok(stored)
    }
    .await;

    match result {
        Ok(stored) => HttpResponse::Ok().json(stored),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Report",
    get,
    path = "/sessions/{id}/report",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Current report document"),
        (status = 404, description = "No report in this session", body = ErrorResponse)
    )
)]
pub async fn download_report(data: web::Data<AppState>, id: web::Path<Uuid>) -> impl Responder {
    info!("Executing download_report handler");
    let report = match data.session(&id).await {
        Ok(session) => session.read().report.clone(),
        Err(e) => return HttpResponse::from(e),
    };

    match report {
        Some(document) => {
            let mime = mime_guess::from_path(&document.filename).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.essence_str())
                .insert_header(header::ContentDisposition::attachment(document.filename))
                .body(document.bytes)
        }
        None => AppError::NotFound("no report in this session".to_string()).into(),
    }
}
