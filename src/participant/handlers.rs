use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::csv_io::{load_snapshot, read_participants};
use super::{deduplicate, default_tutors, load_from_sheet, ParticipantRecord};
use crate::error::AppError;
use crate::google::{extract_sheet_id, GoogleApiError};
use crate::multipart_parser::MultipartParser;
use crate::state::AppState;
use crate::ErrorResponse;

pub const CSV_FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize, ToSchema)]
pub struct SheetLinkRequest {
    /// Full link to the Google Sheet.
    pub sheet_url: String,
}

impl SheetLinkRequest {
    pub fn sheet_id(&self) -> Result<String, AppError> {
        extract_sheet_id(&self.sheet_url)
            .ok_or_else(|| GoogleApiError::InvalidSheetLink(self.sheet_url.clone()).into())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ParticipantTable {
    pub source: Option<String>,
    pub participants: Vec<ParticipantRecord>,
    /// Tutors registered in the table, comma separated.
    pub default_tutors: String,
    pub removed_duplicates: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UnsignedNames {
    pub names: Vec<String>,
}

async fn store_table(
    data: &AppState,
    id: &Uuid,
    records: Vec<ParticipantRecord>,
    source: String,
) -> Result<ParticipantTable, AppError> {
    let session = data.session(id).await?;
    let (participants, removed_duplicates) = deduplicate(records);
    if removed_duplicates > 0 {
        info!("Removed {} duplicate participants from {}", removed_duplicates, source);
    }

    let table = ParticipantTable {
        source: Some(source.clone()),
        default_tutors: default_tutors(&participants),
        participants: participants.clone(),
        removed_duplicates,
    };
    session.write().replace_participants(participants, source);
    Ok(table)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Participants",
    get,
    path = "/sessions/{id}/participants",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Current participant table", body = ParticipantTable),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn get_participants(data: web::Data<AppState>, id: web::Path<Uuid>) -> impl Responder {
    info!("Executing get_participants handler");
    let session = match data.session(&id).await {
        Ok(session) => session,
        Err(e) => return HttpResponse::from(e),
    };
    let session = session.read();
    HttpResponse::Ok().json(ParticipantTable {
        source: session.source.clone(),
        default_tutors: default_tutors(&session.participants),
        participants: session.participants.clone(),
        removed_duplicates: 0,
    })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Participants",
    post,
    path = "/sessions/{id}/participants/sheet",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = SheetLinkRequest,
    responses(
        (status = 200, description = "Participants loaded from the sheet", body = ParticipantTable),
        (status = 400, description = "Invalid sheet link", body = ErrorResponse),
        (status = 502, description = "Google Sheets request failed", body = ErrorResponse),
        (status = 503, description = "Google access not configured", body = ErrorResponse)
    )
)]
pub async fn load_sheet(
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
    req: web::Json<SheetLinkRequest>,
) -> impl Responder {
    info!("Executing load_sheet handler");
    let result = async {
        data.session(&id).await?;
        let sheet_id = req.sheet_id()?;
        let records =
            load_from_sheet(data.sheets.as_ref(), &sheet_id, &data.config.snapshot_path()).await?;
        data.sheet_cache.invalidate(&sheet_id).await;
        store_table(&data, &id, records, format!("sheet:{}", sheet_id)).await
    }
    .await;

    match result {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Participants",
    post,
    path = "/sessions/{id}/participants/csv",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body(content_type = "multipart/form-data", description = "CSV export in the `file` part"),
    responses(
        (status = 200, description = "Participants loaded from the CSV", body = ParticipantTable),
        (status = 400, description = "Missing or unreadable CSV", body = ErrorResponse)
    )
)]
pub async fn upload_csv(
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
    payload: Multipart,
) -> impl Responder {
    info!("Executing upload_csv handler");
    let result = async {
        data.session(&id).await?;
        let parts = MultipartParser::parse(payload).await?;
        let file = parts.require_file(CSV_FILE_FIELD)?;
        let records = read_participants(file.bytes.as_slice())?;
        info!("Read {} participants from {}", records.len(), file.filename);
        store_table(&data, &id, records, format!("csv:{}", file.filename)).await
    }
    .await;

    match result {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Participants",
    post,
    path = "/sessions/{id}/participants/snapshot",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Participants loaded from the last sheet snapshot", body = ParticipantTable),
        (status = 404, description = "No snapshot or unknown session", body = ErrorResponse)
    )
)]
pub async fn load_cached_snapshot(data: web::Data<AppState>, id: web::Path<Uuid>) -> impl Responder {
    info!("Executing load_cached_snapshot handler");
    let result = async {
        data.session(&id).await?;
        let records = load_snapshot(&data.config.snapshot_path())?;
        store_table(&data, &id, records, "snapshot".to_string()).await
    }
    .await;

    match result {
        Ok(table) => HttpResponse::Ok().json(table),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Participants",
    get,
    path = "/sessions/{id}/signatures/unsigned",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Participants of the table without a stored signature", body = UnsignedNames),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn get_unsigned(data: web::Data<AppState>, id: web::Path<Uuid>) -> impl Responder {
    info!("Executing get_unsigned handler");
    match data.session(&id).await {
        Ok(session) => {
            let names = data.signatures.unsigned_names(&session.read().participants);
            HttpResponse::Ok().json(UnsignedNames { names })
        }
        Err(e) => e.into(),
    }
}
