use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use base64::{engine::general_purpose::STANDARD, Engine};
use log::info;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{signing_qr_code, SigningQrCode};
use crate::error::AppError;
use crate::multipart_parser::MultipartParser;
use crate::participant::handlers::{SheetLinkRequest, UnsignedNames};
use crate::state::AppState;
use crate::ErrorResponse;

pub const NAME_FIELD: &str = "name";
pub const IMAGE_FIELD: &str = "file";

/// Raw canvas capture from the signing pad.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignatureSubmission {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// RGBA pixels, row by row, base64 encoded.
    pub rgba_base64: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SavedSignature {
    pub name: String,
    pub file: String,
}

impl SavedSignature {
    fn new(name: &str, path: &std::path::Path) -> Self {
        Self {
            name: name.trim().to_string(),
            file: path
                .file_name()
                .map(|file| file.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Signatures",
    post,
    path = "/qr",
    request_body = SheetLinkRequest,
    responses(
        (status = 200, description = "QR code opening the signing page for the sheet", body = SigningQrCode),
        (status = 400, description = "Invalid sheet link", body = ErrorResponse)
    )
)]
pub async fn create_signing_qr(
    data: web::Data<AppState>,
    req: web::Json<SheetLinkRequest>,
) -> impl Responder {
    info!("Executing create_signing_qr handler");
    let result: Result<SigningQrCode, AppError> = req
        .sheet_id()
        .and_then(|sheet_id| {
            signing_qr_code(&data.config.public_base_url, &sheet_id).map_err(AppError::from)
        });

    match result {
        Ok(code) => HttpResponse::Ok().json(code),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Signatures",
    get,
    path = "/sign/{sheet_id}/participants",
    params(("sheet_id" = String, Path, description = "Google Sheet id from the QR link")),
    responses(
        (status = 200, description = "Participants of the sheet who have not signed yet", body = UnsignedNames),
        (status = 502, description = "Google Sheets request failed", body = ErrorResponse)
    )
)]
pub async fn get_kiosk_participants(
    data: web::Data<AppState>,
    sheet_id: web::Path<String>,
) -> impl Responder {
    info!("Executing get_kiosk_participants handler");
    let result = data
        .sheet_cache
        .get_or_load(data.sheets.as_ref(), &sheet_id, &data.config.snapshot_path())
        .await;

    match result {
        Ok(participants) => HttpResponse::Ok().json(UnsignedNames {
            names: data.signatures.unsigned_names(&participants),
        }),
        Err(e) => AppError::from(e).into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Signatures",
    post,
    path = "/signatures",
    request_body = SignatureSubmission,
    responses(
        (status = 201, description = "Signature stored", body = SavedSignature),
        (status = 400, description = "Invalid name or pixel data", body = ErrorResponse)
    )
)]
pub async fn submit_signature(
    data: web::Data<AppState>,
    req: web::Json<SignatureSubmission>,
) -> impl Responder {
    info!("Executing submit_signature handler");
    let req = req.into_inner();
    let result: Result<SavedSignature, AppError> = STANDARD
        .decode(req.rgba_base64.trim())
        .map_err(|e| AppError::BadRequest(format!("rgba_base64 is not valid base64: {}", e)))
        .and_then(|rgba| {
            let path = data.signatures.save_rgba(&req.name, req.width, req.height, rgba)?;
            Ok(SavedSignature::new(&req.name, &path))
        });

    match result {
        Ok(saved) => HttpResponse::Created().json(saved),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Signatures",
    post,
    path = "/signatures/upload",
    request_body(content_type = "multipart/form-data", description = "`name` field and the signature image in the `file` part"),
    responses(
        (status = 201, description = "Signature stored", body = SavedSignature),
        (status = 400, description = "Missing part or unreadable image", body = ErrorResponse)
    )
)]
pub async fn upload_signature(data: web::Data<AppState>, payload: Multipart) -> impl Responder {
    info!("Executing upload_signature handler");
    let result: Result<SavedSignature, AppError> = async {
        let parts = MultipartParser::parse(payload).await?;
        let name = parts.require_text(NAME_FIELD)?;
        let image = parts.require_file(IMAGE_FIELD)?;
        let path = data.signatures.save_png(name, &image.bytes)?;
        Ok(SavedSignature::new(name, &path))
    }
    .await;

    match result {
        Ok(saved) => HttpResponse::Created().json(saved),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Signatures",
    get,
    path = "/signatures/{name}",
    params(("name" = String, Path, description = "Participant name as on the roster")),
    responses(
        (status = 200, description = "Stored signature"),
        (status = 404, description = "No signature for this name", body = ErrorResponse)
    )
)]
pub async fn get_signature(data: web::Data<AppState>, name: web::Path<String>) -> impl Responder {
    info!("Executing get_signature handler");
    match data.signatures.load(&name) {
        Ok(Some(png)) => HttpResponse::Ok().content_type("image/png").body(png),
        Ok(None) => {
            AppError::NotFound(format!("no signature stored for '{}'", name.as_str())).into()
        }
        Err(e) => AppError::from(e).into(),
    }
}
