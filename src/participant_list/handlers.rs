use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use log::{info, warn};
use uuid::Uuid;

use super::{generate, GeneratedList, ListAssets, ParticipantListRequest};
use crate::error::AppError;
use crate::participant::deduplicate;
use crate::state::AppState;
use crate::validation::Validator;
use crate::ErrorResponse;

fn render_for_session(
    data: &AppState,
    participants: Vec<crate::participant::ParticipantRecord>,
    req: &ParticipantListRequest,
) -> Result<GeneratedList, AppError> {
    req.validate()?;
    let (participants, removed) = deduplicate(participants);
    if removed > 0 {
        info!("Skipping {} duplicate participants in the list", removed);
    }
    if participants.is_empty() {
        return Err(AppError::NoParticipants);
    }

    let logo_path = data.config.logo_path();
    let assets = ListAssets {
        fonts: &data.fonts,
        signatures: &data.signatures,
        logo_path: &logo_path,
    };
    Ok(generate(
        &participants,
        &req.details(&participants),
        &req.paid_set(&participants),
        &assets,
        &data.config.output_dir,
        data.config.require_embedded_font,
    )?)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Participant List",
    post,
    path = "/sessions/{id}/participant-list",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = ParticipantListRequest,
    responses(
        (status = 200, description = "Rendered participant list"),
        (status = 400, description = "Missing event name or no participants loaded", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 503, description = "Embedded font required but missing", body = ErrorResponse)
    )
)]
pub async fn create_participant_list(
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
    req: web::Json<ParticipantListRequest>,
) -> impl Responder {
    info!("Executing create_participant_list handler");
    let session = match data.session(&id).await {
        Ok(session) => session,
        Err(e) => return HttpResponse::from(e),
    };
    let participants = session.read().participants.clone();

    match render_for_session(&data, participants, &req) {
        Ok(list) => {
            session.write().participant_list = Some(list.path.clone());
            HttpResponse::Ok()
                .content_type("application/pdf")
                .insert_header(header::ContentDisposition::attachment(list.filename.clone()))
                .insert_header(("X-Page-Count", list.pages.to_string()))
                .body(list.pdf)
        }
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Participant List",
    get,
    path = "/sessions/{id}/participant-list",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Last participant list generated in this session"),
        (status = 404, description = "Nothing generated yet or unknown session", body = ErrorResponse)
    )
)]
pub async fn download_participant_list(
    request: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> HttpResponse {
    info!("Executing download_participant_list handler");
    let path = match data.session(&id).await {
        Ok(session) => session.read().participant_list.clone(),
        Err(e) => return e.into(),
    };
    let Some(path) = path else {
        return AppError::NotFound("no participant list generated in this session".to_string()).into();
    };

    match actix_files::NamedFile::open_async(&path).await {
        Ok(file) => file.into_response(&request),
        Err(e) => {
            warn!("Participant list {} is gone: {}", path.display(), e);
            AppError::NotFound(format!("participant list {} no longer exists", path.display())).into()
        }
    }
}
