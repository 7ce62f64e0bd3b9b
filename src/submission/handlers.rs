use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use chrono::Local;
use log::{info, warn};
use uuid::Uuid;

use super::{bundle_from_parts, upload_and_notify, write_archive, SubmissionArchive, SubmissionOutcome};
use crate::error::AppError;
use crate::multipart_parser::MultipartParser;
use crate::state::AppState;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Submission",
    post,
    path = "/sessions/{id}/submission",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body(
        content_type = "multipart/form-data",
        description = "`event_name`, `participant_list`, `settlement_form`, optional `report`, any number of `invoice*` files"
    ),
    responses(
        (status = 200, description = "Settlement archive written", body = SubmissionArchive),
        (status = 400, description = "Missing form part", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn create_submission(
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
    payload: Multipart,
) -> impl Responder {
    info!("Executing create_submission handler");
    let result: Result<SubmissionArchive, AppError> = async {
        let session = data.session(&id).await?;
        let parts = MultipartParser::parse(payload).await?;
        let session_report = session.read().report.clone();
        let bundle = bundle_from_parts(parts, session_report)?;
        let path = write_archive(&bundle, &data.config.output_dir, Local::now())?;

        let archive = SubmissionArchive {
            filename: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            event_name: bundle.event_name.clone(),
            invoices: bundle.invoices.len(),
        };
        let mut session = session.write();
        session.submission_zip = Some(path);
        session.submission_event = Some(bundle.event_name);
        Ok(archive)
    }
    .await;

    match result {
        Ok(archive) => HttpResponse::Ok().json(archive),
        Err(e) => e.into(),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Submission",
    post,
    path = "/sessions/{id}/submission/upload",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Upload and notification outcome; failures are reported per step", body = SubmissionOutcome),
        (status = 404, description = "No archive built or unknown session", body = ErrorResponse)
    )
)]
pub async fn upload_submission(data: web::Data<AppState>, id: web::Path<Uuid>) -> impl Responder {
    info!("Executing upload_submission handler");
    let session = match data.session(&id).await {
        Ok(session) => session,
        Err(e) => return HttpResponse::from(e),
    };
    let pending = {
        let session = session.read();
        session.submission_zip.clone().zip(session.submission_event.clone())
    };
    let Some((archive, event_name)) = pending else {
        return HttpResponse::from(AppError::NotFound(
            "no settlement archive built in this session".to_string(),
        ));
    };

    let outcome = upload_and_notify(
        data.uploader.as_ref(),
        data.notifier.as_ref(),
        &archive,
        &event_name,
    )
    .await;

    if outcome.is_complete() {
        session.write().clear_submission();
    } else {
        warn!(
            "Submission for '{}' incomplete; archive kept at {}",
            event_name,
            archive.display()
        );
    }
    HttpResponse::Ok().json(outcome)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Submission",
    get,
    path = "/sessions/{id}/submission",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Settlement archive of this session"),
        (status = 404, description = "No archive built or unknown session", body = ErrorResponse)
    )
)]
pub async fn download_submission(
    request: HttpRequest,
    data: web::Data<AppState>,
    id: web::Path<Uuid>,
) -> HttpResponse {
    info!("Executing download_submission handler");
    let path = match data.session(&id).await {
        Ok(session) => session.read().submission_zip.clone(),
        Err(e) => return e.into(),
    };
    let Some(path) = path else {
        return AppError::NotFound("no settlement archive built in this session".to_string()).into();
    };

    match actix_files::NamedFile::open_async(&path).await {
        Ok(file) => file.into_response(&request),
        Err(e) => {
            warn!("Settlement archive {} is gone: {}", path.display(), e);
            AppError::NotFound(format!("settlement archive {} no longer exists", path.display())).into()
        }
    }
}
