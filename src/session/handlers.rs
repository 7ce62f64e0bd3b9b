use actix_web::{web, HttpResponse, Responder};
use log::info;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::AppState;
use crate::ErrorResponse;

#[derive(Serialize, ToSchema)]
pub struct SessionCreated {
    pub session_id: Uuid,
}

#[utoipa::path(
    context_path = "/api",
    tag = "Session",
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created", body = SessionCreated)
    )
)]
pub async fn create_session(data: web::Data<AppState>) -> impl Responder {
    info!("Executing create_session handler");
    let session_id = data.sessions.create().await;
    HttpResponse::Created().json(SessionCreated { session_id })
}

#[utoipa::path(
    context_path = "/api",
    tag = "Session",
    delete,
    path = "/sessions/{id}",
    params(
        ("id" = Uuid, Path, description = "Session id")
    ),
    responses(
        (status = 204, description = "Session and its data discarded"),
        (status = 404, description = "Unknown or expired session", body = ErrorResponse)
    )
)]
pub async fn reset_session(data: web::Data<AppState>, id: web::Path<Uuid>) -> impl Responder {
    info!("Executing reset_session handler");
    let id = id.into_inner();
    if data.sessions.reset(&id).await {
        HttpResponse::NoContent().finish()
    } else {
        HttpResponse::NotFound().json(ErrorResponse::not_found(&format!(
            "session {} not found or expired",
            id
        )))
    }
}
