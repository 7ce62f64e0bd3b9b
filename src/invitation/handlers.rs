use actix_web::{web, HttpResponse, Responder};
use log::info;

use super::{InvitationRequest, InvitationResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::Validator;
use crate::ErrorResponse;

#[utoipa::path(
    context_path = "/api",
    tag = "Invitation",
    post,
    path = "/forms",
    request_body = InvitationRequest,
    responses(
        (status = 200, description = "Sign-up form created", body = InvitationResponse),
        (status = 400, description = "Missing event details", body = ErrorResponse),
        (status = 502, description = "Google Forms request failed", body = ErrorResponse),
        (status = 503, description = "Google access not configured", body = ErrorResponse)
    )
)]
pub async fn create_invitation(
    data: web::Data<AppState>,
    req: web::Json<InvitationRequest>,
) -> impl Responder {
    info!("Executing create_invitation handler");
    let result: Result<InvitationResponse, AppError> = async {
        req.validate()?;
        let form = data.forms.publish_form(&req.event_form()).await?;
        info!("Published sign-up form {} for '{}'", form.form_id, req.title.trim());
        Ok(InvitationResponse {
            whatsapp_message: req.whatsapp_message(&form.view_url),
            form,
        })
    }
    .await;

    match result {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.into(),
    }
}
