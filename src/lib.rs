use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{http::header, web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

pub mod config;
pub mod error;
pub mod google;
pub mod invitation;
pub mod multipart_parser;
pub mod participant;
pub mod participant_list;
pub mod pdf;
pub mod report;
pub mod session;
pub mod signature;
pub mod state;
pub mod submission;
pub mod validation;

pub use crate::config::AppConfig;
pub use crate::error::AppError;
pub use crate::state::{AppState, Services};

const JSON_LIMIT_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_type: &str, message: &str) -> Self {
        Self {
            error: error_type.to_string(),
            message: message.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn not_found(message: &str) -> Self {
        Self::new("NotFound", message)
    }

    pub fn bad_request(message: &str) -> Self {
        Self::new("BadRequest", message)
    }

    pub fn internal_error(message: &str) -> Self {
        Self::new("InternalServerError", message)
    }

    pub fn bad_gateway(message: &str) -> Self {
        Self::new("BadGateway", message)
    }

    pub fn service_unavailable(message: &str) -> Self {
        Self::new("ServiceUnavailable", message)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::session::handlers::create_session,
        crate::session::handlers::reset_session,
        crate::participant::handlers::get_participants,
        crate::participant::handlers::load_sheet,
        crate::participant::handlers::upload_csv,
        crate::participant::handlers::load_cached_snapshot,
        crate::participant::handlers::get_unsigned,
        crate::participant_list::handlers::create_participant_list,
        crate::participant_list::handlers::download_participant_list,
        crate::report::handlers::create_report,
        crate::report::handlers::upload_report,
        crate::report::handlers::download_report,
        crate::submission::handlers::create_submission,
        crate::submission::handlers::upload_submission,
        crate::submission::handlers::download_submission,
        crate::invitation::handlers::create_invitation,
        crate::signature::handlers::create_signing_qr,
        crate::signature::handlers::get_kiosk_participants,
        crate::signature::handlers::submit_signature,
        crate::signature::handlers::upload_signature,
        crate::signature::handlers::get_signature
    ),
    components(
        schemas(
            ErrorResponse,
            session::handlers::SessionCreated,
            participant::ParticipantRecord,
            participant::handlers::SheetLinkRequest,
            participant::handlers::ParticipantTable,
            participant::handlers::UnsignedNames,
            participant_list::ParticipantListRequest,
            report::ReportRequest,
            report::ReportResponse,
            report::handlers::StoredReport,
            submission::SubmissionArchive,
            submission::SubmissionOutcome,
            invitation::InvitationRequest,
            invitation::InvitationResponse,
            google::PublishedForm,
            signature::SigningQrCode,
            signature::handlers::SignatureSubmission,
            signature::handlers::SavedSignature,
        )
    ),
    tags(
        (name = "Session", description = "Operator workflow sessions."),
        (name = "Participants", description = "Loading and inspecting the participant table."),
        (name = "Participant List", description = "Printable participant list PDF."),
        (name = "Report", description = "Experience report."),
        (name = "Submission", description = "Settlement archive, Drive upload and notification."),
        (name = "Invitation", description = "Sign-up form and invitation text."),
        (name = "Signatures", description = "Signing kiosk, QR code and stored signatures.")
    )
)]
pub struct ApiDoc;

/// Every `/api` route, shared by the server and the integration tests.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use crate::{
        invitation::handlers as invitation, participant::handlers as participants,
        participant_list::handlers as participant_list, report::handlers as report,
        session::handlers as session, signature::handlers as signature,
        submission::handlers as submission,
    };

    cfg.service(web::resource("/sessions").route(web::post().to(session::create_session)))
        .service(
            web::resource("/sessions/{id}").route(web::delete().to(session::reset_session)),
        )
        .service(
            web::resource("/sessions/{id}/participants")
                .route(web::get().to(participants::get_participants)),
        )
        .service(
            web::resource("/sessions/{id}/participants/sheet")
                .route(web::post().to(participants::load_sheet)),
        )
        .service(
            web::resource("/sessions/{id}/participants/csv")
                .route(web::post().to(participants::upload_csv)),
        )
        .service(
            web::resource("/sessions/{id}/participants/snapshot")
                .route(web::post().to(participants::load_cached_snapshot)),
        )
        .service(
            web::resource("/sessions/{id}/signatures/unsigned")
                .route(web::get().to(participants::get_unsigned)),
        )
        .service(
            web::resource("/sessions/{id}/participant-list")
                .route(web::get().to(participant_list::download_participant_list))
                .route(web::post().to(participant_list::create_participant_list)),
        )
        .service(
            web::resource("/sessions/{id}/report")
                .route(web::get().to(report::download_report))
                .route(web::post().to(report::create_report)),
        )
        .service(
            web::resource("/sessions/{id}/report/upload")
                .route(web::post().to(report::upload_report)),
        )
        .service(
            web::resource("/sessions/{id}/submission")
                .route(web::get().to(submission::download_submission))
                .route(web::post().to(submission::create_submission)),
        )
        .service(
            web::resource("/sessions/{id}/submission/upload")
                .route(web::post().to(submission::upload_submission)),
        )
        .service(web::resource("/forms").route(web::post().to(invitation::create_invitation)))
        .service(web::resource("/qr").route(web::post().to(signature::create_signing_qr)))
        .service(
            web::resource("/sign/{sheet_id}/participants")
                .route(web::get().to(signature::get_kiosk_participants)),
        )
        .service(
            web::resource("/signatures").route(web::post().to(signature::submit_signature)),
        )
        .service(
            web::resource("/signatures/upload")
                .route(web::post().to(signature::upload_signature)),
        )
        .service(
            web::resource("/signatures/{name}").route(web::get().to(signature::get_signature)),
        );
}

/// JSON body limit; raw signature captures are larger than the default.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().limit(JSON_LIMIT_BYTES)
}

pub async fn run() -> anyhow::Result<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        unsafe {
            std::env::set_var("RUST_LOG", "info");
        }
    }
    env_logger::init();

    let config = AppConfig::from_env()?;
    let bind_addr = config.bind_addr.clone();
    let mut origins = vec![
        config.public_base_url.trim_end_matches('/').to_string(),
        "http://localhost:5173".to_string(),
        "http://localhost:8080".to_string(),
        "http://127.0.0.1:8080".to_string(),
    ];
    origins.dedup();

    let app_state = match AppState::from_config(config) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            log::error!("Failed to initialise the event tool. Check your .env settings. Error: {}", e);
            return Err(e);
        }
    };

    let prometheus = PrometheusMetricsBuilder::new("iclub_eventtool")
        .endpoint("/metrics")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create Prometheus metrics middleware: {}", e))?;

    log::info!("Starting server at http://{}", bind_addr);

    HttpServer::new(move || {
        let app_state = app_state.clone();
        let prometheus = prometheus.clone();
        let origins = origins.clone();
        let cors = Cors::default()
            .allowed_origin_fn(move |origin, _| {
                origin
                    .to_str()
                    .map(|origin| origins.iter().any(|allowed| allowed == origin))
                    .unwrap_or(false)
            })
            .allowed_methods(vec!["GET", "POST", "DELETE", "OPTIONS"])
            .allowed_headers(vec![header::ACCEPT, header::CONTENT_TYPE])
            .expose_headers(vec![header::CONTENT_DISPOSITION])
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus)
            .wrap(cors)
            .app_data(app_state)
            .app_data(json_config())
            .service(web::scope("/api").configure(routes))
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
