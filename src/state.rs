use std::sync::Arc;

use crate::config::AppConfig;
use crate::google::{
    AccessTokenSource, ArchiveUploader, FormPublisher, GoogleWorkspace, ServiceAccountAuth,
    SheetSource, StaticToken,
};
use crate::participant::SheetCache;
use crate::pdf::fonts::FontSetup;
use crate::report::chat::{ChatModel, OllamaChat};
use crate::session::{SessionStore, SharedSession};
use crate::signature::SignatureStore;
use crate::submission::{LogNotifier, Notifier, ResendNotifier};
use crate::error::AppError;

/// External collaborators behind trait objects, swappable in tests.
#[derive(Clone)]
pub struct Services {
    pub sheets: Arc<dyn SheetSource>,
    pub forms: Arc<dyn FormPublisher>,
    pub uploader: Arc<dyn ArchiveUploader>,
    pub notifier: Arc<dyn Notifier>,
    pub chat: Arc<dyn ChatModel>,
}

pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub signatures: SignatureStore,
    pub sheet_cache: SheetCache,
    pub fonts: FontSetup,
    pub sheets: Arc<dyn SheetSource>,
    pub forms: Arc<dyn FormPublisher>,
    pub uploader: Arc<dyn ArchiveUploader>,
    pub notifier: Arc<dyn Notifier>,
    pub chat: Arc<dyn ChatModel>,
}

impl AppState {
    pub fn new(config: AppConfig, services: Services, fonts: FontSetup) -> Self {
        Self {
            sessions: SessionStore::new(config.session_idle),
            signatures: SignatureStore::new(config.signature_dir.clone()),
            sheet_cache: SheetCache::new(config.sheet_cache_ttl),
            fonts,
            sheets: services.sheets,
            forms: services.forms,
            uploader: services.uploader,
            notifier: services.notifier,
            chat: services.chat,
            config,
        }
    }

    /// Wires the real Google, mail and chat clients from the configuration.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("iclub-eventtool/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let tokens = token_source(&config, &http_client)?;
        let google = Arc::new(GoogleWorkspace::new(
            http_client.clone(),
            tokens,
            config.forms_drive_folder_id.clone(),
            config.submission_drive_folder_id.clone(),
        ));

        let notifier: Arc<dyn Notifier> = match (
            &config.resend_api_key,
            &config.notify_sender,
            &config.notify_recipient,
        ) {
            (Some(key), Some(sender), Some(recipient)) => Arc::new(ResendNotifier::new(
                http_client.clone(),
                key.clone(),
                sender.clone(),
                recipient.clone(),
            )),
            _ => {
                log::warn!("RESEND_API_KEY, NOTIFY_SENDER or NOTIFY_RECIPIENT missing; notifications are only logged");
                Arc::new(LogNotifier)
            }
        };

        let chat = Arc::new(OllamaChat::new(
            http_client,
            config.ollama_url.clone(),
            config.ollama_model.clone(),
        ));

        let fonts = FontSetup::load(&config.font_dir);
        match fonts.fallback_reason() {
            None => log::info!("Embedded fonts loaded from {}", config.font_dir.display()),
            Some(reason) => log::warn!("PDFs will use the built-in font: {}", reason),
        }

        let services = Services {
            sheets: google.clone(),
            forms: google.clone(),
            uploader: google,
            notifier,
            chat,
        };
        Ok(Self::new(config, services, fonts))
    }

    /// Looks up a live session or fails with `SessionNotFound`.
    pub async fn session(&self, id: &uuid::Uuid) -> Result<SharedSession, AppError> {
        self.sessions
            .get(id)
            .await
            .ok_or(AppError::SessionNotFound(*id))
    }
}

fn token_source(
    config: &AppConfig,
    client: &reqwest::Client,
) -> anyhow::Result<Option<Arc<dyn AccessTokenSource>>> {
    if let Some(path) = &config.google_service_account_key {
        let auth = ServiceAccountAuth::from_file(path, client.clone())?;
        log::info!("Google service account {} loaded", auth.client_email());
        return Ok(Some(Arc::new(auth)));
    }
    if let Some(json) = &config.google_service_account_json {
        let auth = ServiceAccountAuth::from_json(json, client.clone())?;
        log::info!("Google service account {} loaded", auth.client_email());
        return Ok(Some(Arc::new(auth)));
    }
    if let Some(token) = &config.google_access_token {
        log::info!("Using the configured Google access token");
        return Ok(Some(Arc::new(StaticToken::new(token.clone()))));
    }
    log::warn!("No Google credentials configured; sheet, form and Drive requests will fail");
    Ok(None)
}
