//! Runtime configuration loaded from the environment (and `.env` via dotenvy).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for the whole service. Optional integrations stay `None` until configured.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
    pub signature_dir: PathBuf,
    pub output_dir: PathBuf,
    pub font_dir: PathBuf,
    pub require_embedded_font: bool,
    pub public_base_url: String,
    pub google_service_account_key: Option<PathBuf>,
    pub google_service_account_json: Option<String>,
    pub google_access_token: Option<String>,
    pub forms_drive_folder_id: Option<String>,
    pub submission_drive_folder_id: Option<String>,
    pub resend_api_key: Option<String>,
    pub notify_sender: Option<String>,
    pub notify_recipient: Option<String>,
    pub ollama_url: String,
    pub ollama_model: String,
    pub sheet_cache_ttl: Duration,
    pub session_idle: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            data_dir: PathBuf::from("data"),
            signature_dir: PathBuf::from("signatures"),
            output_dir: PathBuf::from("output"),
            font_dir: PathBuf::from("fonts"),
            require_embedded_font: false,
            public_base_url: "http://localhost:8080".to_string(),
            google_service_account_key: None,
            google_service_account_json: None,
            google_access_token: None,
            forms_drive_folder_id: None,
            submission_drive_folder_id: None,
            resend_api_key: None,
            notify_sender: None,
            notify_recipient: None,
            ollama_url: "http://localhost:11434".to_string(),
            ollama_model: "llama3".to_string(),
            sheet_cache_ttl: Duration::from_secs(300),
            session_idle: Duration::from_secs(12 * 60 * 60),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
            data_dir: env_path("DATA_DIR").unwrap_or(defaults.data_dir),
            signature_dir: env_path("SIGNATURE_DIR").unwrap_or(defaults.signature_dir),
            output_dir: env_path("OUTPUT_DIR").unwrap_or(defaults.output_dir),
            font_dir: env_path("FONT_DIR").unwrap_or(defaults.font_dir),
            require_embedded_font: env_flag("REQUIRE_EMBEDDED_FONT")?,
            public_base_url: env_or("PUBLIC_BASE_URL", defaults.public_base_url),
            google_service_account_key: env_path("GOOGLE_SERVICE_ACCOUNT_KEY"),
            google_service_account_json: env_opt("GOOGLE_SERVICE_ACCOUNT_JSON"),
            google_access_token: env_opt("GOOGLE_ACCESS_TOKEN"),
            forms_drive_folder_id: env_opt("FORMS_DRIVE_FOLDER_ID"),
            submission_drive_folder_id: env_opt("SUBMISSION_DRIVE_FOLDER_ID"),
            resend_api_key: env_opt("RESEND_API_KEY"),
            notify_sender: env_opt("NOTIFY_SENDER"),
            notify_recipient: env_opt("NOTIFY_RECIPIENT"),
            ollama_url: env_or("OLLAMA_URL", defaults.ollama_url),
            ollama_model: env_or("OLLAMA_MODEL", defaults.ollama_model),
            sheet_cache_ttl: env_secs("SHEET_CACHE_TTL_SECS")?.unwrap_or(defaults.sheet_cache_ttl),
            session_idle: env_secs("SESSION_IDLE_SECS")?.unwrap_or(defaults.session_idle),
        })
    }

    /// Location of the cached participant snapshot.
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join("teilnehmer.csv")
    }

    pub fn logo_path(&self) -> PathBuf {
        self.data_dir.join("I-CLUB_LOGO.png")
    }
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn env_or(key: &str, default: String) -> String {
    env_opt(key).unwrap_or(default)
}

fn env_path(key: &str) -> Option<PathBuf> {
    env_opt(key).map(PathBuf::from)
}

fn env_flag(key: &str) -> anyhow::Result<bool> {
    match env_opt(key).as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(other) => anyhow::bail!("{key} must be a boolean, got '{other}'"),
    }
}

fn env_secs(key: &str) -> anyhow::Result<Option<Duration>> {
    env_opt(key)
        .map(|raw| {
            raw.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| anyhow::anyhow!("{key} must be a number of seconds: {e}"))
        })
        .transpose()
}
