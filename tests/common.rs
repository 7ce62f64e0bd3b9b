#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

use iclub_eventtool::google::{
    ArchiveUploader, EventForm, FormPublisher, GoogleApiError, PublishedForm, SheetSource,
};
use iclub_eventtool::participant::RawTable;
use iclub_eventtool::pdf::FontSetup;
use iclub_eventtool::report::{ChatModel, ReportError};
use iclub_eventtool::submission::{LogNotifier, Notification, Notifier, NotifyError};
use iclub_eventtool::{AppConfig, AppState, Services};

pub const PUBLIC_BASE_URL: &str = "https://eventtool.example.org";
pub const SHEET_ID: &str = "1AbCdEfGhIjKlMnOpQrStUvWxYz";
pub const DRIVE_LINK: &str = "https://drive.google.com/file/d/mock-upload/view";
pub const BOUNDARY: &str = "----eventtool-test-boundary";

fn cells(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Sign-up sheet as exported by the Google Form: one duplicate, one tutor,
/// one participant in the special category.
pub fn signup_sheet() -> RawTable {
    RawTable::new(
        cells(&[
            "Zeitstempel",
            "First Name",
            "Last Name",
            "Phone Number",
            "Country of Origin",
            "Exchange Type",
            "E-Mail-Adresse",
        ]),
        vec![
            cells(&["01.05.2024", "Max", "Mustermann", "0151", "Germany", "ERASMUS", "max@example.org"]),
            cells(&["01.05.2024", "Erika", "Musterfrau", "0152", "Austria", "TUTOR", "erika@example.org"]),
            cells(&["02.05.2024", "Max", "Mustermann", "0151", "Germany", "ERASMUS", "max@example.org"]),
            cells(&["03.05.2024", "Lea", "Lang", "", "Brazil", "Nothing of the above", "lea@example.org"]),
        ],
    )
}

pub struct MockSheets {
    tables: HashMap<String, RawTable>,
    pub calls: AtomicUsize,
}

impl MockSheets {
    pub fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(SHEET_ID.to_string(), signup_sheet());
        Self {
            tables,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SheetSource for MockSheets {
    async fn fetch_table(&self, sheet_id: &str) -> Result<RawTable, GoogleApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.tables
            .get(sheet_id)
            .cloned()
            .ok_or_else(|| GoogleApiError::Api {
                status: 404,
                body: "Requested entity was not found.".to_string(),
            })
    }
}

#[derive(Default)]
pub struct MockForms {
    pub published: Mutex<Vec<EventForm>>,
}

#[async_trait]
impl FormPublisher for MockForms {
    async fn publish_form(&self, form: &EventForm) -> Result<PublishedForm, GoogleApiError> {
        self.published.lock().push(form.clone());
        Ok(PublishedForm::from_id("form-123"))
    }
}

#[derive(Default)]
pub struct MockUploader {
    pub fail: bool,
    pub uploads: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ArchiveUploader for MockUploader {
    async fn upload_archive(&self, path: &Path) -> Result<String, GoogleApiError> {
        self.uploads.lock().push(path.to_path_buf());
        if self.fail {
            return Err(GoogleApiError::Api {
                status: 403,
                body: "The user does not have sufficient permissions for this file.".to_string(),
            });
        }
        Ok(DRIVE_LINK.to_string())
    }
}

#[derive(Default)]
pub struct MockNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

pub struct MockChat {
    pub answer: String,
}

#[async_trait]
impl ChatModel for MockChat {
    async fn complete(&self, _prompt: &str) -> Result<String, ReportError> {
        Ok(self.answer.clone())
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }
}

pub const REPORT_TEXT: &str = "Der Stammtisch war gut besucht.\n\nDas Fazit fällt positiv aus.";

pub struct TestContext {
    pub dir: TempDir,
    pub state: web::Data<AppState>,
    pub sheets: Arc<MockSheets>,
    pub forms: Arc<MockForms>,
    pub uploader: Arc<MockUploader>,
    pub notifier: Arc<MockNotifier>,
}

pub struct ContextOptions {
    pub upload_fails: bool,
    pub chat_answer: String,
    /// Wire the log-only notifier instead of the recording mock.
    pub mail_unconfigured: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            upload_fails: false,
            chat_answer: REPORT_TEXT.to_string(),
            mail_unconfigured: false,
        }
    }
}

pub fn test_context() -> TestContext {
    test_context_with(ContextOptions::default())
}

pub fn test_context_with(options: ContextOptions) -> TestContext {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig {
        data_dir: dir.path().join("data"),
        signature_dir: dir.path().join("signatures"),
        output_dir: dir.path().join("output"),
        font_dir: dir.path().join("fonts"),
        public_base_url: PUBLIC_BASE_URL.to_string(),
        ..AppConfig::default()
    };

    let sheets = Arc::new(MockSheets::new());
    let forms = Arc::new(MockForms::default());
    let uploader = Arc::new(MockUploader {
        fail: options.upload_fails,
        ..MockUploader::default()
    });
    let notifier = Arc::new(MockNotifier::default());
    let active_notifier: Arc<dyn Notifier> = if options.mail_unconfigured {
        Arc::new(LogNotifier)
    } else {
        notifier.clone()
    };
    let services = Services {
        sheets: sheets.clone(),
        forms: forms.clone(),
        uploader: uploader.clone(),
        notifier: active_notifier,
        chat: Arc::new(MockChat {
            answer: options.chat_answer,
        }),
    };

    TestContext {
        state: web::Data::new(AppState::new(config, services, FontSetup::fallback())),
        dir,
        sheets,
        forms,
        uploader,
        notifier,
    }
}

pub fn sheet_url() -> String {
    format!("https://docs.google.com/spreadsheets/d/{}/edit#gid=0", SHEET_ID)
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

/// Hand-built `multipart/form-data` body.
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    for (name, filename, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
