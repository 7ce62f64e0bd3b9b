//! Settlement submission: bundle the documents, upload the archive, notify the treasurer.

pub mod archive;
pub mod handlers;
pub mod notify;

use serde::Serialize;
use std::path::Path;
use utoipa::ToSchema;

use crate::google::ArchiveUploader;
use crate::multipart_parser::{MultipartParseError, ParsedMultipart, UploadedFile};
use crate::session::StoredDocument;
pub use archive::{safe_event_name, write_archive, ArchiveError, NamedFile, SubmissionBundle};
pub use notify::{LogNotifier, Notification, Notifier, NotifyError, ResendNotifier};

pub const EVENT_NAME_FIELD: &str = "event_name";
pub const PARTICIPANT_LIST_FIELD: &str = "participant_list";
pub const SETTLEMENT_FORM_FIELD: &str = "settlement_form";
pub const REPORT_FIELD: &str = "report";
pub const INVOICE_FIELD_PREFIX: &str = "invoice";

impl From<UploadedFile> for NamedFile {
    fn from(file: UploadedFile) -> Self {
        NamedFile::new(file.filename, file.bytes)
    }
}

impl From<StoredDocument> for NamedFile {
    fn from(document: StoredDocument) -> Self {
        NamedFile::new(document.filename, document.bytes)
    }
}

/// Builds the bundle from the form parts. A `report` part overrides the session report.
pub fn bundle_from_parts(
    mut parts: ParsedMultipart,
    session_report: Option<StoredDocument>,
) -> Result<SubmissionBundle, MultipartParseError> {
    let event_name = parts.require_text(EVENT_NAME_FIELD)?.to_string();
    let participant_list = parts
        .take_file(PARTICIPANT_LIST_FIELD)
        .ok_or_else(|| MultipartParseError::MissingPart(PARTICIPANT_LIST_FIELD.to_string()))?;
    let settlement_form = parts
        .take_file(SETTLEMENT_FORM_FIELD)
        .ok_or_else(|| MultipartParseError::MissingPart(SETTLEMENT_FORM_FIELD.to_string()))?;
    let report: NamedFile = match parts.take_file(REPORT_FIELD) {
        Some(file) => NamedFile::new(crate::report::uploaded_report_name(&file.filename), file.bytes),
        None => session_report
            .map(NamedFile::from)
            .ok_or_else(|| MultipartParseError::MissingPart(REPORT_FIELD.to_string()))?,
    };
    let invoices = parts
        .files_with_prefix(INVOICE_FIELD_PREFIX)
        .into_iter()
        .cloned()
        .map(NamedFile::from)
        .collect();

    Ok(SubmissionBundle {
        event_name,
        participant_list: participant_list.into(),
        settlement_form: settlement_form.into(),
        report,
        invoices,
    })
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionArchive {
    pub filename: String,
    pub event_name: String,
    pub invoices: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubmissionOutcome {
    pub archive: String,
    pub drive_link: Option<String>,
    pub upload_error: Option<String>,
    pub notified: bool,
    pub notify_error: Option<String>,
}

impl SubmissionOutcome {
    /// Uploaded and notified.
    pub fn is_complete(&self) -> bool {
        self.drive_link.is_some() && self.notified
    }
}

/// Uploads the archive, then sends the notification either with the link or
/// with the upload failure. Neither failure aborts the other step.
pub async fn upload_and_notify(
    uploader: &dyn ArchiveUploader,
    notifier: &dyn Notifier,
    archive: &Path,
    event_name: &str,
) -> SubmissionOutcome {
    let (drive_link, upload_error) = match uploader.upload_archive(archive).await {
        Ok(link) => {
            log::info!("Archive {} uploaded: {}", archive.display(), link);
            (Some(link), None)
        }
        Err(e) => {
            log::error!("Drive upload of {} failed: {}", archive.display(), e);
            (None, Some(e.to_string()))
        }
    };

    let notification = Notification::settlement_uploaded(event_name, drive_link.as_deref());
    let (notified, notify_error) = match notifier.send(&notification).await {
        Ok(()) => (true, None),
        Err(e) => {
            log::error!("Settlement notification for '{}' failed: {}", event_name, e);
            (false, Some(e.to_string()))
        }
    };

    SubmissionOutcome {
        archive: archive
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default(),
        drive_link,
        upload_error,
        notified,
        notify_error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(field: &str, filename: &str) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            filename: filename.to_string(),
            bytes: filename.as_bytes().to_vec(),
        }
    }

    fn parts() -> ParsedMultipart {
        let mut parts = ParsedMultipart::default();
        parts.fields.insert(EVENT_NAME_FIELD.to_string(), "Canyoning".to_string());
        parts.files.push(file(PARTICIPANT_LIST_FIELD, "Teilnehmerliste.pdf"));
        parts.files.push(file(SETTLEMENT_FORM_FIELD, "Abrechnung.pdf"));
        parts.files.push(file("invoices", "bus.pdf"));
        parts.files.push(file("invoices", "eintritt.pdf"));
        parts
    }

    fn session_report() -> StoredDocument {
        StoredDocument {
            filename: "Erfahrungsbericht_Canyoning.pdf".to_string(),
            bytes: b"%PDF".to_vec(),
        }
    }

    #[test]
    fn test_bundle_uses_session_report() {
        let bundle = bundle_from_parts(parts(), Some(session_report())).unwrap();
        assert_eq!(bundle.event_name, "Canyoning");
        assert_eq!(bundle.report.name, "Erfahrungsbericht_Canyoning.pdf");
        assert_eq!(bundle.invoices.len(), 2);
        assert_eq!(bundle.invoices[1].name, "eintritt.pdf");
    }

    #[test]
    fn test_uploaded_report_overrides_session() {
        let mut parts = parts();
        parts.files.push(file(REPORT_FIELD, "bericht.docx"));
        let bundle = bundle_from_parts(parts, Some(session_report())).unwrap();
        assert_eq!(bundle.report.name, "Erfahrungsbericht_bericht.docx");
    }

    #[test]
    fn test_missing_parts() {
        assert!(matches!(
            bundle_from_parts(parts(), None),
            Err(MultipartParseError::MissingPart(part)) if part == REPORT_FIELD
        ));

        let mut without_form = parts();
        without_form.files.retain(|f| f.field != SETTLEMENT_FORM_FIELD);
        assert!(matches!(
            bundle_from_parts(without_form, Some(session_report())),
            Err(MultipartParseError::MissingPart(part)) if part == SETTLEMENT_FORM_FIELD
        ));

        let mut without_name = parts();
        without_name.fields.clear();
        assert!(bundle_from_parts(without_name, Some(session_report())).is_err());
    }
}
