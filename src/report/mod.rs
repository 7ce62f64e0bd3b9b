//! Experience report written by a chat model from the organiser's notes.

pub mod chat;
pub mod document;
pub mod handlers;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::pdf::{FontSetup, PdfError};
use crate::session::StoredDocument;
use crate::signature::slugify;
use crate::validation::{validate_required, ValidationErrors, Validator};
pub use chat::{ChatModel, OllamaChat};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("chat model is unreachable: {0}")]
    Unavailable(#[source] reqwest::Error),
    #[error("chat model returned HTTP {status}: {body}")]
    Api { status: u16, body: String },
    #[error("chat model returned no text")]
    EmptyAnswer,
    #[error(transparent)]
    Pdf(#[from] PdfError),
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ReportRequest {
    pub event_title: String,
    /// Notes or free text describing how the event went.
    pub notes: String,
}

impl Validator for ReportRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.event_title, "event_title", "Event title", &mut errors);
        validate_required(&self.notes, "notes", "Report notes", &mut errors);
        errors.into_result()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReportResponse {
    pub filename: String,
    pub text: String,
    pub model: String,
}

pub fn build_prompt(event_title: &str, notes: &str) -> String {
    format!(
        "Erstelle einen kurzen, prägnanten und professionellen Erfahrungsbericht von etwa einer halben Seite (ca. 150-250 Wörter) \
basierend auf den folgenden Stichpunkten und Informationen.
Der Bericht ist für interne Zwecke und soll einen guten Überblick über das Event geben.
Stil: Sachlich, positiv (wenn möglich), aber auch ehrliche Nennung von Problemen, falls vorhanden.
Struktur: Kurze Einleitung, Hauptteil (Ablauf, Highlights, ggf. Probleme), kurzes Fazit/Ausblick.
Event-Titel: {event_title}
Stichpunkte/Freitext:
---
{notes}
---
Bitte generiere nur den reinen Text für den Bericht, ohne zusätzliche Anmerkungen wie \"Hier ist der Bericht:\" etc.
Beginne direkt mit dem Berichtstext. Achte auf eine klare Absatzstruktur.",
        event_title = event_title.trim(),
        notes = notes.trim(),
    )
}

/// `Erfahrungsbericht_<title>.pdf`, the title reduced to alphanumerics, `_` and `-`.
pub fn report_file_name(event_title: &str) -> String {
    let title = slugify(event_title);
    if title.is_empty() {
        "Erfahrungsbericht.pdf".to_string()
    } else {
        format!("Erfahrungsbericht_{}.pdf", title)
    }
}

/// Name under which a manually uploaded report goes into the archive.
pub fn uploaded_report_name(original: &str) -> String {
    let safe: String = original
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '.' | '_' | '-'))
        .collect();
    format!("Erfahrungsbericht_{}", safe.trim())
}

pub struct GeneratedReport {
    pub document: StoredDocument,
    pub text: String,
}

/// Asks the model for the report text and renders it.
pub async fn generate_report(
    model: &dyn ChatModel,
    fonts: &FontSetup,
    require_embedded_font: bool,
    request: &ReportRequest,
) -> Result<GeneratedReport, ReportError> {
    if let Some(reason) = fonts.fallback_reason() {
        if require_embedded_font {
            return Err(PdfError::FontRequired(reason.to_string()).into());
        }
    }

    let prompt = build_prompt(&request.event_title, &request.notes);
    log::info!(
        "Generating experience report for '{}' with {}",
        request.event_title.trim(),
        model.model_name()
    );
    let answer = model.complete(&prompt).await?;
    let text = answer.trim().to_string();
    if text.is_empty() {
        return Err(ReportError::EmptyAnswer);
    }

    let pdf = document::render_report(fonts, &request.event_title, &text);
    Ok(GeneratedReport {
        document: StoredDocument {
            filename: report_file_name(&request.event_title),
            bytes: pdf,
        },
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct FixedAnswer(&'static str);

    #[async_trait]
    impl ChatModel for FixedAnswer {
        async fn complete(&self, _prompt: &str) -> Result<String, ReportError> {
            Ok(self.0.to_string())
        }

        fn model_name(&self) -> &str {
            "fixed"
        }
    }

    fn request() -> ReportRequest {
        ReportRequest {
            event_title: "Canyoning SS25".to_string(),
            notes: "Um 9 Uhr losgefahren, 2 km durch den Canyon.".to_string(),
        }
    }

    #[test]
    fn test_prompt_embeds_title_and_notes() {
        let prompt = build_prompt(" Canyoning ", " Heiß und sonnig ");
        assert!(prompt.contains("Event-Titel: Canyoning\n"));
        assert!(prompt.contains("---\nHeiß und sonnig\n---"));
    }

    #[test]
    fn test_file_names() {
        assert_eq!(report_file_name("Canyoning SS25"), "Erfahrungsbericht_Canyoning_SS25.pdf");
        assert_eq!(
            report_file_name("../Grill \"Abend\" 2/3"),
            "Erfahrungsbericht_Grill_Abend_23.pdf"
        );
        assert_eq!(report_file_name(" ?! "), "Erfahrungsbericht.pdf");
        assert_eq!(uploaded_report_name("mein bericht (final).docx"), "Erfahrungsbericht_mein bericht final.docx");
    }

    #[test]
    fn test_validation() {
        let errors = ReportRequest::default().validate().unwrap_err();
        assert_eq!(errors.fields(), vec!["event_title", "notes"]);
    }

    #[tokio::test]
    async fn test_generate_report() {
        let fonts = FontSetup::fallback();
        let report = generate_report(&FixedAnswer("Einleitung.\n\nFazit."), &fonts, false, &request())
            .await
            .unwrap();
        assert_eq!(report.document.filename, "Erfahrungsbericht_Canyoning_SS25.pdf");
        assert!(report.document.bytes.starts_with(b"%PDF-"));
        assert_eq!(report.text, "Einleitung.\n\nFazit.");
    }

    #[tokio::test]
    async fn test_blank_answer_is_an_error() {
        let fonts = FontSetup::fallback();
        let result = generate_report(&FixedAnswer("  \n "), &fonts, false, &request()).await;
        assert!(matches!(result, Err(ReportError::EmptyAnswer)));
    }

    #[tokio::test]
    async fn test_required_font_is_enforced() {
        let fonts = FontSetup::fallback();
        let result = generate_report(&FixedAnswer("Text"), &fonts, true, &request()).await;
        assert!(matches!(result, Err(ReportError::Pdf(PdfError::FontRequired(_)))));
    }
}
