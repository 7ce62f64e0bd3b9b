//! Printable participant list: paginated table with signatures and payment marks.

pub mod draw;
pub mod handlers;
pub mod layout;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use utoipa::ToSchema;

use crate::participant::{default_tutors, partition, PaidSet, ParticipantRecord, RosterGroup};
use crate::pdf::{write_output, Canvas, FontSetup, PageSize, PdfError};
use crate::signature::SignatureStore;
use crate::validation::{validate_required, ValidationErrors, Validator};
use draw::{ListPainter, Logo};

/// Event metadata printed in the header block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventDetails {
    pub name: String,
    pub date: String,
    pub tutors: String,
    pub price: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ParticipantListRequest {
    pub event_name: String,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub price: String,
    /// Defaults to the participants registered as tutors.
    #[serde(default)]
    pub tutors: Option<String>,
    /// Names that have paid.
    #[serde(default)]
    pub paid_names: Option<Vec<String>>,
    /// Alternative to `paid_names`: everyone else on the roster has paid.
    #[serde(default)]
    pub unpaid_names: Option<Vec<String>>,
}

impl Validator for ParticipantListRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.event_name, "event_name", "Event name", &mut errors);
        errors.into_result()
    }
}

impl ParticipantListRequest {
    pub fn details(&self, participants: &[ParticipantRecord]) -> EventDetails {
        EventDetails {
            name: self.event_name.trim().to_string(),
            date: self.event_date.trim().to_string(),
            tutors: self
                .tutors
                .clone()
                .unwrap_or_else(|| default_tutors(participants)),
            price: self.price.trim().to_string(),
        }
    }

    /// Paid list wins when both lists are given; neither means nobody is marked.
    pub fn paid_set(&self, participants: &[ParticipantRecord]) -> PaidSet {
        match (&self.paid_names, &self.unpaid_names) {
            (Some(paid), _) => PaidSet::from_names(paid),
            (None, Some(unpaid)) => PaidSet::from_unpaid(participants, unpaid.as_slice()),
            (None, None) => PaidSet::default(),
        }
    }
}

/// Files and fonts the renderer reads.
pub struct ListAssets<'a> {
    pub fonts: &'a FontSetup,
    pub signatures: &'a SignatureStore,
    pub logo_path: &'a Path,
}

#[derive(Debug)]
pub struct RenderedList {
    pub pdf: Vec<u8>,
    pub pages: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GeneratedList {
    pub filename: String,
    #[serde(skip)]
    pub path: PathBuf,
    #[serde(skip)]
    pub pdf: Vec<u8>,
    pub pages: usize,
    pub participants: usize,
}

/// Renders the list. Regular participants come first; the special group starts on
/// its own page and is numbered from 1 again.
pub fn render(
    participants: &[ParticipantRecord],
    details: &EventDetails,
    paid: &PaidSet,
    assets: &ListAssets<'_>,
) -> RenderedList {
    let (regular, special) = partition(participants);

    let mut canvas = Canvas::new(assets.fonts, PageSize::A4_LANDSCAPE)
        .with_title(format!("Teilnehmerliste {}", details.name));
    let header_bottom = ListPainter::header_bottom(&canvas);
    let plan = layout::plan(
        regular.len(),
        special.len(),
        header_bottom,
        PageSize::A4_LANDSCAPE.height_mm,
    );

    let painter = ListPainter {
        details,
        logo: Logo::load(&mut canvas, assets.logo_path),
    };

    let total = plan.page_count();
    for page in &plan.pages {
        let rows: Vec<_> = page
            .rows
            .iter()
            .map(|slot| {
                let group = match slot.group {
                    RosterGroup::Regular => &regular,
                    RosterGroup::Special => &special,
                };
                (slot, group[slot.index])
            })
            .collect();
        painter.draw_page(&mut canvas, page, total, &rows, paid, assets.signatures);
    }

    let pages = canvas.page_count();
    RenderedList {
        pdf: canvas.finish(),
        pages,
    }
}

/// `Teilnehmerliste_<event>_<timestamp>.pdf` with only ASCII alphanumerics kept from the event.
pub fn output_file_name(event_name: &str, now: DateTime<Local>) -> String {
    let event: String = event_name.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    format!("Teilnehmerliste_{}_{}.pdf", event, now.format("%Y%m%d_%H%M%S"))
}

/// Renders the list and writes it to `output_dir`.
pub fn generate(
    participants: &[ParticipantRecord],
    details: &EventDetails,
    paid: &PaidSet,
    assets: &ListAssets<'_>,
    output_dir: &Path,
    require_embedded_font: bool,
) -> Result<GeneratedList, PdfError> {
    if let Some(reason) = assets.fonts.fallback_reason() {
        if require_embedded_font {
            return Err(PdfError::FontRequired(reason.to_string()));
        }
        log::warn!(
            "Using built-in font for participant list ({}); unsupported characters become '?'",
            reason
        );
    }

    let rendered = render(participants, details, paid, assets);
    let filename = output_file_name(&details.name, Local::now());
    let path = write_output(output_dir, &filename, &rendered.pdf)?;
    log::info!(
        "Participant list with {} participants on {} pages written to {}",
        participants.len(),
        rendered.pages,
        path.display()
    );

    Ok(GeneratedList {
        filename,
        path,
        pdf: rendered.pdf,
        pages: rendered.pages,
        participants: participants.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn roster() -> Vec<ParticipantRecord> {
        vec![
            ParticipantRecord::new("Max Mustermann", "0123", "DE", "ERASMUS", "max@example.org"),
            ParticipantRecord::new("Erika Musterfrau", "0456", "AT", "TUTOR", "erika@example.org"),
        ]
    }

    #[test]
    fn test_output_file_name() {
        let now = Local.with_ymd_and_hms(2024, 5, 17, 18, 30, 5).unwrap();
        assert_eq!(
            output_file_name("Stammtisch #3 (Mai)", now),
            "Teilnehmerliste_Stammtisch3Mai_20240517_183005.pdf"
        );
    }

    #[test]
    fn test_tutors_default_to_roster() {
        let request = ParticipantListRequest {
            event_name: " Stammtisch ".to_string(),
            ..Default::default()
        };
        let details = request.details(&roster());
        assert_eq!(details.name, "Stammtisch");
        assert_eq!(details.tutors, "Erika Musterfrau");

        let request = ParticipantListRequest {
            tutors: Some("Jonas".to_string()),
            ..Default::default()
        };
        assert_eq!(request.details(&roster()).tutors, "Jonas");
    }

    #[test]
    fn test_paid_set_sources() {
        let participants = roster();

        let paid = ParticipantListRequest {
            paid_names: Some(vec![" max mustermann ".to_string()]),
            ..Default::default()
        }
        .paid_set(&participants);
        assert!(paid.contains("Max Mustermann"));
        assert!(!paid.contains("Erika Musterfrau"));

        let paid = ParticipantListRequest {
            unpaid_names: Some(vec!["MAX MUSTERMANN".to_string()]),
            ..Default::default()
        }
        .paid_set(&participants);
        assert!(!paid.contains("Max Mustermann"));
        assert!(paid.contains("Erika Musterfrau"));

        assert!(ParticipantListRequest::default().paid_set(&participants).is_empty());
    }
}
