//! Report text to PDF.

use crate::pdf::text::wrap_text;
use crate::pdf::{Canvas, FontSetup, FontStyle, PageSize, MM_PER_PT};

const MARGIN_MM: f32 = 20.0;
const HEADING_SIZE: f32 = 16.0;
const BODY_SIZE: f32 = 11.0;
const LINE_FACTOR: f32 = 1.4;
const PARAGRAPH_GAP_MM: f32 = 3.0;

/// Splits model output into paragraphs: on blank lines, or on single line breaks
/// when the text has no blank lines at all.
pub fn split_paragraphs(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    let mut blocks: Vec<&str> = trimmed.split("\n\n").collect();
    if blocks.len() == 1 && trimmed.contains('\n') {
        blocks = trimmed.split('\n').collect();
    }
    blocks
        .into_iter()
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn heading(event_title: &str) -> String {
    format!("Erfahrungsbericht: {}", event_title.trim())
}

/// Portrait A4 with the heading on the first page and the paragraphs flowing over pages.
pub fn render_report(fonts: &FontSetup, event_title: &str, text: &str) -> Vec<u8> {
    let size = PageSize::A4_PORTRAIT;
    let mut canvas = Canvas::new(fonts, size).with_title(heading(event_title));
    canvas.add_page();

    let width = size.width_mm - 2.0 * MARGIN_MM;
    let bottom = size.height_mm - MARGIN_MM;
    let mut y = MARGIN_MM;

    let heading_line = HEADING_SIZE * MM_PER_PT * LINE_FACTOR;
    let heading_text = fonts.prepare(&heading(event_title));
    for line in wrap_text(&heading_text, width, |t| canvas.measure(t, FontStyle::Bold, HEADING_SIZE)) {
        y += heading_line;
        canvas.text(MARGIN_MM, y, &line, FontStyle::Bold, HEADING_SIZE);
    }
    y += PARAGRAPH_GAP_MM * 2.0;

    let body_line = BODY_SIZE * MM_PER_PT * LINE_FACTOR;
    for paragraph in split_paragraphs(text) {
        let prepared = fonts.prepare(&paragraph);
        let lines = wrap_text(&prepared, width, |t| canvas.measure(t, FontStyle::Regular, BODY_SIZE));
        for line in lines {
            if y + body_line > bottom {
                canvas.add_page();
                y = MARGIN_MM;
            }
            y += body_line;
            canvas.text(MARGIN_MM, y, &line, FontStyle::Regular, BODY_SIZE);
        }
        y += PARAGRAPH_GAP_MM;
    }

    canvas.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_blank_lines() {
        let paragraphs = split_paragraphs("\nEinleitung.\n\nHauptteil\nmit Umbruch.\n\n\nFazit.\n");
        assert_eq!(paragraphs, vec!["Einleitung.", "Hauptteil\nmit Umbruch.", "Fazit."]);
    }

    #[test]
    fn test_single_block_splits_on_line_breaks() {
        let paragraphs = split_paragraphs("Erster Satz.\nZweiter Satz.\n  \nDritter.");
        assert_eq!(paragraphs, vec!["Erster Satz.", "Zweiter Satz.", "Dritter."]);
    }

    #[test]
    fn test_render_with_fallback_font() {
        let fonts = FontSetup::fallback();
        let pdf = render_report(&fonts, "Canyoning", "Wir sind um 9 Uhr gestartet.\n\nEs war heiß.");
        assert!(pdf.starts_with(b"%PDF-"));
        let raw = String::from_utf8_lossy(&pdf);
        assert!(raw.contains("(Erfahrungsbericht: Canyoning) Tj"));
    }

    #[test]
    fn test_long_report_spans_pages() {
        let fonts = FontSetup::fallback();
        let text = vec!["Ein ziemlich langer Absatz über den Ablauf des Events."; 80].join("\n\n");
        let pdf = render_report(&fonts, "Canyoning", &text);
        let raw = String::from_utf8_lossy(&pdf);
        // roughly 28 paragraphs on the first page, 30 on the following ones
        assert!(raw.contains("/Count 3"));
    }
}
