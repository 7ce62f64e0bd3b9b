//! Drawing of the header block, table and footer onto a canvas.

use std::path::Path;

use super::layout::{
    PagePlan, RowSlot, PAGE_MARGIN_MM, ROW_HEIGHT_MM, SECTION_HEADING_HEIGHT_MM,
    TABLE_HEADER_HEIGHT_MM,
};
use super::EventDetails;
use crate::participant::{classify, PaidSet, ParticipantRecord};
use crate::pdf::text::{fit_text, wrap_text};
use crate::pdf::{Align, Canvas, FontStyle, ImageHandle};
use crate::signature::SignatureStore;

pub const TITLE: &str = "Participant List / Teilnehmerliste";
pub const SPECIAL_HEADING: &str = "Weitere Teilnehmer (Kategorie: \"Nothing of the above\")";
pub const FOOTER_SIGNATURE_LINE: &str =
    "Unterschrift organisierender Tutor: ___________________________";

pub const NOTICE: &str = "People who signed up and paid do not get their money back. You are responsible for selling the ticket yourself.\n\n\
With your signature you confirm that you approve of the International Club publishing fotos and videos of you or with you on them on social media and tag you.\n\
If you do not agree, let one of the organizers know and we will note it on this list. The International Club commits on its part to use the fotos and videos purely \
for marketing purposes that do not violate a person's privacy and dignity.";

/// Table columns in print order: label and width in mm.
pub const TABLE_COLUMNS: [(&str, f32); 11] = [
    ("Nr.", 8.0),
    ("Name", 60.0),
    ("Mobile", 35.0),
    ("Country", 30.0),
    ("ERASMUS", 22.0),
    ("Other Exch.", 22.0),
    ("Tutor", 15.0),
    ("Signature", 40.0),
    ("Paid", 12.0),
    ("Present", 14.0),
    ("Absent", 12.0),
];

const SIGNATURE_COLUMN: usize = 7;

const LOGO_WIDTH_MM: f32 = 25.0;
const LOGO_Y_MM: f32 = PAGE_MARGIN_MM - 2.0;
const TITLE_SIZE: f32 = 16.0;
const DETAILS_SIZE: f32 = 10.0;
const DETAIL_ROW_MM: f32 = 7.0;
const LABEL_WIDTH_MM: f32 = 20.0;
const NOTICE_SIZE: f32 = 7.0;
const NOTICE_LINE_MM: f32 = 3.5;
const TABLE_HEADER_SIZE: f32 = 8.0;
const TABLE_SIZE: f32 = 7.0;
const MIN_CELL_SIZE: f32 = 5.0;
const HEADER_FILL_GRAY: f32 = 220.0 / 255.0;
const CELL_PADDING_MM: f32 = 1.0;

pub enum Logo {
    Image(ImageHandle),
    Missing,
    Unreadable,
}

impl Logo {
    pub fn load(canvas: &mut Canvas<'_>, path: &Path) -> Self {
        if !path.is_file() {
            log::warn!("Logo not found at {}", path.display());
            return Logo::Missing;
        }
        match canvas.load_image(path) {
            Ok(handle) => Logo::Image(handle),
            Err(e) => {
                log::warn!("Logo could not be loaded: {}", e);
                Logo::Unreadable
            }
        }
    }
}

pub struct ListPainter<'a> {
    pub details: &'a EventDetails,
    pub logo: Logo,
}

impl<'a> ListPainter<'a> {
    fn content_width(canvas: &Canvas<'_>) -> f32 {
        canvas.size().width_mm - 2.0 * PAGE_MARGIN_MM
    }

    fn notice_lines(canvas: &Canvas<'_>) -> Vec<String> {
        let width = Self::content_width(canvas) - 2.0 * CELL_PADDING_MM;
        wrap_text(NOTICE, width, |line| {
            canvas.measure(line, FontStyle::Regular, NOTICE_SIZE)
        })
    }

    /// Y at which the header block ends and the table header starts.
    pub fn header_bottom(canvas: &Canvas<'_>) -> f32 {
        let details_bottom = LOGO_Y_MM + 10.0 + 3.0 * DETAIL_ROW_MM + 3.0;
        details_bottom + Self::notice_lines(canvas).len() as f32 * NOTICE_LINE_MM + 2.0
    }

    pub fn draw_page(
        &self,
        canvas: &mut Canvas<'_>,
        plan: &PagePlan,
        total_pages: usize,
        rows: &[(&RowSlot, &ParticipantRecord)],
        paid: &PaidSet,
        signatures: &SignatureStore,
    ) {
        canvas.add_page();
        self.draw_header(canvas);

        if let Some(heading_y) = plan.section_heading_y {
            let width = Self::content_width(canvas);
            canvas.cell_text(
                PAGE_MARGIN_MM,
                heading_y,
                width,
                SECTION_HEADING_HEIGHT_MM,
                SPECIAL_HEADING,
                Align::Center,
                FontStyle::Bold,
                12.0,
            );
        }
        draw_table_header(canvas, plan.table_header_y);

        for (slot, record) in rows {
            draw_row(canvas, slot, record, paid, signatures);
        }

        draw_footer(canvas, plan.number, total_pages);
    }

    fn draw_header(&self, canvas: &mut Canvas<'_>) {
        let margin = PAGE_MARGIN_MM;
        let page_width = canvas.size().width_mm;

        match &self.logo {
            Logo::Image(handle) => {
                let height = handle.height_for_width(LOGO_WIDTH_MM);
                canvas.image(*handle, margin, LOGO_Y_MM, LOGO_WIDTH_MM, height);
            }
            Logo::Missing => placeholder(canvas, "[Logo fehlt]"),
            Logo::Unreadable => placeholder(canvas, "[Logo Fehler]"),
        }

        let width = Self::content_width(canvas);
        canvas.cell_text(margin, LOGO_Y_MM, width, 10.0, TITLE, Align::Center, FontStyle::Bold, TITLE_SIZE);

        let x = margin + LOGO_WIDTH_MM + 5.0;
        let mut y = LOGO_Y_MM + 10.0;

        label(canvas, x, y, "Event:");
        value(canvas, x + LABEL_WIDTH_MM, y, 100.0, &self.details.name);
        let price_value_width = 25.0;
        let price_label_width = 15.0;
        let price_x = page_width - margin - price_value_width - price_label_width;
        canvas.cell_text(
            price_x,
            y,
            price_label_width,
            DETAIL_ROW_MM,
            "Price:",
            Align::Right,
            FontStyle::Regular,
            DETAILS_SIZE,
        );
        value(canvas, price_x + price_label_width, y, price_value_width, &self.details.price);
        y += DETAIL_ROW_MM;

        label(canvas, x, y, "Date:");
        value(canvas, x + LABEL_WIDTH_MM, y, 70.0, &self.details.date);
        y += DETAIL_ROW_MM;

        label(canvas, x, y, "Tutors:");
        value(canvas, x + LABEL_WIDTH_MM, y, 100.0, &self.details.tutors);
        y += DETAIL_ROW_MM + 3.0;

        for line in Self::notice_lines(canvas) {
            let baseline = y + NOTICE_LINE_MM / 2.0 + 0.3 * NOTICE_SIZE * crate::pdf::MM_PER_PT;
            canvas.text(margin + CELL_PADDING_MM, baseline, &line, FontStyle::Regular, NOTICE_SIZE);
            y += NOTICE_LINE_MM;
        }
    }
}

fn placeholder(canvas: &mut Canvas<'_>, text: &str) {
    canvas.cell_text(
        PAGE_MARGIN_MM,
        LOGO_Y_MM,
        LOGO_WIDTH_MM,
        10.0,
        text,
        Align::Center,
        FontStyle::Bold,
        8.0,
    );
}

fn label(canvas: &mut Canvas<'_>, x: f32, y: f32, text: &str) {
    canvas.cell_text(x, y, LABEL_WIDTH_MM, DETAIL_ROW_MM, text, Align::Left, FontStyle::Regular, DETAILS_SIZE);
}

/// A header value on an underline.
fn value(canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32, text: &str) {
    fitted_cell(canvas, x, y, width, DETAIL_ROW_MM, text, Align::Left, FontStyle::Regular, DETAILS_SIZE);
    canvas.line(x, y + DETAIL_ROW_MM, x + width, y + DETAIL_ROW_MM);
}

#[allow(clippy::too_many_arguments)]
fn fitted_cell(
    canvas: &mut Canvas<'_>,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
    text: &str,
    align: Align,
    style: FontStyle,
    size: f32,
) {
    let prepared = canvas.fonts().prepare(text);
    let (fitted, fitted_size) = fit_text(
        &prepared,
        width - 2.0 * CELL_PADDING_MM,
        size,
        MIN_CELL_SIZE,
        |candidate, candidate_size| canvas.measure(candidate, style, candidate_size),
    );
    canvas.cell_text(x, y, width, height, &fitted, align, style, fitted_size);
}

fn draw_table_header(canvas: &mut Canvas<'_>, y: f32) {
    let mut x = PAGE_MARGIN_MM;
    for (label, width) in TABLE_COLUMNS {
        canvas.filled_rect(x, y, width, TABLE_HEADER_HEIGHT_MM, HEADER_FILL_GRAY);
        fitted_cell(
            canvas,
            x,
            y,
            width,
            TABLE_HEADER_HEIGHT_MM,
            label,
            Align::Center,
            FontStyle::Bold,
            TABLE_HEADER_SIZE,
        );
        x += width;
    }
}

/// Cell texts of one row in column order; the signature cell stays empty.
pub fn row_cells(number: usize, record: &ParticipantRecord, paid: bool, check_mark: &str) -> [String; 11] {
    let class = classify(&record.participant_type);
    let flag = |set: bool| if set { "X".to_string() } else { String::new() };
    [
        number.to_string(),
        record.name.clone(),
        record.mobile.clone(),
        record.country.clone(),
        flag(class.is_erasmus()),
        flag(class.is_other_exchange()),
        flag(class.tutor),
        String::new(),
        if paid { check_mark.to_string() } else { String::new() },
        String::new(),
        String::new(),
    ]
}

fn draw_row(
    canvas: &mut Canvas<'_>,
    slot: &RowSlot,
    record: &ParticipantRecord,
    paid: &PaidSet,
    signatures: &SignatureStore,
) {
    let check_mark = canvas.fonts().check_mark();
    let cells = row_cells(slot.number, record, paid.contains(&record.name), check_mark);

    let mut x = PAGE_MARGIN_MM;
    for (column, ((_, width), text)) in TABLE_COLUMNS.iter().zip(cells.iter()).enumerate() {
        canvas.rect(x, slot.y, *width, ROW_HEIGHT_MM);
        if column == SIGNATURE_COLUMN {
            draw_signature(canvas, signatures, &record.name, x, slot.y, *width);
        } else {
            fitted_cell(canvas, x, slot.y, *width, ROW_HEIGHT_MM, text, Align::Center, FontStyle::Regular, TABLE_SIZE);
        }
        x += width;
    }
}

/// Places the signature image inside the cell, keeping its aspect ratio.
fn draw_signature(canvas: &mut Canvas<'_>, signatures: &SignatureStore, name: &str, x: f32, y: f32, width: f32) {
    let Some(path) = signatures.existing(name) else {
        return;
    };
    let handle = match canvas.load_image(&path) {
        Ok(handle) => handle,
        Err(e) => {
            log::warn!("Skipping signature of '{}': {}", name, e);
            return;
        }
    };

    let box_width = width - 2.0;
    let box_height = ROW_HEIGHT_MM - 2.0;
    let mut draw_width = box_width;
    let mut draw_height = handle.height_for_width(box_width);
    if draw_height > box_height || draw_height <= 0.0 {
        draw_height = box_height;
        draw_width = if handle.height_px == 0 {
            box_width
        } else {
            box_height * handle.width_px as f32 / handle.height_px as f32
        };
    }
    let offset_x = (box_width - draw_width) / 2.0;
    let offset_y = (box_height - draw_height) / 2.0;
    canvas.image(handle, x + 1.0 + offset_x, y + 1.0 + offset_y, draw_width, draw_height);
}

fn draw_footer(canvas: &mut Canvas<'_>, page: usize, total: usize) {
    let y = canvas.size().height_mm - (PAGE_MARGIN_MM + 5.0);
    let width = canvas.size().width_mm - 2.0 * PAGE_MARGIN_MM;
    canvas.cell_text(
        PAGE_MARGIN_MM,
        y,
        width,
        10.0,
        FOOTER_SIGNATURE_LINE,
        Align::Left,
        FontStyle::Regular,
        10.0,
    );
    canvas.cell_text(
        PAGE_MARGIN_MM,
        y,
        width,
        10.0,
        &format!("Seite {page}/{total}"),
        Align::Right,
        FontStyle::Regular,
        8.0,
    );
}
