//! Pagination of the participant table, independent of any drawing.

use crate::participant::RosterGroup;

pub const PAGE_MARGIN_MM: f32 = 10.0;
pub const BREAK_MARGIN_MM: f32 = PAGE_MARGIN_MM + 5.0;
pub const ROW_HEIGHT_MM: f32 = 8.0;
pub const TABLE_HEADER_HEIGHT_MM: f32 = 7.0;
pub const SECTION_HEADING_HEIGHT_MM: f32 = 10.0;
pub const SECTION_HEADING_GAP_MM: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSlot {
    pub y: f32,
    pub group: RosterGroup,
    /// Index into the group's participant slice.
    pub index: usize,
    /// Number printed in the `Nr.` column; restarts at 1 for each group.
    pub number: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PagePlan {
    pub number: usize,
    /// Y of the special-section heading, when this page opens that section.
    pub section_heading_y: Option<f32>,
    pub table_header_y: f32,
    pub rows: Vec<RowSlot>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListLayout {
    pub pages: Vec<PagePlan>,
}

impl ListLayout {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn rows(&self) -> impl Iterator<Item = &RowSlot> {
        self.pages.iter().flat_map(|page| page.rows.iter())
    }
}

/// Lays out `regular` rows then `special` rows. Every page carries the header block,
/// which ends at `header_bottom_mm`, followed by the table header.
pub fn plan(regular: usize, special: usize, header_bottom_mm: f32, page_height_mm: f32) -> ListLayout {
    let mut planner = Planner {
        pages: Vec::new(),
        y: 0.0,
        header_bottom: header_bottom_mm,
        break_y: page_height_mm - BREAK_MARGIN_MM - ROW_HEIGHT_MM * 2.0,
    };

    planner.new_page(None);
    planner.place_group(RosterGroup::Regular, regular);

    if special > 0 {
        let heading_y = header_bottom_mm;
        let table_header_y = heading_y + SECTION_HEADING_HEIGHT_MM + SECTION_HEADING_GAP_MM;
        planner.new_page(Some((heading_y, table_header_y)));
        planner.place_group(RosterGroup::Special, special);
    }

    ListLayout {
        pages: planner.pages,
    }
}

struct Planner {
    pages: Vec<PagePlan>,
    y: f32,
    header_bottom: f32,
    break_y: f32,
}

impl Planner {
    fn new_page(&mut self, section: Option<(f32, f32)>) {
        let (section_heading_y, table_header_y) = match section {
            Some((heading, table)) => (Some(heading), table),
            None => (None, self.header_bottom),
        };
        self.pages.push(PagePlan {
            number: self.pages.len() + 1,
            section_heading_y,
            table_header_y,
            rows: Vec::new(),
        });
        self.y = table_header_y + TABLE_HEADER_HEIGHT_MM;
    }

    fn place_group(&mut self, group: RosterGroup, count: usize) {
        for index in 0..count {
            if self.y > self.break_y {
                self.new_page(None);
            }
            let slot = RowSlot {
                y: self.y,
                group,
                index,
                number: index + 1,
            };
            if let Some(page) = self.pages.last_mut() {
                page.rows.push(slot);
            }
            self.y += ROW_HEIGHT_MM;
        }
    }
}
