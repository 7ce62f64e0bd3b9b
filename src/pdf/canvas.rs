//! Page canvas with millimetre coordinates measured from the top-left corner.

use image::GenericImageView;
use miniz_oxide::deflate::{compress_to_vec_zlib, CompressionLevel};
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use super::fonts::{FontSetup, FontStyle, LoadedFont};
use super::text::to_win_ansi;
use super::{PageSize, PdfError, PT_PER_MM};

const FONT_NAMES: [&[u8]; 2] = [b"F1", b"F2"];
const HELVETICA_NAMES: [&[u8]; 2] = [b"Helvetica", b"Helvetica-Bold"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// A loaded image ready to be placed; carries its pixel size for aspect ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageHandle {
    index: usize,
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageHandle {
    /// Height in mm when drawn `width_mm` wide.
    pub fn height_for_width(&self, width_mm: f32) -> f32 {
        if self.width_px == 0 {
            return 0.0;
        }
        width_mm * self.height_px as f32 / self.width_px as f32
    }
}

struct EncodedImage {
    width: u32,
    height: u32,
    rgb: Vec<u8>,
    alpha: Option<Vec<u8>>,
}

pub struct Canvas<'f> {
    fonts: &'f FontSetup,
    size: PageSize,
    title: Option<String>,
    pages: Vec<Content>,
    used_glyphs: [BTreeMap<u16, f32>; 2],
    images: Vec<EncodedImage>,
    image_index: HashMap<PathBuf, ImageHandle>,
}

impl<'f> Canvas<'f> {
    pub fn new(fonts: &'f FontSetup, size: PageSize) -> Self {
        Self {
            fonts,
            size,
            title: None,
            pages: Vec::new(),
            used_glyphs: [BTreeMap::new(), BTreeMap::new()],
            images: Vec::new(),
            image_index: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn fonts(&self) -> &FontSetup {
        self.fonts
    }

    pub fn size(&self) -> PageSize {
        self.size
    }

    pub fn add_page(&mut self) {
        self.pages.push(Content::new());
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn content(&mut self) -> &mut Content {
        if self.pages.is_empty() {
            self.add_page();
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    fn x(&self, mm: f32) -> f32 {
        mm * PT_PER_MM
    }

    fn y(&self, mm_from_top: f32) -> f32 {
        (self.size.height_mm - mm_from_top) * PT_PER_MM
    }

    /// Width in mm of `text` after font preparation.
    pub fn measure(&self, text: &str, style: FontStyle, size_pt: f32) -> f32 {
        self.fonts
            .text_width_mm(&self.fonts.prepare(text), style, size_pt)
    }

    fn encode_text(&mut self, text: &str, style: FontStyle) -> Vec<u8> {
        let pair = match self.fonts {
            FontSetup::Loaded(pair) => pair.clone(),
            FontSetup::UsingFallback(_) => return to_win_ansi(text),
        };
        let font: &LoadedFont = pair.get(style);
        let glyphs = &mut self.used_glyphs[style.index()];
        let mut bytes = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let glyph = font.glyph_id(ch);
            glyphs.entry(glyph).or_insert_with(|| font.glyph_width(glyph));
            bytes.extend_from_slice(&glyph.to_be_bytes());
        }
        bytes
    }

    /// Draws text with its baseline at `baseline_mm`.
    pub fn text(&mut self, x_mm: f32, baseline_mm: f32, text: &str, style: FontStyle, size_pt: f32) {
        if text.is_empty() {
            return;
        }
        let encoded = self.encode_text(text, style);
        let (x, y) = (self.x(x_mm), self.y(baseline_mm));
        let content = self.content();
        content.set_fill_gray(0.0);
        content.begin_text();
        content.set_font(Name(FONT_NAMES[style.index()]), size_pt);
        content.next_line(x, y);
        content.show(Str(&encoded));
        content.end_text();
    }

    /// Draws text inside a cell, vertically centred, with a 1 mm inner margin.
    pub fn cell_text(
        &mut self,
        x_mm: f32,
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
        text: &str,
        align: Align,
        style: FontStyle,
        size_pt: f32,
    ) {
        let prepared = self.fonts.prepare(text);
        let text_width = self.fonts.text_width_mm(&prepared, style, size_pt);
        let padding = 1.0;
        let x = match align {
            Align::Left => x_mm + padding,
            Align::Center => x_mm + (width_mm - text_width) / 2.0,
            Align::Right => x_mm + width_mm - padding - text_width,
        };
        let font_height_mm = size_pt / PT_PER_MM;
        let baseline = y_mm + height_mm / 2.0 + 0.3 * font_height_mm;
        self.text(x, baseline, &prepared, style, size_pt);
    }

    pub fn rect(&mut self, x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32) {
        let (x, y) = (self.x(x_mm), self.y(y_mm + height_mm));
        let (w, h) = (width_mm * PT_PER_MM, height_mm * PT_PER_MM);
        let content = self.content();
        content.set_line_width(0.2 * PT_PER_MM);
        content.set_stroke_gray(0.0);
        content.rect(x, y, w, h);
        content.stroke();
    }

    /// Rectangle filled with `gray` (0 black, 1 white) and outlined.
    pub fn filled_rect(&mut self, x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32, gray: f32) {
        let (x, y) = (self.x(x_mm), self.y(y_mm + height_mm));
        let (w, h) = (width_mm * PT_PER_MM, height_mm * PT_PER_MM);
        let content = self.content();
        content.set_line_width(0.2 * PT_PER_MM);
        content.set_fill_gray(gray);
        content.set_stroke_gray(0.0);
        content.rect(x, y, w, h);
        content.fill_nonzero_and_stroke();
        content.set_fill_gray(0.0);
    }

    pub fn line(&mut self, x1_mm: f32, y1_mm: f32, x2_mm: f32, y2_mm: f32) {
        let (x1, y1, x2, y2) = (self.x(x1_mm), self.y(y1_mm), self.x(x2_mm), self.y(y2_mm));
        let content = self.content();
        content.set_line_width(0.2 * PT_PER_MM);
        content.move_to(x1, y1);
        content.line_to(x2, y2);
        content.stroke();
    }

    /// Loads an image once per path; later calls reuse the same object.
    pub fn load_image(&mut self, path: &Path) -> Result<ImageHandle, PdfError> {
        if let Some(handle) = self.image_index.get(path) {
            return Ok(*handle);
        }

        let decoded = image::open(path).map_err(|source| PdfError::Image {
            path: path.display().to_string(),
            source,
        })?;
        let (width, height) = decoded.dimensions();
        let level = CompressionLevel::DefaultLevel as u8;
        let rgb = compress_to_vec_zlib(decoded.to_rgb8().as_raw(), level);
        let alpha = decoded.color().has_alpha().then(|| {
            let alphas: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
            compress_to_vec_zlib(&alphas, level)
        });

        let handle = ImageHandle {
            index: self.images.len(),
            width_px: width,
            height_px: height,
        };
        self.images.push(EncodedImage {
            width,
            height,
            rgb,
            alpha,
        });
        self.image_index.insert(path.to_path_buf(), handle);
        Ok(handle)
    }

    pub fn image(&mut self, handle: ImageHandle, x_mm: f32, y_mm: f32, width_mm: f32, height_mm: f32) {
        let (x, y) = (self.x(x_mm), self.y(y_mm + height_mm));
        let (w, h) = (width_mm * PT_PER_MM, height_mm * PT_PER_MM);
        let name = format!("Im{}", handle.index);
        let content = self.content();
        content.save_state();
        content.transform([w, 0.0, 0.0, h, x, y]);
        content.x_object(Name(name.as_bytes()));
        content.restore_state();
    }

    /// Serializes all pages into a PDF file.
    pub fn finish(mut self) -> Vec<u8> {
        if self.pages.is_empty() {
            self.add_page();
        }

        let mut next = 1;
        let mut alloc = || {
            let r = Ref::new(next);
            next += 1;
            r
        };

        let catalog_id = alloc();
        let tree_id = alloc();
        let info_id = alloc();
        let font_ids = [alloc(), alloc()];
        let image_ids: Vec<(Ref, Ref)> = self.images.iter().map(|_| (alloc(), alloc())).collect();
        let page_ids: Vec<(Ref, Ref)> = self.pages.iter().map(|_| (alloc(), alloc())).collect();
        let embedded_ids: Vec<[Ref; 3]> = match self.fonts {
            FontSetup::Loaded(_) => (0..2).map(|_| [alloc(), alloc(), alloc()]).collect(),
            FontSetup::UsingFallback(_) => Vec::new(),
        };

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(tree_id);
        pdf.pages(tree_id)
            .kids(page_ids.iter().map(|(page, _)| *page))
            .count(page_ids.len() as i32);
        {
            let mut info = pdf.document_info(info_id);
            info.producer(TextStr("iclub-eventtool"));
            if let Some(title) = &self.title {
                info.title(TextStr(title));
            }
        }

        match self.fonts {
            FontSetup::Loaded(pair) => {
                for style in [FontStyle::Regular, FontStyle::Bold] {
                    let [cid_id, descriptor_id, file_id] = embedded_ids[style.index()];
                    write_embedded_font(
                        &mut pdf,
                        pair.get(style),
                        &self.used_glyphs[style.index()],
                        font_ids[style.index()],
                        cid_id,
                        descriptor_id,
                        file_id,
                    );
                }
            }
            FontSetup::UsingFallback(_) => {
                for style in [FontStyle::Regular, FontStyle::Bold] {
                    pdf.type1_font(font_ids[style.index()])
                        .base_font(Name(HELVETICA_NAMES[style.index()]))
                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                }
            }
        }

        for (image, (image_id, mask_id)) in self.images.iter().zip(&image_ids) {
            let mut xobject = pdf.image_xobject(*image_id, &image.rgb);
            xobject.filter(Filter::FlateDecode);
            xobject.width(image.width as i32);
            xobject.height(image.height as i32);
            xobject.color_space().device_rgb();
            xobject.bits_per_component(8);
            if image.alpha.is_some() {
                xobject.s_mask(*mask_id);
            }
            xobject.finish();

            if let Some(alpha) = &image.alpha {
                let mut mask = pdf.image_xobject(*mask_id, alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(image.width as i32);
                mask.height(image.height as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
            }
        }

        let media_box = Rect::new(
            0.0,
            0.0,
            self.size.width_mm * PT_PER_MM,
            self.size.height_mm * PT_PER_MM,
        );
        let image_names: Vec<String> = (0..self.images.len()).map(|i| format!("Im{i}")).collect();

        for (content, (page_id, content_id)) in self.pages.into_iter().zip(&page_ids) {
            let mut page = pdf.page(*page_id);
            page.media_box(media_box);
            page.parent(tree_id);
            page.contents(*content_id);
            {
                let mut resources = page.resources();
                {
                    let mut fonts = resources.fonts();
                    for (name, id) in FONT_NAMES.iter().zip(font_ids) {
                        fonts.pair(Name(name), id);
                    }
                }
                if !image_names.is_empty() {
                    let mut xobjects = resources.x_objects();
                    for (name, (id, _)) in image_names.iter().zip(&image_ids) {
                        xobjects.pair(Name(name.as_bytes()), *id);
                    }
                }
            }
            page.finish();
            pdf.stream(*content_id, &content.finish());
        }

        pdf.finish()
    }
}

fn write_embedded_font(
    pdf: &mut Pdf,
    font: &LoadedFont,
    used_glyphs: &BTreeMap<u16, f32>,
    type0_id: Ref,
    cid_id: Ref,
    descriptor_id: Ref,
    file_id: Ref,
) {
    let base_name = Name(font.name.as_bytes());

    pdf.type0_font(type0_id)
        .base_font(base_name)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_id);

    let mut cid = pdf.cid_font(cid_id);
    cid.subtype(CidFontType::Type2)
        .base_font(base_name)
        .system_info(SystemInfo {
            registry: Str(b"Adobe"),
            ordering: Str(b"Identity"),
            supplement: 0,
        })
        .font_descriptor(descriptor_id)
        .default_width(600.0);
    {
        let mut widths = cid.widths();
        for (glyph, width) in used_glyphs {
            widths.consecutive(*glyph, [*width]);
        }
    }
    cid.finish();

    pdf.font_descriptor(descriptor_id)
        .name(base_name)
        .flags(FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(-1000.0, font.descent(), 2000.0, font.ascent()))
        .italic_angle(0.0)
        .ascent(font.ascent())
        .descent(font.descent())
        .cap_height(font.ascent() * 0.7)
        .stem_v(80.0)
        .font_file2(file_id);

    let compressed = compress_to_vec_zlib(&font.data, CompressionLevel::DefaultLevel as u8);
    pdf.stream(file_id, &compressed).filter(Filter::FlateDecode);
}
