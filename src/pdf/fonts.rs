//! Font selection: embedded DejaVu Sans when available, built-in Helvetica otherwise.

use ab_glyph::{Font, FontArc};
use std::path::Path;
use std::sync::Arc;

use super::text::sanitize_win_ansi;
use super::MM_PER_PT;

pub const REGULAR_FONT_FILE: &str = "DejaVuSans.ttf";
pub const BOLD_FONT_FILE: &str = "DejaVuSans-Bold.ttf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Regular,
    Bold,
}

impl FontStyle {
    pub(crate) fn index(self) -> usize {
        match self {
            FontStyle::Regular => 0,
            FontStyle::Bold => 1,
        }
    }
}

/// Helvetica advance widths for WinAnsi 32..=126, in 1/1000 em.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // space-/
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0-9
    278, 278, 584, 584, 584, 556, 1015, // :-@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A-M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N-Z
    278, 278, 278, 469, 556, 333, // [-`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a-m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n-z
    334, 260, 334, 584, // {-~
];

fn helvetica_width(ch: char, style: FontStyle) -> f32 {
    let code = ch as u32;
    let base = if (32..=126).contains(&code) {
        f32::from(HELVETICA_WIDTHS[(code - 32) as usize])
    } else {
        556.0
    };
    match style {
        FontStyle::Regular => base,
        // Helvetica-Bold runs roughly 5% wider
        FontStyle::Bold => base * 1.05,
    }
}

/// A TrueType font loaded for embedding.
pub struct LoadedFont {
    pub name: String,
    pub data: Vec<u8>,
    font: FontArc,
}

impl LoadedFont {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let data = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
        let font = FontArc::try_from_vec(data.clone())
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().replace(' ', ""))
            .unwrap_or_else(|| "EmbeddedFont".to_string());
        Ok(Self { name, data, font })
    }

    fn units_per_em(&self) -> f32 {
        self.font.units_per_em().unwrap_or(1000.0)
    }

    pub fn glyph_id(&self, ch: char) -> u16 {
        self.font.glyph_id(ch).0
    }

    /// Advance width of a glyph in 1/1000 em.
    pub fn glyph_width(&self, glyph: u16) -> f32 {
        self.font.h_advance_unscaled(ab_glyph::GlyphId(glyph)) * 1000.0 / self.units_per_em()
    }

    pub fn ascent(&self) -> f32 {
        self.font.ascent_unscaled() * 1000.0 / self.units_per_em()
    }

    pub fn descent(&self) -> f32 {
        self.font.descent_unscaled() * 1000.0 / self.units_per_em()
    }

    fn text_width(&self, text: &str) -> f32 {
        text.chars().map(|ch| self.glyph_width(self.glyph_id(ch))).sum()
    }
}

pub struct FontPair {
    pub regular: LoadedFont,
    pub bold: LoadedFont,
}

impl FontPair {
    pub fn get(&self, style: FontStyle) -> &LoadedFont {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
        }
    }
}

/// Outcome of font loading. The caller decides whether a fallback is acceptable.
#[derive(Clone)]
pub enum FontSetup {
    Loaded(Arc<FontPair>),
    UsingFallback(String),
}

impl std::fmt::Debug for FontSetup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FontSetup::Loaded(pair) => write!(f, "Loaded({}, {})", pair.regular.name, pair.bold.name),
            FontSetup::UsingFallback(reason) => write!(f, "UsingFallback({reason})"),
        }
    }
}

impl FontSetup {
    /// Loads `DejaVuSans.ttf` and `DejaVuSans-Bold.ttf` from `dir`.
    pub fn load(dir: &Path) -> Self {
        let regular = LoadedFont::from_file(&dir.join(REGULAR_FONT_FILE));
        let bold = LoadedFont::from_file(&dir.join(BOLD_FONT_FILE));
        match (regular, bold) {
            (Ok(regular), Ok(bold)) => FontSetup::Loaded(Arc::new(FontPair { regular, bold })),
            (Err(e), _) | (_, Err(e)) => FontSetup::UsingFallback(format!("font unavailable: {e}")),
        }
    }

    pub fn fallback() -> Self {
        FontSetup::UsingFallback("built-in font requested".to_string())
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            FontSetup::Loaded(_) => None,
            FontSetup::UsingFallback(reason) => Some(reason),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback_reason().is_some()
    }

    /// Text as it will be rendered; the fallback font replaces unsupported characters.
    pub fn prepare(&self, text: &str) -> String {
        match self {
            FontSetup::Loaded(_) => text.to_string(),
            FontSetup::UsingFallback(_) => sanitize_win_ansi(text),
        }
    }

    /// Width of already prepared text, in millimetres.
    pub fn text_width_mm(&self, text: &str, style: FontStyle, size_pt: f32) -> f32 {
        let em_thousandths = match self {
            FontSetup::Loaded(pair) => pair.get(style).text_width(text),
            FontSetup::UsingFallback(_) => text.chars().map(|ch| helvetica_width(ch, style)).sum(),
        };
        em_thousandths / 1000.0 * size_pt * MM_PER_PT
    }

    /// Mark used for ticked boxes.
    pub fn check_mark(&self) -> &'static str {
        match self {
            FontSetup::Loaded(_) => "\u{2714}",
            FontSetup::UsingFallback(_) => "X",
        }
    }
}
