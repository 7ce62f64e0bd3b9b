//! Small drawing layer over pdf-writer used by the participant list and the report.

pub mod canvas;
pub mod fonts;
pub mod text;

use std::io::Write;
use std::path::{Path, PathBuf};

pub use canvas::{Align, Canvas, ImageHandle};
pub use fonts::{FontPair, FontSetup, FontStyle, LoadedFont};

pub const MM_PER_PT: f32 = 25.4 / 72.0;
pub const PT_PER_MM: f32 = 72.0 / 25.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f32,
    pub height_mm: f32,
}

impl PageSize {
    pub const A4_PORTRAIT: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
    pub const A4_LANDSCAPE: PageSize = PageSize {
        width_mm: 297.0,
        height_mm: 210.0,
    };
}

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("embedded font required but unavailable: {0}")]
    FontRequired(String),
    #[error("failed to load image {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
}

/// Writes `bytes` to `dir/file_name`, creating `dir` first. The file appears atomically.
pub fn write_output(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, PdfError> {
    std::fs::create_dir_all(dir)?;
    let target = dir.join(file_name);
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.persist(&target).map_err(|e| PdfError::Io(e.error))?;
    Ok(target)
}
