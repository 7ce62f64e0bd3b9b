use image::{ImageFormat, Rgb, RgbImage, RgbaImage};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::slug::SignatureKey;
use crate::participant::ParticipantRecord;

#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("name '{0}' does not yield a usable file name")]
    InvalidName(String),
    #[error("pixel buffer has {actual} bytes, expected {expected} for {width}x{height} RGBA")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("signature image is empty")]
    EmptyImage,
    #[error("failed to decode signature image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("failed to write signature image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("signature storage error: {0}")]
    Io(#[from] std::io::Error),
}

/// Signature images on disk, one PNG per name slug. A file's presence means "has signed".
#[derive(Debug, Clone)]
pub struct SignatureStore {
    dir: PathBuf,
}

/// Composites RGBA pixels onto a white background.
pub fn flatten_on_white(image: &RgbaImage) -> RgbImage {
    let mut flat = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let alpha = u32::from(a);
        let blend = |c: u8| ((u32::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8;
        flat.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    flat
}

impl SignatureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the signature for `name` lives, whether or not it exists yet.
    pub fn path_for(&self, name: &str) -> Option<PathBuf> {
        SignatureKey::from_name(name).map(|key| self.dir.join(key.file_name()))
    }

    pub fn has_signed(&self, name: &str) -> bool {
        self.path_for(name).is_some_and(|path| path.is_file())
    }

    /// The existing signature file for `name`, if any.
    pub fn existing(&self, name: &str) -> Option<PathBuf> {
        self.path_for(name).filter(|path| path.is_file())
    }

    pub fn load(&self, name: &str) -> Result<Option<Vec<u8>>, SignatureError> {
        match self.existing(name) {
            Some(path) => Ok(Some(fs::read(path)?)),
            None => Ok(None),
        }
    }

    /// Names still missing a signature: sorted, unique, skipping names without a usable slug.
    pub fn unsigned_names(&self, participants: &[ParticipantRecord]) -> Vec<String> {
        participants
            .iter()
            .map(|p| p.name.trim())
            .filter(|name| !name.is_empty())
            .filter(|name| SignatureKey::from_name(name).is_some())
            .filter(|name| !self.has_signed(name))
            .map(str::to_string)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Stores a raw RGBA canvas capture as a PNG flattened onto white.
    pub fn save_rgba(
        &self,
        name: &str,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
    ) -> Result<PathBuf, SignatureError> {
        if width == 0 || height == 0 {
            return Err(SignatureError::EmptyImage);
        }
        let actual = rgba.len();
        let size_error = |expected| SignatureError::BufferSize {
            width,
            height,
            expected,
            actual,
        };
        // u32 x u32 x 4 can overflow usize
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or_else(|| size_error(usize::MAX))?;
        if actual != expected {
            return Err(size_error(expected));
        }
        let image = RgbaImage::from_raw(width, height, rgba).ok_or_else(|| size_error(expected))?;
        self.write(name, &flatten_on_white(&image))
    }

    /// Stores an uploaded image (typically a canvas PNG export), flattened onto white.
    pub fn save_png(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, SignatureError> {
        let decoded = image::load_from_memory(bytes).map_err(SignatureError::Decode)?;
        if decoded.width() == 0 || decoded.height() == 0 {
            return Err(SignatureError::EmptyImage);
        }
        self.write(name, &flatten_on_white(&decoded.to_rgba8()))
    }

    fn write(&self, name: &str, image: &RgbImage) -> Result<PathBuf, SignatureError> {
        let path = self
            .path_for(name)
            .ok_or_else(|| SignatureError::InvalidName(name.to_string()))?;
        fs::create_dir_all(&self.dir)?;
        image
            .save_with_format(&path, ImageFormat::Png)
            .map_err(SignatureError::Encode)?;
        log::info!("Saved signature for '{}' to {}", name, path.display());
        Ok(path)
    }
}
