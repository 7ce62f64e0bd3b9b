//! Handwritten signatures captured on the kiosk page, plus the QR code that opens it.

pub mod handlers;
pub mod qr;
pub mod slug;
pub mod store;

pub use qr::{signing_qr_code, signing_url, QrError, SigningQrCode};
pub use slug::{slugify, SignatureKey};
pub use store::{flatten_on_white, SignatureError, SignatureStore};

#[cfg(test)]
mod mod_tests;
