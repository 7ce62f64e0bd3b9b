use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode_generator::QrCodeEcc;
use serde::Serialize;
use utoipa::ToSchema;

const QR_SIZE_PX: usize = 410;

#[derive(Debug, thiserror::Error)]
pub enum QrError {
    #[error("{0} must not be empty")]
    MissingInput(&'static str),
    #[error("failed to render QR code: {0}")]
    Render(#[from] qrcode_generator::QRCodeError),
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SigningQrCode {
    pub sheet_id: String,
    pub target_url: String,
    /// PNG image, base64 encoded.
    pub png_base64: String,
}

/// Link that opens the signing page for a sheet.
pub fn signing_url(base_url: &str, sheet_id: &str) -> String {
    format!("{}?page=sign&sheet_id={}", base_url.trim_end_matches('/'), sheet_id)
}

pub fn signing_qr_code(base_url: &str, sheet_id: &str) -> Result<SigningQrCode, QrError> {
    if sheet_id.trim().is_empty() {
        return Err(QrError::MissingInput("sheet id"));
    }
    if base_url.trim().is_empty() {
        return Err(QrError::MissingInput("base url"));
    }

    let target_url = signing_url(base_url, sheet_id);
    let png = qrcode_generator::to_png_to_vec(&target_url, QrCodeEcc::Medium, QR_SIZE_PX)?;

    Ok(SigningQrCode {
        sheet_id: sheet_id.to_string(),
        target_url,
        png_base64: STANDARD.encode(png),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signing_url() {
        assert_eq!(
            signing_url("http://localhost:8501/", "1a0v1_Uq"),
            "http://localhost:8501?page=sign&sheet_id=1a0v1_Uq"
        );
    }

    #[test]
    fn test_qr_code_is_png() {
        let qr = signing_qr_code("https://eventtool.example.org", "abc123").unwrap();
        let png = STANDARD.decode(qr.png_base64).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(qr.target_url, "https://eventtool.example.org?page=sign&sheet_id=abc123");
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        assert!(matches!(signing_qr_code("http://x", " "), Err(QrError::MissingInput(_))));
        assert!(matches!(signing_qr_code("", "abc"), Err(QrError::MissingInput(_))));
    }
}
