//! Structural checks on the finished byte stream. Every gate is hard:
//! a failure here means the conversion failed, never a degraded result.

use crate::error::{ConvertError, Result};

/// No real PDF is smaller than this.
const MIN_PDF_BYTES: usize = 100;
/// The trailer marker must sit within this many bytes of the end.
const EOF_WINDOW: usize = 50;

pub fn validate_pdf(bytes: &[u8]) -> Result<()> {
    if !bytes.starts_with(b"%PDF-") {
        return Err(ConvertError::OutputValidation(
            "missing %PDF- header".to_string(),
        ));
    }
    if bytes.len() < MIN_PDF_BYTES {
        return Err(ConvertError::OutputValidation(format!(
            "document too small: {} bytes",
            bytes.len()
        )));
    }
    let tail = &bytes[bytes.len() - EOF_WINDOW..];
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err(ConvertError::OutputValidation(
            "missing %%EOF marker".to_string(),
        ));
    }
    lopdf::Document::load_mem(bytes).map_err(|e| {
        ConvertError::OutputValidation(format!("document does not re-parse: {e}"))
    })?;
    Ok(())
}
