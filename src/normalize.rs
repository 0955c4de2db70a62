//! Image decode and normalization: any supported source format in,
//! opaque baseline JPEG out.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, GenericImageView, RgbImage, RgbaImage};

use crate::error::{ConvertError, Result};
use crate::options::Rgb;

/// Re-encode quality for normalized JPEGs.
pub const JPEG_QUALITY: u8 = 95;

/// One decoded, flattened, re-encoded image, ready for embedding.
/// Ephemeral: produced per source image and dropped once its page is drawn.
#[derive(Debug)]
pub struct NormalizedImage {
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode `bytes`, flatten any alpha channel onto `bg`, and re-encode as
/// baseline JPEG. Undecodable or zero-dimension input fails with the
/// originating filename, aborting the whole batch.
pub fn normalize_image(bytes: &[u8], filename: &str, bg: Rgb) -> Result<NormalizedImage> {
    let img = image::load_from_memory(bytes).map_err(|e| ConvertError::ImageDecode {
        filename: filename.to_string(),
        reason: e.to_string(),
    })?;
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::ImageDecode {
            filename: filename.to_string(),
            reason: "zero-dimension image".to_string(),
        });
    }

    let rgb = if img.color().has_alpha() {
        flatten_alpha(&img.into_rgba8(), bg)
    } else {
        img.into_rgb8()
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| ConvertError::Assembly(format!("re-encoding {filename}: {e}")))?;

    Ok(NormalizedImage {
        jpeg,
        width,
        height,
    })
}

/// Composite onto an opaque background: `out = a*fg + (1-a)*bg` per channel.
fn flatten_alpha(rgba: &RgbaImage, bg: Rgb) -> RgbImage {
    let (w, h) = rgba.dimensions();
    let mut out = RgbImage::new(w, h);
    let bg = [bg.r as u16, bg.g as u16, bg.b as u16];
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let a = src.0[3] as u16;
        let inv = 255 - a;
        for c in 0..3 {
            dst.0[c] = ((src.0[c] as u16 * a + bg[c] * inv + 127) / 255) as u8;
        }
    }
    out
}
