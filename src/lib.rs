//! quire: deterministic image-to-PDF composition.
//!
//! A batch of image buffers plus a [`ConversionOptions`] goes in; one
//! validated PDF comes out, or the first error encountered. There is no
//! partial output: if any image fails, the whole document is abandoned.

use rayon::prelude::*;
use tracing::{debug, info};

pub mod assemble;
pub mod error;
pub mod layout;
pub mod naming;
pub mod normalize;
pub mod options;
pub mod order;
pub mod validate;

pub use error::{ConvertError, Result};
pub use normalize::NormalizedImage;
pub use options::{ConversionOptions, FitMode, Orientation, PageSize, Rgb, SortOrder};

/// Upper bound on batch size; enforced here as well as by callers.
pub const MAX_IMAGES: usize = 100;

/// One uploaded file. Immutable input.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// The finalized, validated document plus its generated download name.
#[derive(Debug)]
pub struct ConvertedPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub pages: usize,
}

/// Run the full pipeline: validate options, order the batch, normalize
/// every image (in parallel), assemble pages sequentially in resolved
/// order, validate the result, name it.
pub fn images_to_pdf(
    images: Vec<SourceImage>,
    options: &ConversionOptions,
) -> Result<ConvertedPdf> {
    options.validate()?;
    if images.is_empty() || images.len() > MAX_IMAGES {
        return Err(ConvertError::InvalidOption {
            field: "images",
            value: images.len().to_string(),
            reason: format!("between 1 and {MAX_IMAGES} images per request"),
        });
    }

    let images = order::resolve_order(images, options.order);
    let names: Vec<String> = images.iter().map(|i| i.filename.clone()).collect();

    // phase 1 - parallel decode + flatten + recompress
    info!(count = images.len(), "normalizing images");
    let prepared: Vec<Result<NormalizedImage>> = images
        .par_iter()
        .map(|img| normalize::normalize_image(&img.bytes, &img.filename, options.bg_color))
        .collect();
    drop(images);

    // the first failure in resolved order wins
    let mut normalized = Vec::with_capacity(prepared.len());
    for result in prepared {
        normalized.push(result?);
    }

    // phase 2 - sequential page assembly in resolved order
    let mut assembler = assemble::Assembler::new(options, &normalized[0]);
    for (image, name) in normalized.into_iter().zip(&names) {
        debug!(file = %name, "appending page");
        assembler.append_page(image)?;
    }
    let bytes = assembler.finalize()?;

    validate::validate_pdf(&bytes)?;

    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let filename = naming::output_filename_now(&name_refs);
    info!(
        pages = names.len(),
        size = bytes.len(),
        file = %filename,
        "document assembled and validated"
    );

    Ok(ConvertedPdf {
        bytes,
        filename,
        pages: names.len(),
    })
}
