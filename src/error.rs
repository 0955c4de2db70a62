use thiserror::Error;

/// Failure kinds for the conversion pipeline.
///
/// `InvalidOption` is raised before any image is touched; everything else
/// aborts the in-progress batch. The first error encountered in resolved
/// order is the one surfaced.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("invalid {field}: {value:?} ({reason})")]
    InvalidOption {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("could not decode image {filename}: {reason}")]
    ImageDecode { filename: String, reason: String },

    #[error("PDF assembly failed: {0}")]
    Assembly(String),

    #[error("output validation failed: {0}")]
    OutputValidation(String),
}

impl ConvertError {
    /// true when the failure is correctable by the caller
    /// (bad request, as opposed to an internal processing failure)
    pub fn is_caller_error(&self) -> bool {
        matches!(self, ConvertError::InvalidOption { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
