use querydrop_core::ExportError;
use thiserror::Error;

/// Failures while turning a result set into an artifact.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("Rendered text is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

impl From<RenderError> for ExportError {
    fn from(e: RenderError) -> Self {
        ExportError::Format(e.to_string())
    }
}
