use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failures while turning an image into text. A screenshot that simply has no
/// reading in it is not an error (see [`crate::ValueExtractor::extract`]).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Image processing failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image is empty")]
    EmptyImage,

    #[error("OCR engine unavailable ({binary}): {source}")]
    OcrUnavailable {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("OCR engine failed with {status}: {stderr}")]
    OcrFailed { status: String, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Reading pattern failed to compile: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
