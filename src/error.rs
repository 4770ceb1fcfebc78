//! Error types for the segmentation and merge library.
//!
//! Geometry never fails: degenerate rectangles are dropped rather than reported.
//! Everything that can go wrong lives at the collaborator and markup boundaries.

use std::path::PathBuf;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while segmenting a page or merging its markup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON decoding error (segmenter output or configuration file)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Image decoding, encoding or pixmap error
    #[error("Image error: {0}")]
    Image(String),

    /// The segmentation collaborator could not be run or exited with failure
    #[error("Segmenter error: {0}")]
    Segmenter(String),

    /// The OCR engine failed on a region
    #[error("OCR error: {0}")]
    Ocr(String),

    /// The OCR engine exceeded its time budget
    #[error("OCR timed out after {seconds}s")]
    OcrTimeout {
        /// Budget that was exceeded, in seconds
        seconds: u64,
    },

    /// A structural markup line lacks a parseable bounding box
    #[error("Malformed markup fragment at line {line}: {reason}")]
    MalformedFragment {
        /// 1-based line number inside the fragment
        line: usize,
        /// What was wrong with the line
        reason: String,
    },

    /// A persisted per-region artifact was expected but not found
    #[error("Missing intermediate artifact: {}", .0.display())]
    MissingArtifact(PathBuf),

    /// Configuration value out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether a pipeline may skip the affected region and carry on.
    ///
    /// OCR failures and missing per-region artifacts only cost that region's
    /// text. Malformed markup is never recoverable: a corrupted merge is worse
    /// than no merge.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Ocr(_) | Error::OcrTimeout { .. } | Error::MissingArtifact(_))
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}
