use thiserror::Error;

/// Errors surfaced by statement ingestion.
///
/// Heuristic ambiguities (malformed dates, missing amounts) never show up
/// here; they are resolved in place by the segmenter.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Extraction produced no tokens at all (encrypted or image-only document).
    #[error("document contains no text tokens")]
    NoTokens,

    /// The layout's table header was not found on any page.
    #[error("document is not parseable by the {bank} layout: table header not found")]
    LayoutMismatch { bank: String },

    /// No registered layout recognised the document.
    #[error("no registered layout recognises this document")]
    NoMatchingLayout,

    #[error("invalid layout: {reason}")]
    InvalidLayout { reason: String },
}

pub type IngestResult<T> = Result<T, IngestError>;
