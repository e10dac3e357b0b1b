// src/utils/error.rs
use crate::extractors::grammar::SectionName;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF could not be read: {0}")]
    Pdf(String),

    #[error("No text could be extracted from {0}")]
    EmptyText(String),

    #[error("OCR failed: {0}")]
    Ocr(String),
}

impl From<lopdf::Error> for SourceError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => SourceError::Io(e),
            _ => SourceError::Pdf(err.to_string()),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractError {
    #[error("Section '{section}' not found (anchor '{anchor}' missing or unterminated)")]
    Segmentation {
        section: SectionName,
        anchor: &'static str,
    },

    #[error("Section anchor '{anchor}' occurs {count} times")]
    AmbiguousAnchor { anchor: &'static str, count: usize },

    #[error("Mandatory field '{field}' not found")]
    FieldNotFound { field: &'static str },

    #[error("Mandatory field '{field}' matched {count} times")]
    AmbiguousField { field: &'static str, count: usize },

    #[error("Page layout could not be loaded: {0}")]
    PageLoad(String),
}

impl ExtractError {
    /// Short stable name used in failure logs and the run summary.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Segmentation { .. } => "segmentation",
            ExtractError::AmbiguousAnchor { .. } => "ambiguous_anchor",
            ExtractError::FieldNotFound { .. } => "field_not_found",
            ExtractError::AmbiguousField { .. } => "ambiguous_field",
            ExtractError::PageLoad(_) => "page_load",
        }
    }
}

/// A document-level failure: which file, and the first thing that went wrong.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{file}: {source}")]
pub struct ParseError {
    pub file: String,
    #[source]
    pub source: ExtractError,
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document source failed: {0}")]
    Source(#[from] SourceError),

    #[error("Extraction failed: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}

impl AppError {
    /// Error kind as reported per document by the batch driver.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Source(SourceError::EmptyText(_)) => "empty_text",
            AppError::Source(SourceError::Ocr(_)) => "ocr",
            AppError::Source(_) => "source",
            AppError::Parse(e) => e.source.kind(),
            AppError::Storage(_) => "storage",
            AppError::Processing(_) => "processing",
        }
    }
}
