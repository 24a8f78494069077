/// Error types for report export
use thiserror::Error;

/// Main error type for CSV and PDF export
#[derive(Error, Debug)]
pub enum ReportError {
    /// Another export holds the lock
    #[error("An export is already in progress")]
    ExportInProgress,

    /// A selected chart could not be captured
    #[error("Failed to capture chart for {coverage}: {reason}")]
    Capture { coverage: String, reason: String },

    /// Failed to write CSV rows
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    /// Failed to build the PDF document
    #[error("Failed to build PDF: {0}")]
    Pdf(#[from] printpdf::Error),

    /// I/O failure while writing report bytes
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Type alias for Results using ReportError
pub type Result<T> = std::result::Result<T, ReportError>;
