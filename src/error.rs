use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrubError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid attestation status: {0}")]
    InvalidStatus(String),

    #[error("Claim not found: {0}")]
    ClaimNotFound(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ScrubError>;
