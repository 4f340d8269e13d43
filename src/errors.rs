use thiserror::Error;
use uuid::Uuid;

/// Why one attempt event or one ledger operation was refused.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("malformed attempt event: {0}")]
    InvalidPayload(String),
    #[error("attempt event failed validation: {0}")]
    Validation(String),
    #[error("no identity derivable from email or phone")]
    MissingIdentity,
    #[error("invalid marking scheme: {0}")]
    InvalidScheme(String),
    #[error("event {0} was already ingested")]
    AlreadyIngested(String),
    #[error("attempt {0} not found")]
    UnknownAttempt(Uuid),
    #[error("test {0} not found")]
    UnknownTest(Uuid),
}

impl IngestError {
    /// Short label used for metrics and log fields.
    pub fn reason(&self) -> &'static str {
        match self {
            IngestError::InvalidPayload(_) => "invalid_payload",
            IngestError::Validation(_) => "validation",
            IngestError::MissingIdentity => "missing_identity",
            IngestError::InvalidScheme(_) => "invalid_scheme",
            IngestError::AlreadyIngested(_) => "already_ingested",
            IngestError::UnknownAttempt(_) => "unknown_attempt",
            IngestError::UnknownTest(_) => "unknown_test",
        }
    }
}
