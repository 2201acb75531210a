use thiserror::Error;

#[derive(Debug, Error)]
pub enum CreFinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CreFinanceError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        CreFinanceError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for CreFinanceError {
    fn from(e: serde_json::Error) -> Self {
        CreFinanceError::SerializationError(e.to_string())
    }
}
