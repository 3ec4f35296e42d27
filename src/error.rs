use thiserror::Error;

// Error types for availability request processing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Supplier data error: {0}")]
    Supplier(String),

    #[error("JSON serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TransformError {
    pub(crate) fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        TransformError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// The request field the error refers to, if it refers to one.
    pub fn field(&self) -> Option<&str> {
        match self {
            TransformError::MissingField(field) => Some(field),
            TransformError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Configuration parse error: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
