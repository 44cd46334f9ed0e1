use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error("Malformed route geometry: {reason}")]
    MalformedGeometry { reason: String },

    #[error("Invalid route: {reason}")]
    InvalidRoute { reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Infrastructure error: {0}")]
    InfrastructureError(String),
}

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    #[error("Render sink error: {0}")]
    RenderSink(String),

    #[error("Configuration error: {0}")]
    Configuration(#[from] anyhow::Error),
}

pub type DomainResult<T> = Result<T, DomainError>;
pub type ApplicationResult<T> = Result<T, ApplicationError>;
