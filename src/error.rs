use thiserror::Error;

/// Errors produced by the modeling and sync layers.
///
/// Synchronous operations (declaration, attribute access) fail immediately
/// with one of these. Asynchronous operations (`save`, notification fan-out)
/// only ever surface errors through the returned future.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Invalid model name: {0:?}")]
    InvalidModelName(String),

    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Unknown relation: {0}")]
    UnknownRelation(String),

    #[error("sync not implemented")]
    SyncNotImplemented,

    #[error("Sync failed: {0}")]
    Sync(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;
