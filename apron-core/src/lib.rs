pub mod clock;
pub mod identity;
pub mod models;
pub mod repository;
pub mod validation;

pub use clock::{Clock, ManualClock, SystemClock};
pub use identity::{EntityKind, IdentityGenerator, SequentialIdentityGenerator, UuidIdentityGenerator};
pub use repository::{PersistenceError, Snapshot, SnapshotRepository, SNAPSHOT_KEY};

/// Coarse failure taxonomy, used to pick notification titles
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Consistency,
    Authentication,
    Authorization,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Consistency(String),
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("{0}")]
    Forbidden(String),
}

impl StoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation { .. } => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::Consistency(_) => ErrorKind::Consistency,
            StoreError::InvalidCredentials => ErrorKind::Authentication,
            StoreError::Forbidden(_) => ErrorKind::Authorization,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
