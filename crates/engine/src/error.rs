//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`KeyNotFound`] thrown when a book, expense, attachment or channel is
//!   missing or belongs to someone else. Both cases share the same message.
//! - [`InvalidWorkbook`] thrown when an uploaded workbook cannot be imported at
//!   all. Row problems are never errors, they end up in [`ImportReport`].
//! - [`Unauthorized`] thrown when a preview secret does not resolve.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`InvalidWorkbook`]: EngineError::InvalidWorkbook
//!  [`Unauthorized`]: EngineError::Unauthorized
//!  [`ImportReport`]: crate::ImportReport
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found or no access")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    InvalidWorkbook(String),
    #[error("preview disabled or link invalid")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("workbook write failed: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl EngineError {
    /// True for faults the caller cannot fix by changing the request.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Workbook(_) | Self::Io(_) | Self::Database(_))
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::InvalidWorkbook(a), Self::InvalidWorkbook(b)) => a == b,
            (Self::Unauthorized, Self::Unauthorized) => true,
            (Self::Forbidden(a), Self::Forbidden(b)) => a == b,
            (Self::Workbook(a), Self::Workbook(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
