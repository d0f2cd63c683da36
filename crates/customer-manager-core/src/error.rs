//! Caller-input and absence errors.
//!
//! Customer Manager has exactly two expected failure classes:
//!
//! | Kind | Meaning | HTTP |
//! |------|---------|------|
//! | [`ErrorKind::InvalidInput`] | blank field, non-positive id, blank query | 400 |
//! | [`ErrorKind::NotFound`] | no record for the given id or name | 404 |
//!
//! Input errors are detected by the adapter before the store is called.
//! Absence is reported by the store as `None`/`false` and turned into a
//! `NotFound*` variant by the adapter. Anything else (a poisoned lock, a
//! failing agent backend) travels as `anyhow::Error` and is not a
//! `CustomerError`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomerError {
    #[error("Invalid customer ID")]
    InvalidId,

    #[error("Customer name is required")]
    MissingName,

    #[error("Name and email are required")]
    MissingFields,

    #[error("Customer with ID {0} not found")]
    NotFoundById(i64),

    #[error("Customer '{0}' not found")]
    NotFoundByName(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
}

impl CustomerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidId | Self::MissingName | Self::MissingFields => ErrorKind::InvalidInput,
            Self::NotFoundById(_) | Self::NotFoundByName(_) => ErrorKind::NotFound,
        }
    }
}

/// Reject ids that no record can have.
pub fn validate_id(id: i64) -> Result<i64, CustomerError> {
    if id <= 0 {
        return Err(CustomerError::InvalidId);
    }
    Ok(id)
}

/// Reject a missing or whitespace-only search query.
pub fn validate_query(name: Option<&str>) -> Result<&str, CustomerError> {
    match name {
        Some(q) if !q.trim().is_empty() => Ok(q),
        _ => Err(CustomerError::MissingName),
    }
}
