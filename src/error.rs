use thiserror::Error;

/// Errors produced by the grid engine and its store boundary.
///
/// The pure components only ever fail deterministic validation; `Storage`
/// exists to propagate a collaborator failure without partial mutation.
#[derive(Error, Debug, Eq, PartialEq)]
pub enum GridError {
    #[error("Event window cannot produce a finite slot sequence: {reason}")]
    InvalidWindow { reason: String },
    #[error("{target} is not part of this event's grid")]
    OutOfRange { target: String },
    #[error("No event found for token {0}")]
    NotFound(String),
    #[error("Storage operation did not complete: {0}")]
    Storage(String),
}
