//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violations of layout invariants.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("non-positive units (user unit {user_unit}, database unit {db_unit})")]
    InvalidUnits { user_unit: f64, db_unit: f64 },

    #[error("duplicate cell name: {0}")]
    DuplicateCell(String),
}
