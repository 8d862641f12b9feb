//! Domain error types.
//!
//! These errors represent validation failures in the domain layer. They are
//! distinct from remote-service and IO errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// A latitude or longitude is non-finite or out of range
    #[error("invalid {field}: {value}")]
    InvalidCoordinate { field: &'static str, value: f64 },
}
