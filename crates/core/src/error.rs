/// Domain-level error for operations that take caller-supplied identifiers.
///
/// Decoding the boundary payload never produces a `CoreError`; malformed host
/// data degrades into absent values instead (see [`crate::decoder`]).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
