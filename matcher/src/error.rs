use thiserror::Error;

/// Errors returned by matcher construction.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MatchError {
    #[error("matcher: threshold must be positive and finite, got {0}")]
    InvalidThreshold(f64),
}
