use thiserror::Error;

/// Errors returned by identifier encoding and parsing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IdError {
    #[error("id: unknown object type code {0}")]
    UnknownType(u8),

    #[error("id: unknown subtype code {0}")]
    UnknownSubtype(u8),

    #[error("id: unknown type letter {0:?}")]
    UnknownTypeLetter(char),

    #[error("id: unknown subtype letter {0:?}")]
    UnknownSubtypeLetter(char),

    #[error("id: index {0} exceeds {max}", max = crate::codec::MAX_INDEX)]
    IndexOverflow(u32),

    #[error("id: value {0} is not finite and non-negative")]
    InvalidValue(f32),

    #[error("id: cannot parse {0:?}")]
    InvalidPretty(String),
}
