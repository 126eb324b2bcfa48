use papas_id::{IdError, Identifier};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("history: edge {parent} -> {child} would close a cycle")]
    Cycle { parent: Identifier, child: Identifier },

    #[error("history: {0}")]
    Id(#[from] IdError),
}
