use crate::codec::{Category, Identifier, MAX_INDEX, encode};
use crate::error::IdError;

/// Hands out identifiers with strictly increasing indices.
///
/// One sequence is meant to live for one event. Indices start at 1 and are
/// shared across categories, so no two identifiers from the same sequence
/// can have the same (type, subtype, index) triple.
#[derive(Debug, Clone)]
pub struct IdSequence {
    next: u32,
}

impl IdSequence {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Returns a fresh identifier in `category` carrying `value`.
    pub fn next_id(&mut self, category: Category, value: f32) -> Result<Identifier, IdError> {
        if self.next > MAX_INDEX {
            return Err(IdError::IndexOverflow(self.next));
        }
        let id = encode(category.object_type, category.subtype, self.next, value)?;
        self.next += 1;
        Ok(id)
    }

    /// Number of identifiers issued so far.
    pub fn issued(&self) -> u32 {
        self.next - 1
    }

    pub fn reset(&mut self) {
        self.next = 1;
    }
}

impl Default for IdSequence {
    fn default() -> Self {
        Self::new()
    }
}
