//! Identifiers for particle-flow objects.
//!
//! Every track, cluster, particle and block in an event is addressed by an
//! [`Identifier`]: a 64-bit key packing the object type, its processing
//! stage (subtype), a sequence index and a small floating-point value such
//! as the energy.
//!
//! ```
//! use papas_id::{Category, IdSequence, ObjectType, Subtype};
//!
//! let mut seq = IdSequence::new();
//! let id = seq
//!     .next_id(Category::new(ObjectType::EcalCluster, Subtype::Smeared), 10.5)
//!     .unwrap();
//! assert_eq!(id.pretty(), "es1");
//! assert_eq!(id.value(), 10.5);
//! ```

mod codec;
mod error;
mod sequence;

pub use codec::{
    Category, Identifier, MAX_INDEX, ObjectType, Parts, Subtype, decode, encode, encode_codes,
    parse_pretty, pretty,
};
pub use error::IdError;
pub use sequence::IdSequence;
