//! Nearest-neighbour matching between two collections.
//!
//! For every element of a source collection the [`Matcher`] picks the
//! closest element of a target collection under a [`Metric`], provided it
//! lies inside the configured cone.
//!
//! ```
//! use papas_matcher::{MatchConfig, Matcher};
//!
//! let matcher = Matcher::new(MatchConfig::default().with_delta_r(0.3)).unwrap();
//! assert_eq!(matcher.config().delta_r, 0.3);
//! ```
//!
//! # Design
//!
//! Matching is greedy and many-to-one: each source element is matched on its
//! own, so one target may be claimed by several sources. No global one-to-one
//! assignment is attempted.

mod error;
mod matchable;
mod matcher;
mod record;


pub use error::MatchError;
pub use matchable::{DeltaR, Matchable, Metric};
pub use matcher::{Match, MatchConfig, Matcher};
pub use record::{MatchRecord, distance_name, match_name};
