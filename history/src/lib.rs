//! Provenance of particle-flow objects.
//!
//! A [`History`] records which object was derived from which: generated
//! particle to raw track, raw cluster to smeared cluster, smeared clusters to
//! the merged cluster built from them. Lineage queries walk those edges and
//! an [`ObjectStore`] turns the resulting identifiers back into objects.

pub mod error;
pub mod history;
pub mod store;


pub use error::HistoryError;
pub use history::{History, Lineage, SUMMARY_SECTIONS};
pub use store::ObjectStore;
