use papas_id::{IdError, Identifier};
use thiserror::Error;

use crate::object::Layer;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("graph: not found: {0}")]
    NotFound(Identifier),

    #[error("graph: duplicate identifier {0}")]
    DuplicateId(Identifier),

    #[error("graph: cannot link {0} to itself")]
    SelfLink(Identifier),

    #[error("graph: {id} is not a cluster")]
    NotACluster { id: Identifier },

    #[error("graph: {id} is not a track")]
    NotATrack { id: Identifier },

    #[error("graph: the {0} layer holds no clusters")]
    InvalidLayer(Layer),

    #[error("graph: cannot merge {a} ({a_layer}) with {b} ({b_layer}): layers differ")]
    LayerMismatch {
        a: Identifier,
        a_layer: Layer,
        b: Identifier,
        b_layer: Layer,
    },

    #[error("graph: cluster {0} sits at the origin, angular size undefined")]
    DegenerateGeometry(Identifier),

    #[error("graph: nothing to merge")]
    EmptyMerge,

    #[error("graph: {0}")]
    Id(#[from] IdError),
}
