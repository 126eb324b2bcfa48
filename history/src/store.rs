use std::collections::{BTreeMap, HashMap};

use papas_graph::{ObjectGraph, PfObject};
use papas_id::Identifier;

/// Anything that can resolve an identifier to the object it names.
pub trait ObjectStore {
    type Object;

    fn lookup(&self, id: Identifier) -> Option<&Self::Object>;
}

impl<T> ObjectStore for BTreeMap<Identifier, T> {
    type Object = T;

    fn lookup(&self, id: Identifier) -> Option<&T> {
        self.get(&id)
    }
}

impl<T> ObjectStore for HashMap<Identifier, T> {
    type Object = T;

    fn lookup(&self, id: Identifier) -> Option<&T> {
        self.get(&id)
    }
}

impl ObjectStore for ObjectGraph {
    type Object = PfObject;

    fn lookup(&self, id: Identifier) -> Option<&PfObject> {
        self.get(id)
    }
}
