use std::collections::BTreeMap;

use papas_id::Identifier;

use crate::matchable::{Matchable, Metric};
use crate::matcher::{Match, Matcher};

/// Name of the result set for matches against targets with PDG code
/// `pdgid`: `"match"` for all targets, `"match_211"` for pions only.
pub fn match_name(pdgid: Option<i32>) -> String {
    match pdgid {
        Some(code) => format!("match_{code}"),
        None => "match".to_string(),
    }
}

/// Name under which the distance of a [`match_name`] result is reported.
pub fn distance_name(pdgid: Option<i32>) -> String {
    match pdgid {
        Some(code) => format!("dr_{code}"),
        None => "dr".to_string(),
    }
}

/// Named match results for one source collection.
///
/// The same sources can be matched several times, against different
/// targets or with different filters. Each run is stored under its own name
/// and never changes the source objects themselves.
#[derive(Debug, Clone, Default)]
pub struct MatchRecord {
    sets: BTreeMap<String, BTreeMap<Identifier, Match>>,
}

impl MatchRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `matches` under `name`, replacing any previous set.
    pub fn insert(&mut self, name: impl Into<String>, matches: Vec<Match>) {
        let set = matches.into_iter().map(|m| (m.source, m)).collect();
        self.sets.insert(name.into(), set);
    }

    /// Runs `matcher` with a PDG filter and stores the result under
    /// [`match_name`]. Returns the name used.
    pub fn record<M, S, T>(
        &mut self,
        matcher: &Matcher<M>,
        sources: &[S],
        targets: &[T],
        pdgid: Option<i32>,
    ) -> String
    where
        M: Metric,
        S: Matchable,
        T: Matchable,
    {
        let name = match_name(pdgid);
        self.insert(name.clone(), matcher.match_pdgid(sources, targets, pdgid));
        name
    }

    pub fn get(&self, name: &str, source: Identifier) -> Option<&Match> {
        self.sets.get(name)?.get(&source)
    }

    /// Matched target of `source` in set `name`.
    pub fn matched(&self, name: &str, source: Identifier) -> Option<Identifier> {
        self.get(name, source)?.matched
    }

    pub fn distance(&self, name: &str, source: Identifier) -> Option<f64> {
        self.get(name, source)?.distance
    }

    pub fn set(&self, name: &str) -> Option<&BTreeMap<Identifier, Match>> {
        self.sets.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
