use papas_id::Identifier;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MatchError;
use crate::matchable::{DeltaR, Matchable, Metric};

/// Controls matcher behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Cone size. A target matches only when strictly closer than this.
    /// Default: 0.3.
    pub delta_r: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self { delta_r: 0.3 }
    }
}

impl MatchConfig {
    pub fn with_delta_r(mut self, delta_r: f64) -> Self {
        self.delta_r = delta_r;
        self
    }

    fn validate(self) -> Result<Self, MatchError> {
        if !(self.delta_r.is_finite() && self.delta_r > 0.0) {
            return Err(MatchError::InvalidThreshold(self.delta_r));
        }
        Ok(self)
    }
}

/// Outcome of matching one source element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub source: Identifier,
    /// Closest target inside the cone, if any.
    pub matched: Option<Identifier>,
    /// Metric value to `matched`; `None` when unmatched.
    pub distance: Option<f64>,
}

impl Match {
    pub fn is_matched(&self) -> bool {
        self.matched.is_some()
    }
}

/// Greedy nearest-neighbour matcher.
#[derive(Debug, Clone)]
pub struct Matcher<M = DeltaR> {
    cfg: MatchConfig,
    metric: M,
}

impl Matcher<DeltaR> {
    /// Creates a matcher using [`DeltaR`].
    pub fn new(cfg: MatchConfig) -> Result<Self, MatchError> {
        Self::with_metric(cfg, DeltaR)
    }
}

impl<M: Metric> Matcher<M> {
    pub fn with_metric(cfg: MatchConfig, metric: M) -> Result<Self, MatchError> {
        Ok(Self {
            cfg: cfg.validate()?,
            metric,
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Finds the closest target to `source` among `targets`.
    ///
    /// Returns `(id, distance)` of the closest target strictly inside the
    /// cone. Equal distances go to the smaller identifier. Targets at an
    /// undefined (NaN) distance never match.
    pub fn nearest<'a, S, T, I>(&self, source: &S, targets: I) -> Option<(Identifier, f64)>
    where
        S: Matchable + ?Sized,
        T: Matchable + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let dir = source.direction();
        let mut best: Option<(Identifier, f64)> = None;
        for t in targets {
            let d = self.metric.distance(&dir, &t.direction());
            if d.is_nan() || d >= self.cfg.delta_r {
                continue;
            }
            let id = t.id();
            best = match best {
                Some((bid, bd)) if bd < d || (bd == d && bid <= id) => Some((bid, bd)),
                _ => Some((id, d)),
            };
        }
        best
    }

    /// Matches every source element against `targets`.
    ///
    /// When `filter` is given only targets it accepts are considered. The
    /// result has one entry per source, in source order.
    pub fn match_collection<S, T>(
        &self,
        sources: &[S],
        targets: &[T],
        filter: Option<&dyn Fn(&T) -> bool>,
    ) -> Vec<Match>
    where
        S: Matchable,
        T: Matchable,
    {
        let candidates: Vec<&T> = match filter {
            Some(keep) => targets.iter().filter(|&t| keep(t)).collect(),
            None => targets.iter().collect(),
        };

        let matches: Vec<Match> = sources
            .iter()
            .map(|s| {
                let best = self.nearest(s, candidates.iter().copied());
                Match {
                    source: s.id(),
                    matched: best.map(|(id, _)| id),
                    distance: best.map(|(_, d)| d),
                }
            })
            .collect();

        debug!(
            "matched {}/{} sources against {} candidates",
            matches.iter().filter(|m| m.is_matched()).count(),
            sources.len(),
            candidates.len()
        );
        matches
    }

    /// [`Matcher::match_collection`] restricted to targets with PDG code
    /// `pdgid`, or all targets when `pdgid` is `None`.
    pub fn match_pdgid<S, T>(&self, sources: &[S], targets: &[T], pdgid: Option<i32>) -> Vec<Match>
    where
        S: Matchable,
        T: Matchable,
    {
        match pdgid {
            Some(code) => {
                let keep = |t: &T| t.pdgid() == Some(code);
                self.match_collection(sources, targets, Some(&keep))
            }
            None => self.match_collection(sources, targets, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use papas_graph::Direction;
    use papas_id::{Category, IdSequence, ObjectType, Subtype};

    use super::*;

    /// Bare point for exercising the matcher without physics objects.
    struct Point {
        id: Identifier,
        dir: Direction,
        pdgid: Option<i32>,
    }

    impl Matchable for Point {
        fn id(&self) -> Identifier {
            self.id
        }

        fn direction(&self) -> Direction {
            self.dir
        }

        fn pdgid(&self) -> Option<i32> {
            self.pdgid
        }
    }

    fn point(seq: &mut IdSequence, theta: f64, phi: f64) -> Point {
        let cat = Category::new(ObjectType::Particle, Subtype::Reconstructed);
        Point {
            id: seq.next_id(cat, 1.0).unwrap(),
            dir: Direction::new(theta, phi),
            pdgid: None,
        }
    }

    fn matcher(delta_r: f64) -> Matcher {
        Matcher::new(MatchConfig::default().with_delta_r(delta_r)).unwrap()
    }

    #[test]
    fn picks_the_nearest_inside_the_cone() {
        let mut seq = IdSequence::new();
        let a = point(&mut seq, 0.0, 0.0);
        let b1 = point(&mut seq, 0.1, 0.0);
        let b2 = point(&mut seq, 5.0, 5.0);
        let (a_id, b1_id) = (a.id, b1.id);

        let m = matcher(0.5).match_collection(&[a], &[b1, b2], None);
        assert_eq!(m.len(), 1);
        assert_eq!(m[0].source, a_id);
        assert_eq!(m[0].matched, Some(b1_id));
        assert!((m[0].distance.unwrap() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn recorded_distance_is_the_metric_value() {
        let mut seq = IdSequence::new();
        let a = point(&mut seq, 0.0, 0.0);
        let b1 = point(&mut seq, 0.1, 0.0);
        let b2 = point(&mut seq, 5.0, 5.0);
        let (b1_id, expected) = (b1.id, DeltaR.distance(&a.dir, &b1.dir));

        let m = matcher(0.5).match_collection(&[a], &[b2, b1], None);
        assert_eq!(m[0].matched, Some(b1_id));
        assert_eq!(m[0].distance, Some(expected));
    }

    #[test]
    fn empty_target_never_matches() {
        let mut seq = IdSequence::new();
        let a = point(&mut seq, 0.0, 0.0);
        let b = point(&mut seq, 1.0, 0.0);
        let targets: [Point; 0] = [];

        let m = matcher(0.5).match_collection(&[a, b], &targets, None);
        assert_eq!(m.len(), 2);
        assert!(m.iter().all(|x| x.matched.is_none() && x.distance.is_none()));
    }

    #[test]
    fn threshold_is_strict() {
        let mut seq = IdSequence::new();
        let a = point(&mut seq, 0.0, 0.0);
        let b = point(&mut seq, 0.5, 0.0);
        let m = matcher(0.5).match_collection(&[a], &[b], None);
        assert!(!m[0].is_matched());
    }

    #[test]
    fn ties_go_to_the_smaller_id() {
        let mut seq = IdSequence::new();
        let a = point(&mut seq, 0.0, 0.0);
        let near = point(&mut seq, 0.0, 0.1);
        let mirror = point(&mut seq, 0.0, -0.1);
        let near_id = near.id;

        let m = matcher(0.5).match_collection(&[a], &[mirror, near], None);
        assert_eq!(m[0].matched, Some(near_id));
    }

    #[test]
    fn many_to_one() {
        let mut seq = IdSequence::new();
        let a1 = point(&mut seq, 0.0, 0.0);
        let a2 = point(&mut seq, 0.02, 0.0);
        let b = point(&mut seq, 0.01, 0.0);
        let b_id = b.id;

        let m = matcher(0.3).match_collection(&[a1, a2], &[b], None);
        assert_eq!(m[0].matched, Some(b_id));
        assert_eq!(m[1].matched, Some(b_id));
    }

    #[test]
    fn filter_restricts_targets() {
        let mut seq = IdSequence::new();
        let a = point(&mut seq, 0.0, 0.0);
        let mut photon = point(&mut seq, 0.01, 0.0);
        photon.pdgid = Some(22);
        let mut pion = point(&mut seq, 0.05, 0.0);
        pion.pdgid = Some(211);
        let (photon_id, pion_id) = (photon.id, pion.id);
        let targets = [photon, pion];
        let sources = [a];

        let mm = matcher(0.3);
        assert_eq!(mm.match_pdgid(&sources, &targets, None)[0].matched, Some(photon_id));
        assert_eq!(mm.match_pdgid(&sources, &targets, Some(211))[0].matched, Some(pion_id));
        assert!(!mm.match_pdgid(&sources, &targets, Some(130))[0].is_matched());
    }

    #[test]
    fn rejects_bad_thresholds() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = Matcher::new(MatchConfig::default().with_delta_r(bad)).unwrap_err();
            assert!(matches!(err, MatchError::InvalidThreshold(_)));
        }
    }

    #[test]
    fn config_from_yaml() {
        let cfg: MatchConfig = serde_yaml::from_str("delta_r: 0.4\n").unwrap();
        assert_eq!(cfg.delta_r, 0.4);
        let cfg: MatchConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, MatchConfig::default());
    }
}
