use std::collections::BTreeMap;

use papas_id::Category;
use tracing::debug;

/// Largest cluster energy seen so far, per cluster category.
///
/// Raw, smeared and merged clusters of each calorimeter keep separate
/// marks. Cluster construction feeds it, see [`crate::Cluster::create`] and
/// [`crate::merge_all`]. Lives as long as a run and is shared by every event
/// in it. Not synchronized: one worker owns it at a time.
#[derive(Debug, Clone, Default)]
pub struct EnergyHighWater {
    max: BTreeMap<Category, f64>,
}

impl EnergyHighWater {
    /// Records `energy` for `category`. Returns true when it raised the mark.
    pub fn observe(&mut self, category: Category, energy: f64) -> bool {
        let entry = self.max.entry(category).or_insert(0.0);
        if energy > *entry {
            *entry = energy;
            true
        } else {
            false
        }
    }

    /// Current mark for `category`, zero if nothing was observed.
    pub fn max(&self, category: Category) -> f64 {
        self.max.get(&category).copied().unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        self.max.clear();
    }
}

/// State that outlives individual events.
#[derive(Debug, Default)]
pub struct Run {
    high_water: EnergyHighWater,
    events: u64,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets all run-wide state. Call once before the first event.
    pub fn start(&mut self) {
        self.high_water.reset();
        self.events = 0;
        debug!("run started");
    }

    /// Marks the end of one event.
    pub fn end_event(&mut self) {
        self.events += 1;
    }

    pub fn events(&self) -> u64 {
        self.events
    }

    pub fn high_water(&self) -> &EnergyHighWater {
        &self.high_water
    }

    pub fn high_water_mut(&mut self) -> &mut EnergyHighWater {
        &mut self.high_water
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use papas_id::{IdSequence, ObjectType, Subtype};

    use super::*;
    use crate::merge::ClusterMerger;
    use crate::object::{Cluster, Layer};

    const ET: Category = Category::new(ObjectType::EcalCluster, Subtype::Raw);
    const ES: Category = Category::new(ObjectType::EcalCluster, Subtype::Smeared);
    const EM: Category = Category::new(ObjectType::EcalCluster, Subtype::Merged);
    const HT: Category = Category::new(ObjectType::HcalCluster, Subtype::Raw);

    #[test]
    fn observe_tracks_maximum_per_category() {
        let mut hw = EnergyHighWater::default();
        assert_eq!(hw.max(ET), 0.0);
        assert!(hw.observe(ET, 3.0));
        assert!(!hw.observe(ET, 2.0));
        assert!(hw.observe(HT, 1.0));
        assert_eq!(hw.max(ET), 3.0);
        assert_eq!(hw.max(HT), 1.0);
    }

    #[test]
    fn every_cluster_stage_is_recorded() {
        let mut seq = IdSequence::new();
        let mut hw = EnergyHighWater::default();
        let pos = Vector3::new(1.0, 0.0, 0.0);

        let raw = Cluster::create(&mut seq, &mut hw, Layer::EcalIn, Subtype::Raw, pos, 50.0, 0.1)
            .unwrap();
        let smeared =
            Cluster::create(&mut seq, &mut hw, Layer::EcalIn, Subtype::Smeared, pos, 40.0, 0.1)
                .unwrap()
                .with_source(raw.id);
        let out = ClusterMerger::default()
            .merge_overlapping(&[smeared], &mut seq, &mut hw)
            .unwrap();

        assert_eq!(out.clusters.len(), 1);
        assert_eq!(hw.max(ET), 50.0);
        assert_eq!(hw.max(ES), 40.0);
        assert_eq!(hw.max(EM), 40.0);
        assert_eq!(hw.max(HT), 0.0);
    }

    #[test]
    fn start_resets_run_state() {
        let mut run = Run::new();
        run.high_water_mut().observe(ES, 10.0);
        run.end_event();
        assert_eq!(run.events(), 1);

        run.start();
        assert_eq!(run.events(), 0);
        assert_eq!(run.high_water().max(ES), 0.0);
    }
}
