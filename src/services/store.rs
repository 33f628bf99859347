//! In-memory holder of the current building snapshot.
//!
//! Readers clone the `Arc` and work on a stable snapshot. Writers compute the
//! next snapshot from the latest one under the write lock, so transactions
//! are applied one after another.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::domain::building::BuildingData;

#[derive(Clone)]
pub struct BuildingStore {
    current: Arc<RwLock<Arc<BuildingData>>>,
}

impl BuildingStore {
    pub fn new(building: BuildingData) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(building))),
        }
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Arc<BuildingData> {
        self.current.read().clone()
    }

    /// Discard the current snapshot and install `building`.
    pub fn replace(&self, building: BuildingData) -> Arc<BuildingData> {
        let next = Arc::new(building);
        *self.current.write() = next.clone();
        next
    }

    /// Derive the next snapshot from the latest one.
    ///
    /// `f` runs under the write lock and must not block.
    pub fn update<T, F>(&self, f: F) -> (Arc<BuildingData>, T)
    where
        F: FnOnce(&BuildingData) -> (BuildingData, T),
    {
        let mut guard = self.current.write();
        let (next, out) = f(&guard);
        let next = Arc::new(next);
        *guard = next.clone();
        (next, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::building::BuildingConfig;
    use crate::domain::stages::ConstructionStage;
    use crate::services::generator::generate_building;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn store() -> BuildingStore {
        let building =
            generate_building(&BuildingConfig::default(), &mut ChaCha8Rng::seed_from_u64(3))
                .unwrap();
        BuildingStore::new(building)
    }

    #[test]
    fn update_swaps_snapshot_and_keeps_old_one_valid() {
        let store = store();
        let before = store.snapshot();

        let (after, ()) = store.update(|b| {
            (
                b.apply_update("101", ConstructionStage::HandoverReady, "done", None),
                (),
            )
        });

        assert_eq!(
            store.snapshot().unit("101").unwrap().current_stage,
            ConstructionStage::HandoverReady
        );
        assert_eq!(after.unit("101"), store.snapshot().unit("101"));
        assert_ne!(
            before.unit("101").unwrap().current_stage,
            ConstructionStage::HandoverReady
        );
    }

    #[test]
    fn replace_discards_prior_state() {
        let store = store();
        store.update(|b| (b.apply_update("101", ConstructionStage::Structure, "x", None), ()));

        let config = BuildingConfig {
            name: "Annex".to_string(),
            total_floors: 2,
            units_per_floor: 2,
            unit_prefix: "B-".to_string(),
        };
        let fresh = generate_building(&config, &mut ChaCha8Rng::seed_from_u64(4)).unwrap();
        store.replace(fresh);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.name, "Annex");
        assert!(!snapshot.contains_unit("101"));
        assert!(snapshot.contains_unit("B-101"));
    }
}
