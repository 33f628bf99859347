//! Applying model analyses to the building, and the single-flight gate
//! around the model call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::domain::ai::{AiAnalysisResult, AnalysisOutcome};
use crate::domain::building::BuildingData;

/// Apply `result` to every unit it names.
///
/// Each candidate is matched exactly against unit ids first, then against
/// the in-floor unit number label. A unit is updated at most once per analysis;
/// candidates with no match are reported back.
pub fn apply_analysis(
    building: &BuildingData,
    result: &AiAnalysisResult,
    image_url: Option<&str>,
) -> (BuildingData, AnalysisOutcome) {
    let mut current = building.clone();
    let mut outcome = AnalysisOutcome::default();

    for candidate in &result.detected_unit_ids {
        let matched = current
            .units()
            .find(|u| &u.id == candidate)
            .or_else(|| current.units().find(|u| &u.unit_number == candidate))
            .map(|u| u.id.clone());

        match matched {
            Some(id) if outcome.updated_unit_ids.contains(&id) => {
                tracing::debug!(unit_id = %id, "Unit already updated by this analysis");
            }
            Some(id) => {
                current =
                    current.apply_update(&id, result.suggested_stage, &result.summary, image_url);
                outcome.updated_unit_ids.push(id);
            }
            None => outcome.unmatched_ids.push(candidate.clone()),
        }
    }

    (current, outcome)
}

/// Allows one model analysis in flight at a time.
#[derive(Clone, Default)]
pub struct AnalysisGate {
    busy: Arc<AtomicBool>,
}

/// Held while an analysis runs; releases the gate on drop.
pub struct AnalysisPermit {
    busy: Arc<AtomicBool>,
}

impl AnalysisGate {
    /// `None` when another analysis is still running.
    pub fn try_acquire(&self) -> Option<AnalysisPermit> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| AnalysisPermit {
                busy: self.busy.clone(),
            })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for AnalysisPermit {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::building::{BuildingConfig, UPDATED_UNIT_PROGRESS};
    use crate::domain::stages::ConstructionStage;
    use crate::services::generator::generate_building;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn building(floors: u32, units: u32) -> BuildingData {
        let config = BuildingConfig {
            name: "Tower".to_string(),
            total_floors: floors,
            units_per_floor: units,
            unit_prefix: String::new(),
        };
        generate_building(&config, &mut ChaCha8Rng::seed_from_u64(7)).unwrap()
    }

    fn analysis(ids: &[&str]) -> AiAnalysisResult {
        AiAnalysisResult {
            suggested_stage: ConstructionStage::Structure,
            confidence: 0.9,
            summary: "Slab cast on the third floor.".to_string(),
            detected_unit_ids: ids.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn matched_ids_are_updated_once_and_misses_reported() {
        let before = building(4, 2);
        let (after, outcome) = apply_analysis(&before, &analysis(&["301", "302", "399"]), None);

        assert_eq!(outcome.updated_unit_ids, vec!["301", "302"]);
        assert_eq!(outcome.unmatched_ids, vec!["399"]);

        for id in ["301", "302"] {
            let unit = after.unit(id).unwrap();
            assert_eq!(unit.current_stage, ConstructionStage::Structure);
            assert_eq!(unit.progress_percentage, UPDATED_UNIT_PROGRESS);
            assert_eq!(unit.updates.len(), before.unit(id).unwrap().updates.len() + 1);
            assert_eq!(unit.updates[0].note, "Slab cast on the third floor.");
        }
        for id in ["101", "102", "201", "202", "401", "402"] {
            assert_eq!(after.unit(id), before.unit(id));
        }
    }

    #[test]
    fn duplicate_candidates_update_a_unit_once() {
        let before = building(4, 2);
        let (after, outcome) = apply_analysis(&before, &analysis(&["301", "301"]), None);
        assert_eq!(outcome.updated_unit_ids, vec!["301"]);
        assert_eq!(after.unit("301").unwrap().updates.len(), 2);
    }

    #[test]
    fn unit_number_label_is_a_fallback_match() {
        let before = building(3, 2);
        let (after, outcome) = apply_analysis(&before, &analysis(&["02"]), Some("img"));
        // First unit numbered "02" in snapshot order is on the top floor.
        assert_eq!(outcome.updated_unit_ids, vec!["302"]);
        assert_eq!(
            after.unit("302").unwrap().updates[0].image_url.as_deref(),
            Some("img")
        );
    }

    #[test]
    fn candidates_must_match_exactly() {
        let before = building(4, 2);
        let (after, outcome) = apply_analysis(&before, &analysis(&[" 301", "unit 302"]), None);
        assert!(outcome.updated_unit_ids.is_empty());
        assert_eq!(outcome.unmatched_ids, vec![" 301", "unit 302"]);
        assert_eq!(after, before);
    }

    #[test]
    fn fallback_result_changes_nothing() {
        let before = building(4, 2);
        let (after, outcome) = apply_analysis(&before, &AiAnalysisResult::fallback(), None);
        assert_eq!(after, before);
        assert!(outcome.updated_unit_ids.is_empty());
        assert!(outcome.unmatched_ids.is_empty());
    }

    #[test]
    fn manual_update_on_small_tower() {
        let before = building(4, 2);
        let after = before.apply_update("102", ConstructionStage::Foundation, "demo", None);

        let unit = after.unit("102").unwrap();
        assert_eq!(unit.current_stage, ConstructionStage::Foundation);
        assert_eq!(unit.progress_percentage, 10);
        assert_eq!(unit.updates.len(), before.unit("102").unwrap().updates.len() + 1);
        for other in before.units().filter(|u| u.id != "102") {
            assert_eq!(after.unit(&other.id), Some(other));
        }
    }

    #[test]
    fn gate_admits_one_analysis_at_a_time() {
        let gate = AnalysisGate::default();
        let permit = gate.try_acquire().expect("gate starts open");
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());

        drop(permit);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }
}
