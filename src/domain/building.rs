//! Building snapshot types
//!
//! A [`BuildingData`] value is one immutable snapshot of the whole site.
//! Mutations never touch a snapshot in place: [`BuildingData::apply_update`]
//! returns a new value and the caller swaps it in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::stages::{stage_index, ConstructionStage, STAGE_ORDER};

/// Progress shown right after any stage change ("just started this stage").
pub const UPDATED_UNIT_PROGRESS: u8 = 10;

/// Parameters of a generated building.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingConfig {
    pub name: String,
    pub total_floors: u32,
    pub units_per_floor: u32,
    #[serde(default)]
    pub unit_prefix: String,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            name: "Keltech Towers".to_string(),
            total_floors: 12,
            units_per_floor: 4,
            unit_prefix: String::new(),
        }
    }
}

/// Sale status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SaleStatus {
    Available,
    Sold,
}

/// Quality check status enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum QualityCheckStatus {
    Pending,
    #[serde(rename = "In Progress")]
    InProgress,
    Passed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QualityCheck {
    pub id: String,
    pub name: String,
    pub status: QualityCheckStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inspector: Option<String>,
}

/// Document type enum
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum DocumentType {
    Pdf,
    Img,
    Doc,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub doc_type: DocumentType,
    pub date: String,
    pub size: String,
}

/// One entry in a unit's site activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLog {
    pub id: String,
    pub date: DateTime<Utc>,
    pub stage: ConstructionStage,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// One sellable apartment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub floor_number: u32,
    pub unit_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    pub status: SaleStatus,
    pub current_stage: ConstructionStage,
    pub progress_percentage: u8,
    pub expected_delivery_date: DateTime<Utc>,
    pub quality_checks: Vec<QualityCheck>,
    pub documents: Vec<Document>,
    /// Newest first.
    pub updates: Vec<UpdateLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Floor {
    pub level: u32,
    pub units: Vec<Unit>,
}

impl Floor {
    /// A floor is cast once every unit on it has reached Structure.
    pub fn is_cast(&self) -> bool {
        self.units
            .iter()
            .all(|u| u.current_stage.is_at_least(ConstructionStage::Structure))
    }
}

/// Root snapshot. Floors are stored top floor first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BuildingData {
    pub name: String,
    pub total_floors: u32,
    pub floors: Vec<Floor>,
}

impl BuildingData {
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.floors.iter().flat_map(|f| f.units.iter())
    }

    pub fn unit(&self, unit_id: &str) -> Option<&Unit> {
        self.units().find(|u| u.id == unit_id)
    }

    pub fn contains_unit(&self, unit_id: &str) -> bool {
        self.unit(unit_id).is_some()
    }

    /// Return a new snapshot with `unit_id` moved to `new_stage`.
    ///
    /// An unknown id yields an unchanged copy. Progress is set to
    /// [`UPDATED_UNIT_PROGRESS`] rather than derived from the new stage.
    pub fn apply_update(
        &self,
        unit_id: &str,
        new_stage: ConstructionStage,
        note: &str,
        image_url: Option<&str>,
    ) -> BuildingData {
        let now = Utc::now();

        let floors = self
            .floors
            .iter()
            .map(|floor| Floor {
                level: floor.level,
                units: floor
                    .units
                    .iter()
                    .map(|unit| {
                        if unit.id != unit_id {
                            return unit.clone();
                        }

                        let mut updates = Vec::with_capacity(unit.updates.len() + 1);
                        updates.push(UpdateLog {
                            id: now.timestamp_millis().to_string(),
                            date: now,
                            stage: new_stage,
                            note: note.to_string(),
                            image_url: image_url.map(str::to_string),
                        });
                        updates.extend(unit.updates.iter().cloned());

                        Unit {
                            current_stage: new_stage,
                            progress_percentage: UPDATED_UNIT_PROGRESS,
                            updates,
                            ..unit.clone()
                        }
                    })
                    .collect(),
            })
            .collect();

        BuildingData {
            name: self.name.clone(),
            total_floors: self.total_floors,
            floors,
        }
    }

    pub fn casted_floor_count(&self) -> usize {
        self.floors.iter().filter(|f| f.is_cast()).count()
    }

    /// Share of floors cast, rounded to a whole percent. Zero floors reads 0.
    pub fn casting_percentage(&self) -> u8 {
        if self.total_floors == 0 {
            return 0;
        }
        let ratio = self.casted_floor_count() as f64 / self.total_floors as f64;
        (ratio * 100.0).round() as u8
    }
}

/// Number of units currently at each stage. Absent stages have no key.
pub fn stage_counts<'a, I>(units: I) -> HashMap<ConstructionStage, usize>
where
    I: IntoIterator<Item = &'a Unit>,
{
    let mut counts = HashMap::new();
    for unit in units {
        *counts.entry(unit.current_stage).or_insert(0) += 1;
    }
    counts
}

/// Building-wide figures for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingStats {
    pub name: String,
    pub total_floors: u32,
    pub total_units: usize,
    pub sold_units: usize,
    pub casted_floors: usize,
    pub casting_percentage: u8,
    pub stage_counts: Vec<StageCount>,
    /// Top floor first, matching the snapshot.
    pub floors: Vec<FloorSummary>,
}

/// Per-floor badge data for the building view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorSummary {
    pub level: u32,
    pub is_cast: bool,
    pub unit_count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount {
    pub stage: ConstructionStage,
    pub count: usize,
    pub color: &'static str,
}

impl From<&BuildingData> for BuildingStats {
    fn from(building: &BuildingData) -> Self {
        let counts = stage_counts(building.units());

        // Chart order follows the build order, not hash order.
        let stage_counts = STAGE_ORDER
            .iter()
            .filter_map(|stage| {
                counts.get(stage).map(|&count| StageCount {
                    stage: *stage,
                    count,
                    color: stage.color_hex(),
                })
            })
            .collect();

        Self {
            name: building.name.clone(),
            total_floors: building.total_floors,
            total_units: building.units().count(),
            sold_units: building
                .units()
                .filter(|u| u.status == SaleStatus::Sold)
                .count(),
            casted_floors: building.casted_floor_count(),
            casting_percentage: building.casting_percentage(),
            stage_counts,
            floors: building
                .floors
                .iter()
                .map(|floor| FloorSummary {
                    level: floor.level,
                    is_cast: floor.is_cast(),
                    unit_count: floor.units.len(),
                })
                .collect(),
        }
    }
}

/// One milestone in a unit's construction timeline.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub stage: ConstructionStage,
    pub completed: bool,
    pub current: bool,
}

impl Unit {
    /// Milestones from Foundation to Handover Ready, flagged against the
    /// unit's current stage.
    pub fn timeline(&self) -> Vec<Milestone> {
        let current = stage_index(self.current_stage);

        STAGE_ORDER
            .iter()
            .filter(|s| **s != ConstructionStage::NotStarted)
            .map(|&stage| {
                let idx = stage_index(stage);
                Milestone {
                    stage,
                    completed: idx <= current,
                    current: idx == current,
                }
            })
            .collect()
    }
}

// =============================================================================
// Request DTOs for API endpoints
// =============================================================================

/// Request for regenerating the building. Wipes every unit's progress.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureBuildingRequest {
    #[serde(flatten)]
    pub config: BuildingConfig,
    /// Must be `true`; regeneration cannot be undone.
    #[serde(default)]
    pub confirm: bool,
}

/// Request for a manual stage update on one unit.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitUpdateRequest {
    pub stage: ConstructionStage,
    #[serde(default)]
    pub note: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stages::stage_progress;

    fn unit(id: &str, floor: u32, stage: ConstructionStage) -> Unit {
        Unit {
            id: id.to_string(),
            floor_number: floor,
            unit_number: id[id.len() - 2..].to_string(),
            owner_name: None,
            status: SaleStatus::Available,
            current_stage: stage,
            progress_percentage: stage_progress(stage),
            expected_delivery_date: Utc::now(),
            quality_checks: Vec::new(),
            documents: Vec::new(),
            updates: vec![UpdateLog {
                id: format!("init-{id}"),
                date: Utc::now(),
                stage: ConstructionStage::Foundation,
                note: "seed".to_string(),
                image_url: None,
            }],
        }
    }

    fn two_floor_building() -> BuildingData {
        BuildingData {
            name: "Tower".to_string(),
            total_floors: 2,
            floors: vec![
                Floor {
                    level: 2,
                    units: vec![
                        unit("201", 2, ConstructionStage::Foundation),
                        unit("202", 2, ConstructionStage::Structure),
                    ],
                },
                Floor {
                    level: 1,
                    units: vec![
                        unit("101", 1, ConstructionStage::Brickwork),
                        unit("102", 1, ConstructionStage::Structure),
                    ],
                },
            ],
        }
    }

    #[test]
    fn apply_update_replaces_only_the_target_unit() {
        let before = two_floor_building();
        let after = before.apply_update("201", ConstructionStage::Brickwork, "walls up", None);

        let updated = after.unit("201").unwrap();
        assert_eq!(updated.current_stage, ConstructionStage::Brickwork);
        assert_eq!(updated.progress_percentage, UPDATED_UNIT_PROGRESS);
        assert_eq!(updated.updates.len(), 2);
        assert_eq!(updated.updates[0].stage, ConstructionStage::Brickwork);
        assert_eq!(updated.updates[0].note, "walls up");
        assert_eq!(updated.updates[1].id, "init-201");

        for id in ["202", "101", "102"] {
            assert_eq!(after.unit(id), before.unit(id));
        }

        // The input snapshot is untouched.
        assert_eq!(
            before.unit("201").unwrap().current_stage,
            ConstructionStage::Foundation
        );
    }

    #[test]
    fn apply_update_keeps_unrelated_unit_fields() {
        let before = two_floor_building();
        let after = before.apply_update(
            "101",
            ConstructionStage::HandoverReady,
            "keys ready",
            Some("data:image/jpeg;base64,AAAA"),
        );

        let old = before.unit("101").unwrap();
        let new = after.unit("101").unwrap();
        assert_eq!(new.floor_number, old.floor_number);
        assert_eq!(new.status, old.status);
        assert_eq!(new.quality_checks, old.quality_checks);
        assert_eq!(new.documents, old.documents);
        // Progress is the fixed "just started" value even at the last stage.
        assert_eq!(new.progress_percentage, 10);
        assert_eq!(
            new.updates[0].image_url.as_deref(),
            Some("data:image/jpeg;base64,AAAA")
        );
    }

    #[test]
    fn apply_update_on_unknown_id_is_a_no_op() {
        let before = two_floor_building();
        let after = before.apply_update("999", ConstructionStage::Structure, "nope", None);
        assert_eq!(after, before);
        assert!(!after.contains_unit("999"));
    }

    #[test]
    fn floor_cast_requires_every_unit_at_structure() {
        let building = two_floor_building();
        // Top floor still has a unit at Foundation.
        assert!(!building.floors[0].is_cast());
        assert!(building.floors[1].is_cast());
        assert_eq!(building.casted_floor_count(), 1);
        assert_eq!(building.casting_percentage(), 50);

        let building = building.apply_update("201", ConstructionStage::Structure, "cast", None);
        assert_eq!(building.casted_floor_count(), 2);
        assert_eq!(building.casting_percentage(), 100);
    }

    #[test]
    fn casting_percentage_guards_empty_building() {
        let building = BuildingData {
            name: "Empty".to_string(),
            total_floors: 0,
            floors: Vec::new(),
        };
        assert_eq!(building.casting_percentage(), 0);
    }

    #[test]
    fn stage_counts_only_lists_present_stages() {
        let building = two_floor_building();
        let counts = stage_counts(building.units());
        assert_eq!(counts.len(), 3);
        assert_eq!(counts[&ConstructionStage::Structure], 2);
        assert_eq!(counts[&ConstructionStage::Foundation], 1);
        assert_eq!(counts[&ConstructionStage::Brickwork], 1);
        assert!(!counts.contains_key(&ConstructionStage::HandoverReady));
    }

    #[test]
    fn stats_order_stage_counts_by_build_order() {
        let stats = BuildingStats::from(&two_floor_building());
        let stages: Vec<_> = stats.stage_counts.iter().map(|c| c.stage).collect();
        assert_eq!(
            stages,
            vec![
                ConstructionStage::Foundation,
                ConstructionStage::Structure,
                ConstructionStage::Brickwork,
            ]
        );
        assert_eq!(stats.total_units, 4);
        assert_eq!(stats.sold_units, 0);
    }

    #[test]
    fn stats_flag_each_cast_floor() {
        let stats = BuildingStats::from(&two_floor_building());
        let flags: Vec<_> = stats.floors.iter().map(|f| (f.level, f.is_cast)).collect();
        assert_eq!(flags, vec![(2, false), (1, true)]);
        assert_eq!(stats.floors[0].unit_count, 2);

        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["floors"][1]["isCast"], true);
    }

    #[test]
    fn timeline_marks_completed_and_current_milestones() {
        let u = unit("101", 1, ConstructionStage::Structure);
        let timeline = u.timeline();
        assert_eq!(timeline.len(), STAGE_ORDER.len() - 1);
        assert_eq!(timeline[0].stage, ConstructionStage::Foundation);
        assert!(timeline[0].completed && !timeline[0].current);
        assert!(timeline[1].completed && timeline[1].current);
        assert!(!timeline[2].completed);
    }

    #[test]
    fn wire_format_uses_dashboard_field_names() {
        let building = two_floor_building();
        let json = serde_json::to_value(&building).unwrap();
        let first = &json["floors"][0]["units"][0];
        assert_eq!(first["id"], "201");
        assert_eq!(first["floorNumber"], 2);
        assert_eq!(first["currentStage"], "Foundation");
        assert_eq!(first["status"], "Available");
        assert!(first.get("ownerName").is_none());
        assert_eq!(json["totalFloors"], 2);
    }
}
