//! Construction stage taxonomy
//!
//! The ordered list of construction stages a unit moves through. Every
//! "is this unit past stage X" question in the service is answered by
//! position in [`STAGE_ORDER`], never by comparing labels.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A discrete phase of construction.
///
/// The wire form is the human-readable label the dashboard and the
/// analysis model both use (e.g. `"Plaster (Internal)"`). Deserialization
/// goes through [`FromStr`], so unknown labels fail there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum ConstructionStage {
    NotStarted,
    Foundation,
    Structure,
    Brickwork,
    ElectricalConduits,
    PlumbingInternal,
    PlumbingExternal,
    FirefightingWork,
    PlasterInternal,
    PlasterExternal,
    UpvcWork,
    RailingWork,
    FlooringTiles,
    BathroomTiles,
    PaintingInternal,
    PaintingExternal,
    HandoverReady,
}

/// Build order of every stage, first to last.
pub const STAGE_ORDER: [ConstructionStage; 17] = [
    ConstructionStage::NotStarted,
    ConstructionStage::Foundation,
    ConstructionStage::Structure,
    ConstructionStage::Brickwork,
    ConstructionStage::ElectricalConduits,
    ConstructionStage::PlumbingInternal,
    ConstructionStage::FirefightingWork,
    ConstructionStage::PlasterInternal,
    ConstructionStage::UpvcWork,
    ConstructionStage::PlasterExternal,
    ConstructionStage::PlumbingExternal,
    ConstructionStage::RailingWork,
    ConstructionStage::BathroomTiles,
    ConstructionStage::FlooringTiles,
    ConstructionStage::PaintingInternal,
    ConstructionStage::PaintingExternal,
    ConstructionStage::HandoverReady,
];

impl ConstructionStage {
    /// Display label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Not Started",
            Self::Foundation => "Foundation",
            Self::Structure => "Structure",
            Self::Brickwork => "Brickwork",
            Self::ElectricalConduits => "Electrical Conduits",
            Self::PlumbingInternal => "Plumbing (Internal)",
            Self::PlumbingExternal => "Plumbing (External)",
            Self::FirefightingWork => "Firefighting Systems",
            Self::PlasterInternal => "Plaster (Internal)",
            Self::PlasterExternal => "Plaster (External)",
            Self::UpvcWork => "UPVC Windows/Doors",
            Self::RailingWork => "Railing Work",
            Self::FlooringTiles => "Flooring Tiles",
            Self::BathroomTiles => "Bathroom Tiles",
            Self::PaintingInternal => "Painting (Internal)",
            Self::PaintingExternal => "Painting (External)",
            Self::HandoverReady => "Handover Ready",
        }
    }

    /// Chart colour used by the dashboard.
    pub fn color_hex(self) -> &'static str {
        match self {
            Self::NotStarted => "#e5e7eb",
            Self::Foundation => "#a8a29e",
            Self::Structure => "#94a3b8",
            Self::Brickwork => "#fdba74",
            Self::ElectricalConduits => "#fef08a",
            Self::PlumbingInternal => "#bfdbfe",
            Self::PlumbingExternal => "#93c5fd",
            Self::FirefightingWork => "#fecaca",
            Self::PlasterInternal => "#fef3c7",
            Self::PlasterExternal => "#fde68a",
            Self::UpvcWork => "#bae6fd",
            Self::RailingWork => "#d4d4d8",
            Self::FlooringTiles => "#99f6e4",
            Self::BathroomTiles => "#a5f3fc",
            Self::PaintingInternal => "#e9d5ff",
            Self::PaintingExternal => "#d8b4fe",
            Self::HandoverReady => "#22c55e",
        }
    }

    /// True when `self` is at least as far along as `other`.
    pub fn is_at_least(self, other: ConstructionStage) -> bool {
        match (stage_index(self), stage_index(other)) {
            (Some(a), Some(b)) => a >= b,
            _ => false,
        }
    }
}

/// Position of `stage` in [`STAGE_ORDER`].
///
/// `None` means the comparison is undefined; with a closed enum this only
/// happens if `STAGE_ORDER` ever drops a variant.
pub fn stage_index(stage: ConstructionStage) -> Option<usize> {
    STAGE_ORDER.iter().position(|s| *s == stage)
}

/// Overall completion percentage implied by reaching `stage`.
pub fn stage_progress(stage: ConstructionStage) -> u8 {
    let Some(index) = stage_index(stage) else {
        return 0;
    };
    let last = (STAGE_ORDER.len() - 1) as f64;
    ((index as f64 / last) * 100.0).round() as u8
}

impl fmt::Display for ConstructionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown construction stage: {0}")]
pub struct UnknownStage(pub String);

impl FromStr for ConstructionStage {
    type Err = UnknownStage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        STAGE_ORDER
            .iter()
            .copied()
            .find(|stage| stage.label() == s)
            .ok_or_else(|| UnknownStage(s.to_string()))
    }
}

impl TryFrom<String> for ConstructionStage {
    type Error = UnknownStage;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        label.parse()
    }
}

impl From<ConstructionStage> for &'static str {
    fn from(stage: ConstructionStage) -> Self {
        stage.label()
    }
}

/// Taxonomy entry as listed by `GET /stages`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageInfo {
    pub stage: ConstructionStage,
    pub index: usize,
    pub progress: u8,
    pub color: &'static str,
}

pub fn stage_catalog() -> Vec<StageInfo> {
    STAGE_ORDER
        .iter()
        .enumerate()
        .map(|(index, &stage)| StageInfo {
            stage,
            index,
            progress: stage_progress(stage),
            color: stage.color_hex(),
        })
        .collect()
}
