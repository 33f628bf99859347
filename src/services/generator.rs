//! Synthesizes a complete demo building from four configuration values.
//!
//! Structural fields (ids, floors, stages, dates) are derived from the
//! configuration; sale status comes from the caller-supplied random source.

use chrono::{DateTime, Duration, Months, Utc};
use rand::Rng;
use thiserror::Error;

use crate::domain::building::{
    BuildingConfig, BuildingData, Document, DocumentType, Floor, QualityCheck,
    QualityCheckStatus, SaleStatus, Unit, UpdateLog,
};
use crate::domain::stages::{stage_index, stage_progress, ConstructionStage};

/// Probability that a generated unit is already sold.
const SOLD_PROBABILITY: f64 = 0.7;

/// Age of the seed activity entry, in milliseconds.
const SEED_UPDATE_AGE_MS: i64 = 100_000_000;

pub const MAX_FLOORS: u32 = 200;

/// Unit numbers are two-digit labels; a third digit would let ids collide
/// across floors ("1101" is both floor 1 unit 101 and floor 11 unit 01).
pub const MAX_UNITS_PER_FLOOR: u32 = 99;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("building needs 1-200 floors and 1-99 units per floor (got {floors} floors, {units} units per floor)")]
    InvalidDimensions { floors: u32, units: u32 },
}

struct QualityTemplate {
    name: &'static str,
    date: Option<&'static str>,
    inspector: Option<&'static str>,
}

const QUALITY_TEMPLATES: [QualityTemplate; 5] = [
    QualityTemplate {
        name: "Structural Integrity Test",
        date: Some("2023-11-15"),
        inspector: Some("Eng. Sarah Connor"),
    },
    QualityTemplate {
        name: "Waterproofing Inspection",
        date: Some("2023-12-10"),
        inspector: Some("SafeGuard Labs"),
    },
    QualityTemplate {
        name: "Electrical Wiring Safety",
        date: None,
        inspector: None,
    },
    QualityTemplate {
        name: "Plumbing Pressure Test",
        date: None,
        inspector: None,
    },
    QualityTemplate {
        name: "Fire Safety Compliance",
        date: None,
        inspector: None,
    },
];

const DOCUMENT_TEMPLATES: [(&str, DocumentType, &str, &str); 3] = [
    ("Sale Agreement", DocumentType::Pdf, "2.4 MB", "2023-09-01"),
    ("Floor Plan Blueprint", DocumentType::Img, "4.1 MB", "2023-08-15"),
    ("Payment Schedule", DocumentType::Pdf, "1.2 MB", "2023-09-05"),
];

/// Stage bands as (upper fraction of total floors, stage), lowest floors first.
const STAGE_BANDS: [(f64, ConstructionStage); 5] = [
    (0.15, ConstructionStage::PaintingInternal),
    (0.30, ConstructionStage::FlooringTiles),
    (0.45, ConstructionStage::PlasterInternal),
    (0.60, ConstructionStage::ElectricalConduits),
    (0.80, ConstructionStage::Structure),
];

/// Generate a building, top floor first.
pub fn generate_building<R: Rng + ?Sized>(
    config: &BuildingConfig,
    rng: &mut R,
) -> Result<BuildingData, GeneratorError> {
    if !(1..=MAX_FLOORS).contains(&config.total_floors)
        || !(1..=MAX_UNITS_PER_FLOOR).contains(&config.units_per_floor)
    {
        return Err(GeneratorError::InvalidDimensions {
            floors: config.total_floors,
            units: config.units_per_floor,
        });
    }

    let now = Utc::now();
    let mut floors = Vec::with_capacity(config.total_floors as usize);

    for level in 1..=config.total_floors {
        let stage = stage_for_floor(level, config.total_floors);
        let delivery = delivery_date(now, level);

        let units = (1..=config.units_per_floor)
            .map(|seq| {
                let unit_number = format!("{seq:02}");
                let id = format!("{}{}{}", config.unit_prefix, level, unit_number);
                let sold = rng.gen_bool(SOLD_PROBABILITY);

                Unit {
                    floor_number: level,
                    unit_number,
                    owner_name: sold.then(|| format!("Buyer {id}")),
                    status: if sold {
                        SaleStatus::Sold
                    } else {
                        SaleStatus::Available
                    },
                    current_stage: stage,
                    progress_percentage: stage_progress(stage),
                    expected_delivery_date: delivery,
                    quality_checks: quality_checks(&id, stage),
                    documents: documents(&id),
                    updates: vec![UpdateLog {
                        id: format!("init-{id}"),
                        date: now - Duration::milliseconds(SEED_UPDATE_AGE_MS),
                        stage: ConstructionStage::Foundation,
                        note: "Foundation work completed successfully.".to_string(),
                        image_url: None,
                    }],
                    id,
                }
            })
            .collect();

        floors.push(Floor { level, units });
    }

    floors.reverse();

    tracing::debug!(
        name = %config.name,
        floors = config.total_floors,
        units_per_floor = config.units_per_floor,
        "Generated building"
    );

    Ok(BuildingData {
        name: config.name.clone(),
        total_floors: config.total_floors,
        floors,
    })
}

/// Lower floors are further along.
fn stage_for_floor(level: u32, total_floors: u32) -> ConstructionStage {
    STAGE_BANDS
        .iter()
        .find(|(fraction, _)| level <= (total_floors as f64 * fraction).floor() as u32)
        .map(|(_, stage)| *stage)
        .unwrap_or(ConstructionStage::Foundation)
}

/// Six months out plus a month and a half per floor, in whole months.
fn delivery_date(now: DateTime<Utc>, level: u32) -> DateTime<Utc> {
    let months = (12 + 3 * level) / 2;
    now.checked_add_months(Months::new(months)).unwrap_or(now)
}

fn quality_checks(unit_id: &str, stage: ConstructionStage) -> Vec<QualityCheck> {
    let threshold = stage_index(stage).unwrap_or(0) as f64 / 3.0;
    let in_progress = threshold.ceil() as usize;

    QUALITY_TEMPLATES
        .iter()
        .enumerate()
        .map(|(idx, template)| QualityCheck {
            id: format!("qc-{unit_id}-{idx}"),
            name: template.name.to_string(),
            status: if (idx as f64) < threshold {
                QualityCheckStatus::Passed
            } else if idx == in_progress {
                QualityCheckStatus::InProgress
            } else {
                QualityCheckStatus::Pending
            },
            date: template.date.map(str::to_string),
            inspector: template.inspector.map(str::to_string),
        })
        .collect()
}

fn documents(unit_id: &str) -> Vec<Document> {
    DOCUMENT_TEMPLATES
        .iter()
        .enumerate()
        .map(|(idx, (name, doc_type, size, date))| Document {
            id: format!("doc-{unit_id}-{idx}"),
            name: name.to_string(),
            doc_type: *doc_type,
            date: date.to_string(),
            size: size.to_string(),
        })
        .collect()
}
