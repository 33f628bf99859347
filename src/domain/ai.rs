//! Analysis-related domain models.
//!
//! The result shape mirrors the structured-output schema sent to the model,
//! so the model's JSON deserializes straight into [`AiAnalysisResult`].

use serde::{Deserialize, Serialize};

use super::building::BuildingStats;
use super::stages::ConstructionStage;

pub const FALLBACK_SUMMARY: &str =
    "Could not analyze the update automatically. Please enter details manually.";

/// Stage and unit ids inferred from a free-text / photo site update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AiAnalysisResult {
    pub suggested_stage: ConstructionStage,
    pub confidence: f64,
    pub summary: String,
    #[serde(default)]
    pub detected_unit_ids: Vec<String>,
}

impl AiAnalysisResult {
    /// Result reported whenever the model call fails in any way.
    pub fn fallback() -> Self {
        Self {
            suggested_stage: ConstructionStage::NotStarted,
            confidence: 0.0,
            summary: FALLBACK_SUMMARY.to_string(),
            detected_unit_ids: Vec::new(),
        }
    }
}

/// What applying an analysis did to the building.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutcome {
    pub updated_unit_ids: Vec<String>,
    pub unmatched_ids: Vec<String>,
}

// =============================================================================
// Request/Response DTOs for API endpoints
// =============================================================================

/// Request for analysing a site update.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
    /// Data URL (`data:image/jpeg;base64,...`) or bare base64.
    #[serde(default)]
    pub image: Option<String>,
}

/// Response for an analysed site update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: AiAnalysisResult,
    pub outcome: AnalysisOutcome,
    pub stats: BuildingStats,
}
