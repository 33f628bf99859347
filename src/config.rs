use anyhow::{Context, Result};
use std::env;

use crate::domain::building::BuildingConfig;

/// Phone photos grow by a third once base64-encoded.
const DEFAULT_AI_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Staging,
    Prod,
}

impl Environment {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "prod" | "production" => Self::Prod,
            "staging" => Self::Staging,
            _ => Self::Dev,
        }
    }

    pub fn is_dev(&self) -> bool {
        matches!(self, Self::Dev)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub env: Environment,
    pub server_addr: String,

    // CORS
    pub cors_allow_origins: Vec<String>,

    // Analysis model
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub ai_timeout_seconds: u64,
    /// Body limit for `/ai/analyze`, which carries the photo as base64.
    pub ai_max_upload_bytes: usize,

    // Building generated at startup
    pub default_building: BuildingConfig,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        let env = Environment::from_str(&env::var("ENV").unwrap_or_else(|_| "dev".to_string()));
        let server_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // CORS
        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        // Analysis model (no key means every analysis falls back)
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());
        let gemini_base_url = env::var("GEMINI_BASE_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let gemini_model =
            env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".to_string());
        let ai_timeout_seconds = env::var("AI_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        let ai_max_upload_bytes = env::var("AI_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_AI_MAX_UPLOAD_BYTES);

        // Default building
        let defaults = BuildingConfig::default();
        let default_building = BuildingConfig {
            name: env::var("BUILDING_NAME").unwrap_or(defaults.name),
            total_floors: parse_optional("BUILDING_FLOORS")?.unwrap_or(defaults.total_floors),
            units_per_floor: parse_optional("BUILDING_UNITS_PER_FLOOR")?
                .unwrap_or(defaults.units_per_floor),
            unit_prefix: env::var("BUILDING_UNIT_PREFIX").unwrap_or(defaults.unit_prefix),
        };

        Ok(Settings {
            env,
            server_addr,
            cors_allow_origins,
            gemini_api_key,
            gemini_base_url,
            gemini_model,
            ai_timeout_seconds,
            ai_max_upload_bytes,
            default_building,
        })
    }
}

/// A set-but-unparseable variable is a startup error, not a silent default.
fn parse_optional(name: &str) -> Result<Option<u32>> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("{name} must be a positive integer")),
        Err(_) => Ok(None),
    }
}
