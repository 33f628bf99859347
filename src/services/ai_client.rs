//! Client for the hosted generative model that reads site updates.
//!
//! One request per analysis against the Gemini `generateContent` endpoint,
//! with a structured-output schema so the reply deserializes straight into
//! [`AiAnalysisResult`]. Every failure collapses into
//! [`AiAnalysisResult::fallback`]; callers never see an error.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use crate::domain::ai::AiAnalysisResult;
use crate::domain::stages::STAGE_ORDER;

const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Client for the analysis model.
#[derive(Clone)]
pub struct AiClient {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

#[derive(Debug, Error)]
enum AnalysisError {
    #[error("no model API key configured")]
    MissingApiKey,
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("model returned no text")]
    EmptyResponse,
    #[error("model reply did not match the schema: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

impl AiClient {
    /// Create a new model client.
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        timeout_seconds: u64,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        let endpoint = Url::parse(base_url.trim_end_matches('/'))
            .and_then(|base| base.join(&format!("/v1beta/models/{model}:generateContent")))
            .with_context(|| format!("Invalid model base URL: {base_url}"))?;

        tracing::info!(endpoint = %endpoint, has_key = api_key.is_some(), "AI client initialized");

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Infer a stage and unit ids from a site update.
    ///
    /// `image` may be a data URL or bare base64.
    #[instrument(skip(self, text, image), fields(has_image = image.is_some()))]
    pub async fn analyze(&self, text: &str, image: Option<&str>) -> AiAnalysisResult {
        match self.try_analyze(text, image).await {
            Ok(result) => {
                debug!(
                    stage = %result.suggested_stage,
                    detected = result.detected_unit_ids.len(),
                    "Model analysis succeeded"
                );
                result
            }
            Err(e) => {
                error!(error = %e, "Model analysis failed");
                AiAnalysisResult::fallback()
            }
        }
    }

    async fn try_analyze(
        &self,
        text: &str,
        image: Option<&str>,
    ) -> Result<AiAnalysisResult, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;

        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", api_key)
            .json(&request_body(text, image))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply: GenerateContentResponse = response.json().await?;
        parse_reply(reply)
    }
}

fn parse_reply(reply: GenerateContentResponse) -> Result<AiAnalysisResult, AnalysisError> {
    let text = reply
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(AnalysisError::EmptyResponse)?;

    let mut result: AiAnalysisResult = serde_json::from_str(&text)?;
    result.confidence = result.confidence.clamp(0.0, 1.0);
    Ok(result)
}

/// Split a data URL into (mime type, base64 payload).
fn split_image(image: &str) -> (&str, &str) {
    match image.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((header, data)) => {
            let mime = header.split(';').next().filter(|m| !m.is_empty());
            (mime.unwrap_or(DEFAULT_IMAGE_MIME), data)
        }
        None => (DEFAULT_IMAGE_MIME, image),
    }
}

fn request_body(text: &str, image: Option<&str>) -> Value {
    let mut parts = Vec::with_capacity(2);

    if let Some(image) = image {
        let (mime_type, data) = split_image(image);
        let inline = InlineData { mime_type, data };
        parts.push(json!({ "inlineData": inline }));
    }
    parts.push(json!({ "text": prompt(text) }));

    json!({
        "contents": [{ "parts": parts }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

fn response_schema() -> Value {
    let stages: Vec<&str> = STAGE_ORDER.iter().map(|s| s.label()).collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "suggestedStage": { "type": "STRING", "enum": stages },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence score between 0 and 1"
            },
            "summary": {
                "type": "STRING",
                "description": "A brief professional summary of the update."
            },
            "detectedUnitIds": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "List of unit IDs extracted from the text."
            }
        },
        "required": ["suggestedStage", "confidence", "summary", "detectedUnitIds"]
    })
}

fn prompt(text: &str) -> String {
    let stages = STAGE_ORDER
        .iter()
        .map(|s| format!("- {}", s.label()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a construction site manager's assistant.\n\
         Read the site update (text and/or photo) and work out the construction progress.\n\
         \n\
         Goal: pick the 'suggestedStage' and list the 'detectedUnitIds' the update refers to.\n\
         \n\
         Allowed construction stages:\n{stages}\n\
         \n\
         Unit ID rules:\n\
         - Extract unit IDs that are mentioned directly (e.g. \"101\", \"504\", \"1202\").\n\
         - For a range such as \"units 401 through 404\", list every ID in it.\n\
         - For a whole floor such as \"3rd floor is done\", list that floor's usual IDs (301, 302, 303, 304).\n\
         - If the update is general and names no units or floors, return an empty array. Never guess IDs.\n\
         \n\
         Summary: one professional sentence suitable for a client-facing log.\n\
         \n\
         User input: \"{text}\"\n\
         \n\
         Respond only with JSON matching the schema."
    )
}
