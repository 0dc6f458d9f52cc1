//! `synth.metadata`: a record of what a synthesis run was built from.

use crate::generator::{Source, GENERATOR_NAME};
use crate::request::GenerationRequest;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthMetadata {
    pub update_time: String,
    pub sources: Vec<Source>,
    pub destinations: Vec<Destination>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Client(ClientDestination),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientDestination {
    pub source: String,
    pub api_name: String,
    pub api_version: String,
    pub language: String,
    pub generator: String,
}

/// Build the metadata for a ruby client generated from googleapis.
pub fn build_metadata(
    request: &GenerationRequest,
    sources: &[Source],
    update_time: chrono::DateTime<chrono::Utc>,
) -> SynthMetadata {
    SynthMetadata {
        update_time: update_time.to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
        sources: sources.to_vec(),
        destinations: vec![Destination::Client(ClientDestination {
            source: "googleapis".to_string(),
            api_name: request.service.clone(),
            api_version: request.version.clone(),
            language: "ruby".to_string(),
            generator: GENERATOR_NAME.to_string(),
        })],
    }
}

/// Pretty JSON with a trailing newline, as written to disk.
pub fn to_json(metadata: &SynthMetadata) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(metadata)?;
    json.push('\n');
    Ok(json)
}
