//! The generation request handed to the generator.
//!
//! A request is built once, consumed by a single generator call and then
//! dropped. It is never validated here; malformed values only surface when the
//! generator runs.

use crate::error::{Result, SynthError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

pub const GEM_NAME_ARG: &str = "ruby-cloud-gem-name";
pub const TITLE_ARG: &str = "ruby-cloud-title";
pub const DESCRIPTION_ARG: &str = "ruby-cloud-description";
pub const ENV_PREFIX_ARG: &str = "ruby-cloud-env-prefix";
pub const GRPC_SERVICE_CONFIG_ARG: &str = "ruby-cloud-grpc-service-config";

/// Generator specific string options, passed through as `--<key> <value>`.
pub type GeneratorArgs = BTreeMap<String, String>;

/// Everything the generator needs to produce one client library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Short API identifier, e.g. `dlp`.
    pub service: String,
    /// API version, e.g. `v2`.
    pub version: String,
    /// Directory of the primary protos, relative to the googleapis root.
    pub proto_path: String,
    /// Additional proto files mounted next to the primary ones.
    #[serde(default)]
    pub extra_proto_files: Vec<String>,
    #[serde(default)]
    pub generator_args: GeneratorArgs,
}

impl GenerationRequest {
    /// The Cloud Data Loss Prevention (DLP) V2 Ruby client.
    pub fn dlp_v2() -> Self {
        let generator_args = [
            (GEM_NAME_ARG, "google-cloud-dlp-v2"),
            (TITLE_ARG, "Cloud Data Loss Prevention (DLP) V2"),
            (
                DESCRIPTION_ARG,
                "Provides methods for detection of privacy-sensitive fragments in text, images, and Google Cloud Platform storage repositories.",
            ),
            (ENV_PREFIX_ARG, "DLP"),
            (
                GRPC_SERVICE_CONFIG_ARG,
                "google/privacy/dlp/v2/dlp_grpc_service_config.json",
            ),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();

        Self {
            service: "dlp".to_string(),
            version: "v2".to_string(),
            proto_path: "google/privacy/dlp/v2".to_string(),
            extra_proto_files: vec!["google/cloud/common_resources.proto".to_string()],
            generator_args,
        }
    }

    /// Parse a request from the contents of a `synth.toml` file.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SynthError::Config(e.to_string()))
    }

    /// Load a request from a `synth.toml` file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SynthError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    /// The gem the generator will produce, if the request names one.
    pub fn gem_name(&self) -> Option<&str> {
        self.generator_args.get(GEM_NAME_ARG).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dlp_v2_identity() {
        let request = GenerationRequest::dlp_v2();
        assert_eq!(request.service, "dlp");
        assert_eq!(request.version, "v2");
        assert_eq!(request.proto_path, "google/privacy/dlp/v2");
    }

    #[test]
    fn test_dlp_v2_extra_proto_files() {
        let request = GenerationRequest::dlp_v2();
        assert_eq!(
            request.extra_proto_files,
            vec!["google/cloud/common_resources.proto".to_string()]
        );
    }

    #[test]
    fn test_dlp_v2_generator_args_are_exact() {
        let request = GenerationRequest::dlp_v2();
        let args = &request.generator_args;

        assert_eq!(args.len(), 5);
        assert_eq!(args[GEM_NAME_ARG], "google-cloud-dlp-v2");
        assert_eq!(args[TITLE_ARG], "Cloud Data Loss Prevention (DLP) V2");
        assert_eq!(
            args[DESCRIPTION_ARG],
            "Provides methods for detection of privacy-sensitive fragments in text, images, and Google Cloud Platform storage repositories."
        );
        assert_eq!(args[ENV_PREFIX_ARG], "DLP");
        assert_eq!(
            args[GRPC_SERVICE_CONFIG_ARG],
            "google/privacy/dlp/v2/dlp_grpc_service_config.json"
        );
    }

    #[test]
    fn test_gem_name() {
        assert_eq!(
            GenerationRequest::dlp_v2().gem_name(),
            Some("google-cloud-dlp-v2")
        );
    }

    #[test]
    fn test_from_toml() {
        let content = r#"
service = "language"
version = "v1"
proto_path = "google/cloud/language/v1"

[generator_args]
"ruby-cloud-gem-name" = "google-cloud-language-v1"
"ruby-cloud-env-prefix" = "LANGUAGE"
"#;
        let request = GenerationRequest::from_toml(content).unwrap();
        assert_eq!(request.service, "language");
        assert_eq!(request.version, "v1");
        assert!(request.extra_proto_files.is_empty());
        assert_eq!(request.gem_name(), Some("google-cloud-language-v1"));
        assert_eq!(request.generator_args.len(), 2);
    }

    #[test]
    fn test_from_toml_missing_field() {
        let err = GenerationRequest::from_toml(r#"service = "dlp""#).unwrap_err();
        assert!(matches!(err, SynthError::Config(_)));
    }

    #[test]
    fn test_load_round_trips_dlp_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("synth.toml");
        std::fs::write(&path, toml::to_string(&GenerationRequest::dlp_v2()).unwrap()).unwrap();

        assert_eq!(
            GenerationRequest::load(&path).unwrap(),
            GenerationRequest::dlp_v2()
        );
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let err = GenerationRequest::load(&temp_dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, SynthError::Config(_)));
    }
}
