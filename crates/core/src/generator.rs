//! The generator seam and the pieces of a docker invocation that can be
//! computed without running anything.

use crate::error::{Result, SynthError};
use crate::request::{GenerationRequest, GEM_NAME_ARG};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const GOOGLEAPIS_REMOTE: &str = "https://github.com/googleapis/googleapis.git";
pub const GENERATOR_NAME: &str = "gapic-generator-ruby";
pub const GENERATOR_IMAGE_REPO: &str = "gcr.io/gapic-images/gapic-generator-ruby";
pub const DEFAULT_GENERATOR_TAG: &str = "latest";

/// Generator arguments the ruby microgenerator cannot run without.
pub const REQUIRED_GENERATOR_ARGS: &[&str] = &[GEM_NAME_ARG];

/// Produces a client library source tree from a generation request.
pub trait Generator {
    fn generate(&self, request: &GenerationRequest) -> Result<GeneratedLibrary>;
}

/// An input the generated code was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Git {
        name: String,
        remote: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sha: Option<String>,
    },
    Generator {
        name: String,
        version: String,
        #[serde(rename = "dockerImage")]
        docker_image: String,
    },
}

/// Handle to a generated source tree.
///
/// When the tree lives in a temporary directory the handle owns it, so the
/// output stays on disk until the copy step is done with it.
#[derive(Debug)]
pub struct GeneratedLibrary {
    root: PathBuf,
    sources: Vec<Source>,
    _workdir: Option<TempDir>,
}

impl GeneratedLibrary {
    /// A library generated into a directory the caller manages.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            sources: Vec::new(),
            _workdir: None,
        }
    }

    /// A library generated into a temporary directory that is removed when
    /// the handle is dropped.
    pub fn in_tempdir(workdir: TempDir) -> Self {
        Self {
            root: workdir.path().to_path_buf(),
            sources: Vec::new(),
            _workdir: Some(workdir),
        }
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.sources.push(source);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

/// Full docker image reference for a generator tag.
pub fn generator_image(tag: &str) -> String {
    format!("{GENERATOR_IMAGE_REPO}:{tag}")
}

/// Version part of an image reference (`latest` for `repo:latest`).
///
/// A reference pinned only by digest (`repo@sha256:...`) reports the digest.
pub fn image_tag(image: &str) -> &str {
    let (name, digest) = match image.split_once('@') {
        Some((name, digest)) => (name, Some(digest)),
        None => (image, None),
    };
    // A ':' before the last '/' belongs to a registry port, not a tag.
    let name_start = name.rfind('/').map(|i| i + 1).unwrap_or(0);
    match name[name_start..].rfind(':') {
        Some(pos) => &name[name_start + pos + 1..],
        None => digest.unwrap_or(DEFAULT_GENERATOR_TAG),
    }
}

/// Fail unless `dir` is missing or empty, so a run never mixes its output
/// with files left by an earlier one.
pub fn ensure_fresh_output(dir: &Path) -> Result<()> {
    if dir.exists() && !is_empty_dir(dir)? {
        return Err(SynthError::Generator(format!(
            "Output directory {} is not empty",
            dir.display()
        )));
    }
    Ok(())
}

/// Fail with [`SynthError::EmptyOutput`] when the generator wrote nothing.
pub fn ensure_generated(dir: &Path) -> Result<()> {
    if is_empty_dir(dir)? {
        return Err(SynthError::EmptyOutput(dir.to_path_buf()));
    }
    Ok(())
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(dir).map_err(|e| {
        SynthError::Generator(format!("Failed to read {}: {e}", dir.display()))
    })?;
    Ok(entries.next().is_none())
}

/// Check the request against the googleapis checkout before running docker.
///
/// Fails if a required generator argument is missing, or if the proto path or
/// any extra proto file does not exist under `googleapis`.
pub fn validate_request(request: &GenerationRequest, googleapis: &Path) -> Result<()> {
    for key in REQUIRED_GENERATOR_ARGS {
        if !request.generator_args.contains_key(*key) {
            return Err(SynthError::MissingGeneratorArg(key.to_string()));
        }
    }

    let proto_dir = googleapis.join(&request.proto_path);
    if !proto_dir.is_dir() {
        return Err(SynthError::ProtoNotFound(proto_dir));
    }

    for proto in &request.extra_proto_files {
        let proto_file = googleapis.join(proto);
        if !proto_file.is_file() {
            return Err(SynthError::ProtoNotFound(proto_file));
        }
    }

    Ok(())
}

/// Describes a single `docker run` of the microgenerator.
#[derive(Debug, Clone)]
pub struct DockerInvocation<'a> {
    pub request: &'a GenerationRequest,
    pub googleapis: &'a Path,
    pub output_dir: &'a Path,
    pub image: &'a str,
    pub user: Option<&'a str>,
}

impl DockerInvocation<'_> {
    /// Arguments passed to `docker`, in order.
    ///
    /// Protos are mounted read-only under `/in`, the output directory at
    /// `/out/`, and each generator argument follows the image as
    /// `--<key> <value>`.
    pub fn args(&self) -> Vec<String> {
        let in_root = Path::new("/in");
        let mut args = vec!["run".to_string(), "--rm".to_string()];

        args.push(format!(
            "--mount=type=bind,source={},destination={},readonly",
            self.googleapis.join(&self.request.proto_path).display(),
            in_root.join(&self.request.proto_path).display()
        ));
        args.push(format!(
            "--mount=type=bind,source={},destination=/out/",
            self.output_dir.display()
        ));

        if let Some(user) = self.user {
            args.push("--user".to_string());
            args.push(user.to_string());
        }

        for proto in &self.request.extra_proto_files {
            args.push(format!(
                "--mount=type=bind,source={},destination={},readonly",
                self.googleapis.join(proto).display(),
                in_root.join(proto).display()
            ));
        }

        args.push(self.image.to_string());

        for (key, value) in &self.request.generator_args {
            args.push(format!("--{key}"));
            args.push(value.clone());
        }

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn googleapis_fixture() -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("google/privacy/dlp/v2")).unwrap();
        fs::create_dir_all(temp_dir.path().join("google/cloud")).unwrap();
        fs::write(
            temp_dir.path().join("google/cloud/common_resources.proto"),
            "syntax = \"proto3\";",
        )
        .unwrap();
        temp_dir
    }

    // ============================================================================
    // image tests
    // ============================================================================

    #[test]
    fn test_generator_image_default_tag() {
        assert_eq!(
            generator_image(DEFAULT_GENERATOR_TAG),
            "gcr.io/gapic-images/gapic-generator-ruby:latest"
        );
    }

    #[test]
    fn test_image_tag() {
        assert_eq!(image_tag("gcr.io/gapic-images/gapic-generator-ruby:0.6.8"), "0.6.8");
        assert_eq!(image_tag("gapic-generator-ruby"), "latest");
        assert_eq!(image_tag("localhost:5000/gapic-generator-ruby"), "latest");
        assert_eq!(image_tag("localhost:5000/gapic-generator-ruby:dev"), "dev");
    }

    #[test]
    fn test_image_tag_with_digest() {
        assert_eq!(
            image_tag("gcr.io/gapic-images/gapic-generator-ruby@sha256:abc123"),
            "sha256:abc123"
        );
        assert_eq!(
            image_tag("gcr.io/gapic-images/gapic-generator-ruby:0.6.8@sha256:abc123"),
            "0.6.8"
        );
    }

    // ============================================================================
    // output directory tests
    // ============================================================================

    #[test]
    fn test_ensure_fresh_output_missing_or_empty() {
        let temp_dir = TempDir::new().unwrap();
        ensure_fresh_output(&temp_dir.path().join("out")).unwrap();
        ensure_fresh_output(temp_dir.path()).unwrap();
    }

    #[test]
    fn test_ensure_fresh_output_rejects_stale_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("Gemfile"), "source \"https://rubygems.org\"\n").unwrap();

        let err = ensure_fresh_output(temp_dir.path()).unwrap_err();
        assert!(matches!(err, SynthError::Generator(ref msg) if msg.contains("is not empty")));
    }

    #[test]
    fn test_ensure_generated_empty_output() {
        let temp_dir = TempDir::new().unwrap();

        let err = ensure_generated(temp_dir.path()).unwrap_err();
        assert!(matches!(err, SynthError::EmptyOutput(ref p) if *p == temp_dir.path()));
        assert!(err.to_string().starts_with("Code generation seemed to succeed"));
    }

    #[test]
    fn test_ensure_generated_with_files() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("lib")).unwrap();
        ensure_generated(temp_dir.path()).unwrap();
    }

    // ============================================================================
    // validate_request tests
    // ============================================================================

    #[test]
    fn test_validate_request_ok() {
        let googleapis = googleapis_fixture();
        validate_request(&GenerationRequest::dlp_v2(), googleapis.path()).unwrap();
    }

    #[test]
    fn test_validate_request_missing_proto_path() {
        let googleapis = TempDir::new().unwrap();
        let err = validate_request(&GenerationRequest::dlp_v2(), googleapis.path()).unwrap_err();
        assert!(matches!(err, SynthError::ProtoNotFound(ref p) if p.ends_with("google/privacy/dlp/v2")));
    }

    #[test]
    fn test_validate_request_missing_extra_proto() {
        let googleapis = googleapis_fixture();
        fs::remove_file(googleapis.path().join("google/cloud/common_resources.proto")).unwrap();

        let err = validate_request(&GenerationRequest::dlp_v2(), googleapis.path()).unwrap_err();
        assert!(matches!(err, SynthError::ProtoNotFound(ref p) if p.ends_with("common_resources.proto")));
    }

    #[test]
    fn test_validate_request_missing_gem_name() {
        let googleapis = googleapis_fixture();
        let mut request = GenerationRequest::dlp_v2();
        request.generator_args.remove(GEM_NAME_ARG);

        let err = validate_request(&request, googleapis.path()).unwrap_err();
        assert!(matches!(err, SynthError::MissingGeneratorArg(ref k) if k == GEM_NAME_ARG));
    }

    // ============================================================================
    // DockerInvocation tests
    // ============================================================================

    #[test]
    fn test_docker_args_layout() {
        let request = GenerationRequest::dlp_v2();
        let invocation = DockerInvocation {
            request: &request,
            googleapis: Path::new("/src/googleapis"),
            output_dir: Path::new("/tmp/out"),
            image: "gcr.io/gapic-images/gapic-generator-ruby:latest",
            user: Some("1000"),
        };
        let args = invocation.args();

        assert_eq!(
            &args[..7],
            &[
                "run",
                "--rm",
                "--mount=type=bind,source=/src/googleapis/google/privacy/dlp/v2,destination=/in/google/privacy/dlp/v2,readonly",
                "--mount=type=bind,source=/tmp/out,destination=/out/",
                "--user",
                "1000",
                "--mount=type=bind,source=/src/googleapis/google/cloud/common_resources.proto,destination=/in/google/cloud/common_resources.proto,readonly",
            ]
        );
        assert_eq!(args[7], "gcr.io/gapic-images/gapic-generator-ruby:latest");
        // Five generator args, each as a flag and a value.
        assert_eq!(args.len(), 8 + 10);
    }

    #[test]
    fn test_docker_args_generator_args_follow_image() {
        let request = GenerationRequest::dlp_v2();
        let invocation = DockerInvocation {
            request: &request,
            googleapis: Path::new("/g"),
            output_dir: Path::new("/o"),
            image: "img",
            user: None,
        };
        let args = invocation.args();
        let image_pos = args.iter().position(|a| a == "img").unwrap();
        let trailing = &args[image_pos + 1..];

        let gem_flag = trailing
            .iter()
            .position(|a| a == "--ruby-cloud-gem-name")
            .unwrap();
        assert_eq!(trailing[gem_flag + 1], "google-cloud-dlp-v2");
        assert!(!args.contains(&"--user".to_string()));
    }

    #[test]
    fn test_generated_library_in_tempdir() {
        let workdir = TempDir::new().unwrap();
        let path = workdir.path().to_path_buf();
        let library = GeneratedLibrary::in_tempdir(workdir).with_source(Source::Generator {
            name: GENERATOR_NAME.to_string(),
            version: "latest".to_string(),
            docker_image: generator_image("latest"),
        });

        assert_eq!(library.root(), path);
        assert_eq!(library.sources().len(), 1);
        assert!(path.exists());
        drop(library);
        assert!(!path.exists());
    }
}
