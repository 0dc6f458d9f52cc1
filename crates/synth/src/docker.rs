use crate::googleapis::Googleapis;
use duct::cmd;
use std::fs;
use std::path::{Path, PathBuf};
use synth_core::generator::{
    ensure_fresh_output, ensure_generated, generator_image, image_tag, validate_request,
    DockerInvocation, GENERATOR_NAME,
};
use synth_core::{GeneratedLibrary, GenerationRequest, Generator, Source, SynthError};

/// Runs the ruby GAPIC microgenerator image through docker.
#[derive(Debug, Clone)]
pub struct DockerGenerator {
    googleapis: Option<PathBuf>,
    image: String,
    output: Option<PathBuf>,
}

impl DockerGenerator {
    pub fn new(googleapis: Option<PathBuf>, image: Option<String>, tag: &str) -> Self {
        Self {
            googleapis,
            image: image.unwrap_or_else(|| generator_image(tag)),
            output: None,
        }
    }

    /// Generate into `output` instead of a temporary directory.
    pub fn output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    fn output_dir(&self) -> synth_core::Result<GeneratedLibrary> {
        match &self.output {
            Some(dir) => {
                ensure_fresh_output(dir)?;
                fs::create_dir_all(dir).map_err(|e| {
                    SynthError::Generator(format!("Failed to create {}: {e}", dir.display()))
                })?;
                Ok(GeneratedLibrary::at(dir))
            }
            None => {
                let workdir = tempfile::Builder::new()
                    .prefix("synth-")
                    .tempdir()
                    .map_err(|e| {
                        SynthError::Generator(format!("Failed to create output directory: {e}"))
                    })?;
                Ok(GeneratedLibrary::in_tempdir(workdir))
            }
        }
    }
}

impl Generator for DockerGenerator {
    fn generate(&self, request: &GenerationRequest) -> synth_core::Result<GeneratedLibrary> {
        if which::which("docker").is_err() {
            return Err(SynthError::Generator(
                "docker is required but was not found on PATH".to_string(),
            ));
        }

        let googleapis = Googleapis::resolve(self.googleapis.as_deref())?;
        validate_request(request, &googleapis.root)?;

        let library = self.output_dir()?;
        let user = owner_uid(library.root());
        let args = DockerInvocation {
            request,
            googleapis: &googleapis.root,
            output_dir: library.root(),
            image: &self.image,
            user: user.as_deref(),
        }
        .args();

        log::info!(
            "Running generator {} for {}",
            self.image,
            request.gem_name().unwrap_or(&request.service)
        );
        log::debug!("docker {}", args.join(" "));
        cmd("docker", &args)
            .run()
            .map_err(|e| SynthError::Generator(e.to_string()))?;

        ensure_generated(library.root())?;

        Ok(library
            .with_source(googleapis.source())
            .with_source(Source::Generator {
                name: GENERATOR_NAME.to_string(),
                version: image_tag(&self.image).to_string(),
                docker_image: self.image.clone(),
            }))
    }
}

/// The uid owning `path`, so generated files are not written as root.
#[cfg(unix)]
fn owner_uid(path: &Path) -> Option<String> {
    use std::os::unix::fs::MetadataExt;
    fs::metadata(path).ok().map(|m| m.uid().to_string())
}

#[cfg(not(unix))]
fn owner_uid(_path: &Path) -> Option<String> {
    None
}
