use crate::docker::DockerGenerator;
use crate::prelude::{println, *};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use synth_core::generator::DEFAULT_GENERATOR_TAG;
use synth_core::metadata::{build_metadata, to_json};
use synth_core::{
    synthesize, CopyReport, GenerationRequest, Generator, RubyGlobalMerge, TreeCopier,
};

#[derive(Debug, Clone, clap::Args)]
pub struct GeneratorOptions {
    /// Read the generation request from a synth.toml file instead of the built-in DLP V2 request
    #[arg(long, env = "SYNTH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local googleapis checkout (cloned into the cache directory when unset)
    #[arg(long, env = "SYNTHTOOL_GOOGLEAPIS")]
    pub googleapis: Option<PathBuf>,

    /// Generator image tag
    #[arg(long, env = "SYNTHTOOL_GENERATOR_TAG", default_value = DEFAULT_GENERATOR_TAG)]
    pub generator_tag: String,

    /// Full generator image reference, overrides --generator-tag
    #[arg(long, env = "SYNTHTOOL_GENERATOR_IMAGE")]
    pub image: Option<String>,
}

impl GeneratorOptions {
    fn request(&self) -> Result<GenerationRequest> {
        load_request(self.config.as_deref())
    }

    fn generator(&self) -> DockerGenerator {
        DockerGenerator::new(
            self.googleapis.clone(),
            self.image.clone(),
            &self.generator_tag,
        )
    }
}

#[derive(Debug, clap::Parser)]
pub struct RunOptions {
    #[clap(flatten)]
    pub generator: GeneratorOptions,

    /// Directory the generated library is merged into
    #[arg(short, long, env = "SYNTH_DESTINATION", default_value = ".")]
    pub destination: PathBuf,

    /// Report what would change without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Write a synth.metadata file describing the sources used
    #[arg(long, env = "SYNTH_METADATA")]
    pub metadata: Option<PathBuf>,
}

impl RunOptions {
    /// Options for a bare `synth` invocation: defaults plus environment.
    pub fn from_env() -> Self {
        Self::parse_from(["run"])
    }
}

#[derive(Debug, clap::Parser)]
pub struct GenerateOptions {
    #[clap(flatten)]
    pub generator: GeneratorOptions,

    /// Directory to generate into; must be missing or empty
    #[arg(short, long, default_value = "synth-output")]
    pub output: PathBuf,
}

/// Load the request from `config`, or fall back to the DLP V2 request.
pub fn load_request(config: Option<&Path>) -> Result<GenerationRequest> {
    match config {
        Some(path) => GenerationRequest::load(path)
            .with_context(|| f!("Failed to load generation request from {}", path.display())),
        None => Ok(GenerationRequest::dlp_v2()),
    }
}

pub fn run(options: RunOptions, global: crate::Global) -> Result<()> {
    let request = options.generator.request()?;
    let generator = options.generator.generator();
    let copier = TreeCopier::new(&options.destination, RubyGlobalMerge).dry_run(options.dry_run);

    if global.verbose {
        println!("Generator image: {}", generator.image());
        println!("Destination: {}", options.destination.display());
        println!();
    }

    let synthesis = synthesize(&request, &generator, &copier)?;
    print_report(&synthesis.report, options.dry_run, global.verbose);

    if let Some(path) = &options.metadata {
        if options.dry_run {
            log::info!("Dry run, not writing {}", path.display());
        } else {
            let metadata = build_metadata(&request, &synthesis.sources, chrono::Utc::now());
            let json = to_json(&metadata).context("Failed to serialize synth metadata")?;
            fs::write(path, json).with_context(|| f!("Failed to write {}", path.display()))?;
            log::info!("Wrote {}", path.display());
        }
    }

    Ok(())
}

pub fn generate(options: GenerateOptions, _global: crate::Global) -> Result<()> {
    let request = options.generator.request()?;
    let generator = options
        .generator
        .generator()
        .output(Some(options.output.clone()));

    let library = generator.generate(&request)?;
    println!("{}", library.root().display());

    Ok(())
}

fn print_report(report: &CopyReport, dry_run: bool, verbose: bool) {
    if verbose {
        for path in &report.added {
            println!("{} {}", "+".green(), path.display());
        }
        for path in &report.merged {
            println!("{} {}", "~".yellow(), path.display());
        }
        for path in &report.unchanged {
            println!("{} {}", "=".dimmed(), path.display());
        }
    }

    let summary = f!(
        "{} of {} files written ({} added, {} merged, {} unchanged)",
        report.written(),
        report.total(),
        report.added.len(),
        report.merged.len(),
        report.unchanged.len()
    );
    if dry_run {
        println!("{} {}", "Dry run:".yellow().bold(), summary);
    } else {
        println!("{} {}", "✓".green().bold(), summary);
    }
}
