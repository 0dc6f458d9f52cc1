use crate::copy::{Copier, CopyReport};
use crate::error::Result;
use crate::generator::{Generator, Source};
use crate::request::GenerationRequest;

/// Outcome of a successful synthesis.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub report: CopyReport,
    pub sources: Vec<Source>,
}

/// Generate the library described by `request` and copy it into place.
///
/// The generator runs exactly once; the copier runs exactly once on its
/// output, and only if generation succeeded. Errors from either step are
/// returned as is.
pub fn synthesize<G, C>(request: &GenerationRequest, generator: &G, copier: &C) -> Result<Synthesis>
where
    G: Generator + ?Sized,
    C: Copier + ?Sized,
{
    log::info!(
        "Generating {} {} from {}",
        request.service,
        request.version,
        request.proto_path
    );
    let library = generator.generate(request)?;
    log::debug!("Generated code into {}", library.root().display());

    let report = copier.copy(&library)?;

    Ok(Synthesis {
        report,
        sources: library.sources().to_vec(),
    })
}
