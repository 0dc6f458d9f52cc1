use std::path::PathBuf;

/// Errors raised while synthesizing a library.
///
/// Generator and copy failures are never recovered from; they bubble up to the
/// binary unchanged.
#[derive(thiserror::Error, Debug)]
pub enum SynthError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Proto path not found: {}", .0.display())]
    ProtoNotFound(PathBuf),

    #[error("Missing required generator argument: {0}")]
    MissingGeneratorArg(String),

    #[error("Generator failed: {0}")]
    Generator(String),

    #[error("Code generation seemed to succeed, but {} is empty", .0.display())]
    EmptyOutput(PathBuf),

    #[error("Copy failed for {}: {source}", .path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SynthError {
    /// Wrap an I/O error raised while touching `path` during the copy step.
    pub fn copy(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SynthError::Copy {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = SynthError> = std::result::Result<T, E>;
