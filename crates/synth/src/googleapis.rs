use duct::cmd;
use std::fs;
use std::path::{Path, PathBuf};
use synth_core::generator::GOOGLEAPIS_REMOTE;
use synth_core::{Source, SynthError};

/// A googleapis checkout the protos are mounted from.
#[derive(Debug, Clone)]
pub struct Googleapis {
    pub root: PathBuf,
    pub sha: Option<String>,
}

impl Googleapis {
    /// Use a local checkout when one is given, otherwise clone (or update) a
    /// shallow copy in the user cache directory.
    pub fn resolve(local: Option<&Path>) -> synth_core::Result<Self> {
        let root = match local {
            Some(path) => {
                if !path.is_dir() {
                    return Err(SynthError::ProtoNotFound(path.to_path_buf()));
                }
                log::debug!("Using local googleapis at {}", path.display());
                path.to_path_buf()
            }
            None => cached_clone()?,
        };

        let sha = head_sha(&root);
        Ok(Self { root, sha })
    }

    pub fn source(&self) -> Source {
        Source::Git {
            name: "googleapis".to_string(),
            remote: GOOGLEAPIS_REMOTE.to_string(),
            sha: self.sha.clone(),
        }
    }
}

fn cache_dir() -> synth_core::Result<PathBuf> {
    let cache_dir = dirs_next::cache_dir()
        .ok_or_else(|| SynthError::Generator("Unable to determine cache directory".to_string()))?
        .join("synthtool");

    fs::create_dir_all(&cache_dir).map_err(|e| {
        SynthError::Generator(format!("Failed to create cache directory: {}", e))
    })?;

    Ok(cache_dir)
}

fn cached_clone() -> synth_core::Result<PathBuf> {
    let clone_dir = cache_dir()?.join("googleapis");

    if clone_dir.join(".git").exists() {
        log::debug!("Updating googleapis in {}", clone_dir.display());
        // A stale checkout is still usable, so a failed pull is not fatal.
        if let Err(e) = cmd!("git", "-C", &clone_dir, "pull", "--ff-only", "--quiet").run() {
            log::warn!("Failed to update googleapis, using cached copy: {e}");
        }
    } else {
        log::info!("Cloning {} into {}", GOOGLEAPIS_REMOTE, clone_dir.display());
        cmd!("git", "clone", "--depth", "1", GOOGLEAPIS_REMOTE, &clone_dir)
            .run()
            .map_err(|e| SynthError::Generator(format!("Failed to clone googleapis: {e}")))?;
    }

    Ok(clone_dir)
}

fn head_sha(root: &Path) -> Option<String> {
    cmd!("git", "-C", root, "rev-parse", "HEAD")
        .stderr_null()
        .read()
        .ok()
        .map(|sha| sha.trim().to_string())
        .filter(|sha| !sha.is_empty())
}
