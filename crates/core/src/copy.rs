//! Copies a generated tree into the destination, merging files that already
//! exist through a [`MergePolicy`].

use crate::error::{Result, SynthError};
use crate::generator::GeneratedLibrary;
use crate::merge::MergePolicy;
use ignore::WalkBuilder;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Reconciles a generated library with the destination tree.
pub trait Copier {
    fn copy(&self, library: &GeneratedLibrary) -> Result<CopyReport>;
}

/// What happened to each generated file, by path relative to the destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    /// Only present in the generated tree.
    pub added: Vec<PathBuf>,
    /// Present in both trees and rewritten with the merged content.
    pub merged: Vec<PathBuf>,
    /// Present in both trees and already equal to the merged content.
    pub unchanged: Vec<PathBuf>,
}

impl CopyReport {
    pub fn total(&self) -> usize {
        self.added.len() + self.merged.len() + self.unchanged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Files that were (or in a dry run, would be) written.
    pub fn written(&self) -> usize {
        self.added.len() + self.merged.len()
    }
}

/// Copies every file of the generated tree into `destination`.
///
/// Files only in the destination are left alone. When a file exists on both
/// sides the policy decides the final content; if either side is not UTF-8 the
/// generated bytes win.
#[derive(Debug, Clone)]
pub struct TreeCopier<P> {
    destination: PathBuf,
    policy: P,
    dry_run: bool,
}

impl<P: MergePolicy> TreeCopier<P> {
    pub fn new(destination: impl Into<PathBuf>, policy: P) -> Self {
        Self {
            destination: destination.into(),
            policy,
            dry_run: false,
        }
    }

    /// Compute the report without touching the destination.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn copy_file(&self, source: &Path, relative: &Path, report: &mut CopyReport) -> Result<()> {
        let target = self.destination.join(relative);

        if !target.is_file() {
            log::debug!("adding {}", relative.display());
            if !self.dry_run {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent).map_err(|e| SynthError::copy(parent, e))?;
                }
                // fs::copy carries the permission bits over.
                fs::copy(source, &target).map_err(|e| SynthError::copy(&target, e))?;
            }
            report.added.push(relative.to_path_buf());
            return Ok(());
        }

        let generated = fs::read(source).map_err(|e| SynthError::copy(source, e))?;
        let existing = fs::read(&target).map_err(|e| SynthError::copy(&target, e))?;

        let merged = match (std::str::from_utf8(&generated), std::str::from_utf8(&existing)) {
            (Ok(generated), Ok(existing)) => {
                Some(self.policy.merge(generated, existing, &target).into_bytes())
            }
            _ => None,
        };
        let content = merged.unwrap_or_else(|| {
            log::debug!("{} is not text, overwriting", relative.display());
            generated
        });

        if content == existing {
            log::trace!("unchanged {}", relative.display());
            if !self.dry_run {
                sync_permissions(source, &target)?;
            }
            report.unchanged.push(relative.to_path_buf());
            return Ok(());
        }

        log::debug!("merging {}", relative.display());
        if !self.dry_run {
            fs::write(&target, &content).map_err(|e| SynthError::copy(&target, e))?;
            sync_permissions(source, &target)?;
        }
        report.merged.push(relative.to_path_buf());
        Ok(())
    }
}

/// Give `target` the permission bits of `source` when they differ.
fn sync_permissions(source: &Path, target: &Path) -> Result<()> {
    let permissions = fs::metadata(source)
        .map_err(|e| SynthError::copy(source, e))?
        .permissions();
    let current = fs::metadata(target)
        .map_err(|e| SynthError::copy(target, e))?
        .permissions();
    if current != permissions {
        fs::set_permissions(target, permissions).map_err(|e| SynthError::copy(target, e))?;
    }
    Ok(())
}

impl<P: MergePolicy> Copier for TreeCopier<P> {
    fn copy(&self, library: &GeneratedLibrary) -> Result<CopyReport> {
        let root = library.root();
        let mut report = CopyReport::default();

        for file in generated_files(root)? {
            let relative = file
                .strip_prefix(root)
                .map_err(|e| SynthError::copy(&file, io::Error::other(e.to_string())))?;
            self.copy_file(&file, relative, &mut report)?;
        }

        if report.is_empty() {
            log::warn!(
                "No files in {} were copied. Does the source contain files?",
                root.display()
            );
        } else {
            log::info!(
                "{} files from {}: {} added, {} merged, {} unchanged",
                if self.dry_run { "Would copy" } else { "Copied" },
                root.display(),
                report.added.len(),
                report.merged.len(),
                report.unchanged.len()
            );
        }

        Ok(report)
    }
}

/// All regular files under `root`, sorted by path. Hidden files are included
/// and ignore files are not honoured.
fn generated_files(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        return Err(SynthError::copy(
            root,
            io::Error::new(io::ErrorKind::NotFound, "generated output is not a directory"),
        ));
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .sort_by_file_path(|a, b| a.cmp(b))
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|e| SynthError::copy(root, io::Error::other(e.to_string())))?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
