//! Merge policies decide the final content of a file that exists both in the
//! generated tree and in the destination.

use regex::{NoExpand, Regex};
use std::path::Path;
use std::sync::LazyLock;

static GEMSPEC_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s+gem\.version\s*=\s*"[\d\.]+"$"#).unwrap());
static GEMSPEC_HOMEPAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s+gem\.homepage\s*=\s*"[^"]+"$"#).unwrap());
static VERSION_CONSTANT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s+VERSION\s*=\s*"[\d\.]+"$"#).unwrap());

/// Reconciles freshly generated content with a file already on disk.
pub trait MergePolicy {
    /// Return the content to write at `path`.
    ///
    /// `generated` is the new output, `existing` the destination's current
    /// content.
    fn merge(&self, generated: &str, existing: &str, path: &Path) -> String;
}

impl<F> MergePolicy for F
where
    F: Fn(&str, &str, &Path) -> String,
{
    fn merge(&self, generated: &str, existing: &str, path: &Path) -> String {
        self(generated, existing, path)
    }
}

/// Always take the generated content.
#[derive(Debug, Clone, Copy, Default)]
pub struct Overwrite;

impl MergePolicy for Overwrite {
    fn merge(&self, generated: &str, _existing: &str, _path: &Path) -> String {
        generated.to_string()
    }
}

/// Merge policy for the ruby monorepo.
///
/// Release tooling owns gem versions and changelogs, so those survive
/// regeneration; everything else is taken from the generator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RubyGlobalMerge;

impl MergePolicy for RubyGlobalMerge {
    fn merge(&self, generated: &str, existing: &str, path: &Path) -> String {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();

        if file_name.ends_with(".gemspec") {
            merge_gemspec(generated, existing)
        } else if file_name == "version.rb" {
            merge_version_rb(generated, existing)
        } else if file_name == "CHANGELOG.md" {
            existing.to_string()
        } else {
            generated.to_string()
        }
    }
}

/// Keep the destination's `gem.version` and `gem.homepage` lines.
pub fn merge_gemspec(generated: &str, existing: &str) -> String {
    let merged = preserve_line(&GEMSPEC_VERSION, generated, existing);
    preserve_line(&GEMSPEC_HOMEPAGE, &merged, existing)
}

/// Keep the destination's `VERSION = "x.y.z"` line.
pub fn merge_version_rb(generated: &str, existing: &str) -> String {
    preserve_line(&VERSION_CONSTANT, generated, existing)
}

/// Replace the first match of `pattern` in `generated` with the first match in
/// `existing`. Unchanged when either side has no match.
fn preserve_line(pattern: &Regex, generated: &str, existing: &str) -> String {
    match pattern.find(existing) {
        Some(kept) => pattern
            .replacen(generated, 1, NoExpand(kept.as_str()))
            .into_owned(),
        None => generated.to_string(),
    }
}
