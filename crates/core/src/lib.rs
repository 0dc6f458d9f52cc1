//! Core library for synth
//!
//! This crate holds the pieces of the synthesis step that can be exercised
//! without docker or a googleapis checkout: the generation request, the
//! generator and copier seams, merge policies, the tree copier and the
//! metadata record.
//!
//! # Architecture Overview
//!
//! - **`synth_core`** (this crate): request assembly, merge rules, copy logic
//!   and the `synthesize` pipeline
//! - **`synth`**: the binary that drives docker and git and wires everything
//!   together
//!
//! A synthesis run is linear:
//!
//! 1. Build a [`GenerationRequest`] (literal DLP V2 values or a `synth.toml`).
//! 2. Hand it to a [`Generator`], which returns a [`GeneratedLibrary`].
//! 3. Hand that to a [`Copier`], which merges it into the destination tree.
//!
//! Any failure stops the run; nothing is retried.
//!
//! # Module Organization
//!
//! - [`request`]: the generation request and the DLP V2 constants
//! - [`generator`]: the generator trait and the docker command layout
//! - [`merge`]: merge policies for files present on both sides
//! - [`copy`]: the copier trait and the filesystem implementation
//! - [`pipeline`]: generator then copier, exactly once each
//! - [`metadata`]: the `synth.metadata` record
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use synth_core::{synthesize, GenerationRequest, RubyGlobalMerge, TreeCopier};
//!
//! let request = GenerationRequest::dlp_v2();
//! let copier = TreeCopier::new(".", RubyGlobalMerge);
//! let synthesis = synthesize(&request, &my_generator, &copier)?;
//! println!("{} files written", synthesis.report.written());
//! ```

pub mod copy;
pub mod error;
pub mod generator;
pub mod merge;
pub mod metadata;
pub mod pipeline;
pub mod request;

pub use copy::{Copier, CopyReport, TreeCopier};
pub use error::{Result, SynthError};
pub use generator::{GeneratedLibrary, Generator, Source};
pub use merge::{MergePolicy, Overwrite, RubyGlobalMerge};
pub use pipeline::{synthesize, Synthesis};
pub use request::GenerationRequest;
