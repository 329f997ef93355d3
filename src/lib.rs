//! Bible Embed Core - Scripture Corpus Compiler
//!
//! # The Pipeline Laws
//! 1. Bad Units Are Skipped, Never Fatal
//! 2. Later Files Overwrite Earlier Books
//! 3. Canonical Order Is Fixed
//! 4. Deterministic Output
//! 5. Every Skip Is Reported

pub mod model;
pub mod canon;
pub mod diagnostics;
pub mod scan;
pub mod normalize;
pub mod consolidate;
pub mod order;
pub mod emit;
pub mod hashing;
pub mod config;
pub mod pipeline;

pub use model::{BookRecord, ChapterRecord, Corpus, VerseRecord};
pub use canon::{canonical_order, CanonEntry, Testament};
pub use diagnostics::{Diagnostic, DiagnosticContext, DiagnosticKind, Diagnostics, Severity};
pub use normalize::{Normalizer, Rejection};
pub use consolidate::Consolidator;
pub use order::{order_canonically, ExtrasPolicy};
pub use emit::{read_artifact, Emitter};
pub use hashing::{canonical_json, corpus_digest, sha256_hex};
pub use config::{PipelineConfig, Variant};
pub use pipeline::{ConversionPipeline, PipelineError, RunReport};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
