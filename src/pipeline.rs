//! Conversion Pipeline - Single Entry Point
//!
//! Scanner -> Normalizer -> Consolidator -> [Orderer] -> Emitter.
//! Per-unit and per-file problems become diagnostics; only conditions that
//! stop the run become `PipelineError`.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{PipelineConfig, Variant};
use crate::consolidate::Consolidator;
use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::emit::Emitter;
use crate::model::Corpus;
use crate::normalize::Normalizer;
use crate::order::order_canonically;
use crate::scan::scan_dir;
use crate::ENGINE_VERSION;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Configuration requires engine >= {0}, current is {1}")]
    EngineVersionMismatch(String, String),

    #[error("Error reading '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error writing HTML file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Render error: {0}")]
    Render(String),

    #[error("Malformed artifact: {0}")]
    Artifact(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Outcome of one pipeline run. Run metadata lives here, never in the
/// artifact, so artifacts stay byte-identical across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub engine_version: String,
    pub variant: Variant,
    pub files_scanned: usize,
    pub books_written: usize,
    pub output_path: Option<PathBuf>,
    pub artifact_hash: Option<String>,
    pub diagnostics: Diagnostics,
}

impl RunReport {
    pub fn wrote_output(&self) -> bool {
        self.output_path.is_some()
    }
}

pub struct ConversionPipeline {
    config: PipelineConfig,
}

impl ConversionPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn normalizer(&self) -> Normalizer {
        match self.config.variant {
            Variant::Consolidated => Normalizer::preserving(),
            Variant::Canonical => Normalizer::sorting(),
        }
    }

    /// Build the final corpus without writing anything. Returns the corpus
    /// and the number of candidate files found.
    pub fn build_corpus(&self, diags: &mut Diagnostics) -> (Corpus, usize) {
        let dir = &self.config.input_dir;
        let files = match scan_dir(dir, &self.config.extension) {
            Ok(files) => files,
            Err(e) => {
                diags.error(
                    DiagnosticKind::IoFailure,
                    format!("Input directory not found or unreadable at '{}': {}", dir.display(), e),
                    DiagnosticContext::file(dir),
                );
                return (Corpus::new(), 0);
            }
        };

        let mut consolidator = Consolidator::new(self.normalizer());
        for path in &files {
            consolidator.ingest_file(path, diags);
        }
        let corpus = consolidator.finish();

        let corpus = match self.config.variant {
            Variant::Consolidated => corpus,
            Variant::Canonical => {
                diags.info(
                    DiagnosticKind::Progress,
                    "Reordering books according to KJV order...",
                    DiagnosticContext::default(),
                );
                order_canonically(corpus, self.config.extras, diags)
            }
        };
        (corpus, files.len())
    }

    /// Run the whole pipeline and write the artifact.
    pub fn run(&self) -> Result<RunReport, PipelineError> {
        self.run_with(&mut Diagnostics::new())
    }

    /// Like `run`, recording into a caller-owned sink so diagnostics
    /// survive a failed write.
    pub fn run_with(&self, diags: &mut Diagnostics) -> Result<RunReport, PipelineError> {
        let run_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        tracing::info!(
            run_id = %run_id,
            input = %self.config.input_dir.display(),
            variant = ?self.config.variant,
            "starting conversion"
        );

        let (corpus, files_scanned) = self.build_corpus(diags);

        if !corpus.is_empty() {
            diags.info(
                DiagnosticKind::Progress,
                format!(
                    "Writing {} books to '{}'...",
                    corpus.len(),
                    self.config.output_file.display()
                ),
                DiagnosticContext::default(),
            );
        }

        let emitter = Emitter::new(self.config.variant)
            .with_variable(self.config.variable_name.clone())
            .with_title(self.config.title.clone());
        let emitted = emitter.write(&corpus, &self.config.output_file, diags)?;

        if let Some(e) = &emitted {
            diags.info(
                DiagnosticKind::Progress,
                format!("Conversion complete. HTML file saved as '{}'.", e.path.display()),
                DiagnosticContext::file(&e.path),
            );
        }

        Ok(RunReport {
            run_id,
            started_at,
            engine_version: ENGINE_VERSION.to_string(),
            variant: self.config.variant,
            files_scanned,
            books_written: if emitted.is_some() { corpus.len() } else { 0 },
            output_path: emitted.as_ref().map(|e| e.path.clone()),
            artifact_hash: emitted.map(|e| e.hash),
            diagnostics: diags.clone(),
        })
    }
}
