//! Emitter - Corpus to Embedded-Data HTML
//!
//! The artifact is a minimal document shell holding one script block that
//! assigns the whole corpus to a named variable. The JSON literal uses
//! four-space indentation and keeps non-ASCII text as-is.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::config::Variant;
use crate::diagnostics::{DiagnosticContext, DiagnosticKind, Diagnostics};
use crate::hashing::sha256_hex;
use crate::model::Corpus;
use crate::pipeline::PipelineError;

pub const DEFAULT_VARIABLE: &str = "simulatedBibleData";

const INDENT: &[u8] = b"    ";

/// Fixed text surrounding the data literal for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentShell {
    pub title: &'static str,
    pub script_open: &'static str,
    pub banner_open: &'static str,
    pub banner_close: &'static str,
    pub status_heading: bool,
}

impl DocumentShell {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Consolidated => Self {
                title: "Bible Data",
                script_open: "<script>",
                banner_open: "// --- !!! SIMULATED BIBLE DATA !!! ---",
                banner_close: "// --- End Simulated Data ---",
                status_heading: false,
            },
            Variant::Canonical => Self {
                title: "Bible Data (KJV Order)",
                script_open: "<script type=\"text/javascript\">",
                banner_open: "// --- !!! BIBLE DATA (KJV ORDER) !!! ---",
                banner_close: "// --- End Bible Data ---",
                status_heading: true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub path: PathBuf,
    pub bytes_written: usize,
    pub hash: String,
}

pub struct Emitter {
    shell: DocumentShell,
    variable: String,
    title: Option<String>,
}

impl Emitter {
    pub fn new(variant: Variant) -> Self {
        Self {
            shell: DocumentShell::for_variant(variant),
            variable: DEFAULT_VARIABLE.to_string(),
            title: None,
        }
    }

    pub fn with_variable(mut self, variable: impl Into<String>) -> Self {
        self.variable = variable.into();
        self
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    /// Render the full artifact text.
    pub fn render(&self, corpus: &Corpus) -> Result<String, PipelineError> {
        let literal = data_literal(corpus)?;
        let title = match &self.title {
            Some(t) => escape_html(t),
            None => self.shell.title.to_string(),
        };

        let mut out = String::with_capacity(literal.len() + 512);
        out.push_str(&format!("<html><head><title>{title}</title></head><body>\n"));
        out.push_str(self.shell.script_open);
        out.push('\n');
        out.push_str(self.shell.banner_open);
        out.push('\n');
        out.push_str(&format!("const {} = ", self.variable));
        out.push_str(&literal);
        out.push_str(";\n");
        out.push_str(self.shell.banner_close);
        out.push('\n');
        out.push_str("</script>\n");
        if self.shell.status_heading {
            out.push_str(&format!(
                "<h1>Bible data loaded into JavaScript variable '{}'.</h1>\n",
                self.variable
            ));
        }
        out.push_str("</body></html>");
        Ok(out)
    }

    /// Write the artifact. An empty corpus writes nothing and yields `None`.
    pub fn write(
        &self,
        corpus: &Corpus,
        path: &Path,
        diags: &mut Diagnostics,
    ) -> Result<Option<Emitted>, PipelineError> {
        if corpus.is_empty() {
            diags.info(
                DiagnosticKind::EmptyResult,
                format!(
                    "No valid JSON data to write. Output file '{}' not created or updated.",
                    path.display()
                ),
                DiagnosticContext::file(path),
            );
            return Ok(None);
        }

        let text = self.render(corpus)?;
        fs::write(path, text.as_bytes()).map_err(|source| PipelineError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        tracing::info!(path = %path.display(), books = corpus.len(), "artifact written");
        Ok(Some(Emitted {
            path: path.to_path_buf(),
            bytes_written: text.len(),
            hash: sha256_hex(text.as_bytes()),
        }))
    }
}

/// Serialize the corpus as an indented JSON literal that is safe inside a
/// script element.
pub fn data_literal(corpus: &Corpus) -> Result<String, PipelineError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
    corpus.serialize(&mut ser)?;
    let json = String::from_utf8(buf).map_err(|e| PipelineError::Render(e.to_string()))?;
    Ok(json.replace("</", "<\\/"))
}

/// Recover the corpus embedded in an artifact produced by `Emitter`.
pub fn read_artifact(text: &str, variable: &str) -> Result<Corpus, PipelineError> {
    // The title is free text, so only look inside the script element.
    let script = text
        .find("<script")
        .ok_or_else(|| PipelineError::Artifact("no script element".to_string()))?;
    let marker = format!("const {variable} = ");
    let start = text[script..]
        .find(&marker)
        .map(|i| script + i + marker.len())
        .ok_or_else(|| PipelineError::Artifact(format!("variable '{variable}' not found")))?;
    let end = text[start..]
        .rfind(";\n// --- End")
        .map(|i| start + i)
        .ok_or_else(|| PipelineError::Artifact("unterminated data block".to_string()))?;

    Ok(serde_json::from_str(&text[start..end])?)
}

pub fn read_artifact_file(path: &Path, variable: &str) -> Result<Corpus, PipelineError> {
    let text = fs::read_to_string(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    read_artifact(&text, variable)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
