//! Bible Embed CLI
//!
//! Commands: convert, inspect, canon
//! Diagnostic lines go to stdout, tracing logs to stderr.
//! Returns 1 when the run fails, 2 when it finished with error diagnostics.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;

use bible_embed_core::{
    canonical_order, corpus_digest, emit::read_artifact_file, emit::DEFAULT_VARIABLE,
    ConversionPipeline, Diagnostics, ExtrasPolicy, PipelineConfig, Severity, Variant,
};

#[derive(Parser)]
#[command(name = "bible-embed-cli")]
#[command(version, about = "Bible Embed CLI - JSON book corpus to embedded HTML data")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    Consolidated,
    Canonical,
}

impl From<VariantArg> for Variant {
    fn from(v: VariantArg) -> Self {
        match v {
            VariantArg::Consolidated => Variant::Consolidated,
            VariantArg::Canonical => Variant::Canonical,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of JSON books into one HTML artifact
    Convert {
        /// JSON configuration file; flags below override it
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input directory holding the JSON files
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output HTML file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pipeline variant
        #[arg(long, value_enum)]
        variant: Option<VariantArg>,

        /// Name of the embedded JavaScript variable
        #[arg(long = "var")]
        variable: Option<String>,

        /// Append non-canonical books after the canonical sequence
        #[arg(long)]
        append_extras: bool,

        /// Hide progress lines, show warnings and errors only
        #[arg(short, long)]
        quiet: bool,

        /// Print the run report as JSON instead of diagnostic lines
        #[arg(long)]
        json: bool,
    },

    /// Read an artifact back and summarize its embedded corpus
    Inspect {
        /// Artifact produced by `convert`
        file: PathBuf,

        /// Name of the embedded JavaScript variable
        #[arg(long = "var", default_value = DEFAULT_VARIABLE)]
        variable: String,
    },

    /// Print the canonical book order
    Canon,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bible_embed_core=warn".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { config, input, output, variant, variable, append_extras, quiet, json } => {
            let mut cfg = match config {
                Some(path) => match PipelineConfig::load(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        println!("Error: {}", e);
                        return ExitCode::FAILURE;
                    }
                },
                None => PipelineConfig::default(),
            };
            if let Some(dir) = input {
                cfg.input_dir = dir;
            }
            if let Some(file) = output {
                cfg.output_file = file;
            }
            if let Some(v) = variant {
                cfg.variant = v.into();
            }
            if let Some(name) = variable {
                cfg.variable_name = name;
            }
            if append_extras {
                cfg.extras = ExtrasPolicy::Append;
            }

            let pipeline = match ConversionPipeline::new(cfg) {
                Ok(p) => p,
                Err(e) => {
                    println!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };

            let mut diags = Diagnostics::new();
            let result = pipeline.run_with(&mut diags);

            match result {
                Ok(report) if json => {
                    match serde_json::to_string_pretty(&report) {
                        Ok(text) => println!("{}", text),
                        Err(e) => {
                            println!("Error: {}", e);
                            return ExitCode::FAILURE;
                        }
                    }
                    exit_for(&report.diagnostics)
                }
                Ok(report) => {
                    print_diagnostics(&report.diagnostics, quiet);
                    exit_for(&report.diagnostics)
                }
                Err(e) => {
                    print_diagnostics(&diags, quiet);
                    println!("Error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }

        Commands::Inspect { file, variable } => {
            let corpus = match read_artifact_file(&file, &variable) {
                Ok(c) => c,
                Err(e) => {
                    println!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };
            let digest = match corpus_digest(&corpus) {
                Ok(d) => d,
                Err(e) => {
                    println!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            };

            let books: Vec<_> = corpus
                .iter()
                .map(|b| serde_json::json!({
                    "name": b.name,
                    "chapters": b.chapters.len(),
                    "verses": b.verse_count(),
                }))
                .collect();
            let output = serde_json::json!({
                "file": file,
                "book_count": corpus.len(),
                "corpus_digest": digest,
                "books": books,
            });
            print_json(&output)
        }

        Commands::Canon => {
            let entries: Vec<_> = canonical_order().collect();
            print_json(&entries)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_diagnostics(diags: &Diagnostics, quiet: bool) {
    for d in diags {
        if quiet && d.severity == Severity::Info {
            continue;
        }
        println!("{}", d);
    }
}

fn exit_for(diags: &Diagnostics) -> ExitCode {
    if diags.has_errors() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
