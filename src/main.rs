use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use medrec::config::PipelineConfig;
use medrec::extraction::{ExtractionMode, Extractor};
use medrec::structuring::{Envelope, StructuringEngine};

#[derive(Parser)]
#[command(name = "medrec", about = "Extract and structure medical records", version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract raw text from a document and print it
    Extract {
        /// Input document (.txt, .docx, .pdf, or an image)
        path: PathBuf,

        /// OCR preprocessing mode
        #[arg(long, value_enum, default_value_t = ModeArg::Original)]
        mode: ModeArg,
    },
    /// Extract text and structure it into a medical record (JSON envelope)
    Structure {
        /// Input document (.txt, .docx, .pdf, or an image)
        path: PathBuf,

        /// OCR preprocessing mode
        #[arg(long, value_enum, default_value_t = ModeArg::Processed)]
        mode: ModeArg,

        /// Write the envelope to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Original,
    Processed,
}

impl From<ModeArg> for ExtractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Original => ExtractionMode::Original,
            ModeArg::Processed => ExtractionMode::Processed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "medrec=debug" } else { "medrec=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = PipelineConfig::default();

    match cli.command {
        Commands::Extract { path, mode } => {
            let raw = Extractor::from_config(&config)
                .extract(&path, mode.into())
                .with_context(|| format!("failed to extract {}", path.display()))?;
            println!("{}", raw.text);
        }
        Commands::Structure { path, mode, output } => {
            let envelope = run_structure(&config, &path, mode.into());
            let json = serde_json::to_string_pretty(&envelope)
                .context("failed to serialize result envelope")?;
            // A failure envelope is still a delivered result; only I/O on
            // our side exits non-zero.
            match output {
                Some(output) => std::fs::write(&output, json)
                    .with_context(|| format!("failed to write {}", output.display()))?,
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}

fn run_structure(config: &PipelineConfig, path: &Path, mode: ExtractionMode) -> Envelope {
    let extractor = Extractor::from_config(config);
    match extractor.extract(path, mode) {
        Ok(raw) => StructuringEngine::from_config(&config.llm).structure(&raw.text),
        Err(e) => Envelope::failure(e.to_string()),
    }
}
