use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use releve_core::{LineClass, LineClassifier, TextFragment, batch, detect_format};
use releve_export::homebank;
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "releve", version, about = "Bank statement text dumps to HomeBank CSV")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract transactions from fragment dumps and write a HomeBank CSV
    Convert {
        /// Fragment dump files (JSON array of {text, x, y}), one per statement
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output path (default: ./operations.csv)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Print reconstructed lines and their classification for one statement
    Inspect {
        /// Fragment dump file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert { files, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(homebank::OUTPUT_FILE_NAME));
            convert(files, &output).await?;
        }

        Command::Inspect { file } => {
            inspect(&file).await?;
        }
    }

    Ok(())
}

async fn convert(files: Vec<PathBuf>, output: &Path) -> Result<()> {
    let total = files.len();
    let documents = load_documents(files).await?;

    let result = batch::run(documents, |progress| {
        println!("processed {:.0}%", progress * 100.0);
    })?;

    for (id, err) in &result.errors {
        eprintln!("FAILED {id}: {err:#}");
    }
    println!(
        "Extracted {} transactions from {} file(s) ({} failed)",
        result.transactions.len(),
        total,
        result.errors.len()
    );

    let csv = homebank::to_csv(&result.transactions)?;
    tokio::fs::write(output, csv)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {}", output.display());

    Ok(())
}

async fn inspect(file: &Path) -> Result<()> {
    let fragments = load_fragments(file.to_path_buf()).await?;
    let format = detect_format(&fragments);
    println!(
        "{}: {} fragments, format {:?}",
        file.display(),
        fragments.len(),
        format
    );

    let classifier = LineClassifier::new()?;
    let lines = releve_core::LineReconstructor::new().reconstruct(&fragments);
    for line in &lines {
        let class = match classifier.classify(line) {
            LineClass::TransactionStart => "START",
            LineClass::Continuation => "CONT ",
            LineClass::Discard => "-    ",
        };
        println!(
            "{class} y={:>7.2} x={:>7.2} last_x={:>7.2} | {}",
            line.y, line.x, line.last_x, line.text
        );
    }

    Ok(())
}

/// Read all dump files concurrently; per-file read/parse errors stay attached
/// to their file so the batch can record them without aborting.
async fn load_documents(
    files: Vec<PathBuf>,
) -> Result<Vec<(String, Result<Vec<TextFragment>>)>> {
    let handles: Vec<_> = files
        .iter()
        .map(|file| tokio::spawn(load_fragments(file.clone())))
        .collect();

    let mut documents = Vec::with_capacity(files.len());
    for (file, handle) in files.into_iter().zip(handles) {
        let loaded = handle.await.context("document loader task panicked")?;
        documents.push((file.display().to_string(), loaded));
    }
    Ok(documents)
}

async fn load_fragments(path: PathBuf) -> Result<Vec<TextFragment>> {
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let fragments: Vec<TextFragment> = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing fragment dump {}", path.display()))?;
    debug!(file = %path.display(), count = fragments.len(), "fragment dump loaded");
    Ok(fragments)
}
