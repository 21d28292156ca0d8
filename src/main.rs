use clap::Parser;
use docprep::{DocumentPreprocessor, InMemoryRowProvider, PreprocessError};
use log::info;
use serde_json::{Map, Value, from_str};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Normalizes a document description and prints the canonical form.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Document description (JSON)
    input: PathBuf,

    /// Write the normalized document here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Normalizer configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rows for live tables: a JSON object mapping query text to row arrays
    #[arg(long)]
    rows: Option<PathBuf>,

    /// Pretty-print the output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), PreprocessError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("docprep=info")).init();

    let args = Args::parse();

    let mut builder = DocumentPreprocessor::builder();
    if let Some(config_path) = &args.config {
        builder = builder.with_config_file(config_path)?;
    }
    if let Some(rows_path) = &args.rows {
        builder = builder.with_row_provider(Arc::new(load_rows(rows_path)?));
    }
    let preprocessor = builder.build();

    info!("Loading document from {}", args.input.display());
    let source = fs::read_to_string(&args.input)?;
    let document = preprocessor.preprocess_str(&source).await?;

    let rendered = if args.pretty {
        serde_json::to_string_pretty(&document.to_value())?
    } else {
        serde_json::to_string(&document.to_value())?
    };
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn load_rows(path: &Path) -> Result<InMemoryRowProvider, PreprocessError> {
    let tables: Map<String, Value> = from_str(&fs::read_to_string(path)?)?;
    let provider = InMemoryRowProvider::new();
    for (query, rows) in tables {
        let rows = match rows {
            Value::Array(rows) => rows,
            single => vec![single],
        };
        provider.add(query, rows)?;
    }
    Ok(provider)
}
