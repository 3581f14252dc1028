//! lang2vec command-line front end
//!
//! Prints one line per language with its feature vector.
//!
//! ```text
//! lang2vec "deu eng" fam
//! lang2vec "fra deu" "syntax_wals|syntax_sswl" --fields --minimal
//! lang2vec eng learned --json
//! ```

use clap::Parser;
use lang2vec_core::{Lang2Vec, Lang2VecConfig, QueryOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

/// Look up typological, phonological, family and geographic language vectors
#[derive(Parser)]
#[command(name = "lang2vec")]
#[command(version)]
#[command(about = "Look up URIEL language vectors")]
struct Cli {
    /// Space-separated language codes (ISO 639-3, or 639-1 aliases)
    languages: String,

    /// Feature-set spec: `+` concatenates, `|` takes the elementwise union
    feature_sets: String,

    /// Print a header line with the feature names
    #[arg(short = 'f', long = "fields")]
    fields: bool,

    /// Drop columns that carry no information for these languages
    #[arg(short, long)]
    minimal: bool,

    /// Directory holding the URIEL data files
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print a JSON object instead of tab-separated lines
    #[arg(long)]
    json: bool,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        n => EnvFilter::new(log_level(n)),
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(error = ?e, "query failed");
            eprintln!("lang2vec: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// `-v` shows store loads and query summaries, `-vv` adds per-set resolution
fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn run(cli: &Cli) -> Result<String, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => Lang2VecConfig::load(path)?,
        None => Lang2VecConfig::discover(),
    };
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }

    let l2v = Lang2Vec::new(config)?;
    let options = QueryOptions::new()
        .with_header(cli.fields)
        .with_minimal(cli.minimal);
    let result = l2v.query(cli.languages.as_str(), cli.feature_sets.as_str(), options)?;

    if cli.json {
        Ok(format!("{}\n", serde_json::to_string_pretty(&result.to_json())?))
    } else {
        Ok(result.to_tsv())
    }
}
