//! CLI entry point for the store satisfaction dashboard.
//!
//! Provides subcommands for building the monthly dashboard from a survey CSV,
//! searching store comments, and extracting the survey workbook to CSV.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use store_satisfaction::{
    analyzers::comments::search_comments,
    config::SurveyConfig,
    dataset::SurveyDataset,
    extract::extract_workbook,
    output::{print_pretty, to_json, write_output, write_rejected_rows},
    report::{build_dashboard, render_markdown},
};
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "store-satisfaction")]
#[command(about = "Monthly customer-satisfaction dashboard for retail stores", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Markdown,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dashboard comparing the two configured months
    Report {
        /// Survey CSV exported from the workbook
        #[arg(short, long, default_value = "processed_data.csv")]
        input: PathBuf,

        /// JSON file overriding stores, periods or the affirmative reuse label
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Markdown)]
        format: Format,

        /// Write the dashboard here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write rows refused by validation to this CSV
        #[arg(long)]
        rejected_out: Option<PathBuf>,
    },
    /// Search a store's comments (case-insensitive)
    Search {
        #[arg(short, long, default_value = "processed_data.csv")]
        input: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Store to search in
        #[arg(short, long)]
        store: String,

        /// Text to look for; empty lists every comment
        #[arg(short, long, default_value = "")]
        term: String,
    },
    /// Convert the first sheet of the survey workbook to CSV
    Extract {
        /// Path to the .xlsx workbook
        #[arg(short, long)]
        workbook: PathBuf,

        /// CSV file to create
        #[arg(short, long, default_value = "processed_data.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/store_satisfaction.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("store_satisfaction.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            config,
            format,
            out,
            rejected_out,
        } => {
            let config = load_config(config.as_deref())?;
            let dataset = load_dataset(&input, &config)?;

            if let Some(path) = rejected_out {
                write_rejected_rows(&path, dataset.rejected())?;
            } else if !dataset.rejected().is_empty() {
                warn!(
                    rejected = dataset.rejected().len(),
                    "Some rows were rejected; pass --rejected-out to save them"
                );
            }

            let dashboard = build_dashboard(&dataset, &config);
            print_pretty(&dashboard);

            let content = match format {
                Format::Markdown => render_markdown(&dashboard),
                Format::Json => to_json(&dashboard)?,
            };
            write_output(out.as_deref(), &content)?;
        }
        Commands::Search {
            input,
            config,
            store,
            term,
        } => {
            let config = load_config(config.as_deref())?;
            if !config.stores.contains(&store) {
                anyhow::bail!(
                    "unknown store {store:?}; known stores: {}",
                    config.stores.join(", ")
                );
            }
            let dataset = load_dataset(&input, &config)?;

            let hits = search_comments(dataset.responses(), &store, &term);
            info!(store = %store, term = %term, hits = hits.len(), "Comment search");
            let mut content = String::new();
            for hit in &hits {
                content.push_str(&format!("{}\t{}\n", hit.line, hit.comment));
            }
            write_output(None, &content)?;
        }
        Commands::Extract { workbook, output } => {
            let rows = extract_workbook(&workbook, &output).with_context(|| {
                format!("failed to extract {}", workbook.display())
            })?;
            info!(rows, output = %output.display(), "Extraction complete");
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<SurveyConfig> {
    match path {
        Some(path) => SurveyConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(SurveyConfig::default()),
    }
}

fn load_dataset(input: &Path, config: &SurveyConfig) -> Result<SurveyDataset> {
    SurveyDataset::load(input, &config.stores)
        .with_context(|| format!("failed to load survey data from {}", input.display()))
}
