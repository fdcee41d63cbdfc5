//! csv-charts CLI - Declarative charts from CSV data
//!
//! Discovers chart targets from an annotated HTML page or a JSON manifest,
//! loads their data and writes a Chart.js page.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use csv_charts::{
    config::{ChartConfig, Manifest, TargetDescriptor},
    discover,
    html::{self, PageConfig, PageSurface},
    label,
    loader::{HttpFetcher, SourceLoader},
    pipeline,
    transform::{self, TransformOptions},
};

/// csv-charts: Declarative charts from CSV data
#[derive(Parser, Debug)]
#[command(name = "csv-charts")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render every chart target into an HTML page
    Render(RenderArgs),

    /// List the chart targets that would be rendered
    Targets(SourceArgs),

    /// Load one CSV source and print the transformed rows
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// HTML page with annotated <canvas data-chart="..."> elements
    #[arg(long, value_name = "FILE", conflicts_with = "manifest", required_unless_present = "manifest")]
    page: Option<PathBuf>,

    /// JSON manifest listing chart targets
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Base URL or directory for relative data sources
    /// (defaults to the directory of the page or manifest)
    #[arg(long, env = "CSV_CHARTS_BASE")]
    base: Option<String>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Output directory for the generated page
    #[arg(short, long, default_value = "charts")]
    output_dir: PathBuf,

    /// Page title (defaults to the manifest title)
    #[arg(long)]
    title: Option<String>,

    /// Exit with a failure status when any chart fails
    #[arg(long, default_value = "false")]
    fail_on_error: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    /// CSV URL or path
    #[arg(long)]
    csv: String,

    /// Column used for row labels
    #[arg(long)]
    label_col: Option<String>,

    /// Qualifier column appended to labels
    #[arg(long)]
    season_col: Option<String>,

    /// Column to sort by
    #[arg(long)]
    sort_col: Option<String>,

    /// Sort direction (asc or desc)
    #[arg(long, default_value = "desc")]
    sort_dir: String,

    /// Number of rows to keep (0 keeps all)
    #[arg(short, long, default_value = "0")]
    limit: usize,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: String,

    /// Base URL or directory for a relative source
    #[arg(long, env = "CSV_CHARTS_BASE")]
    base: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    match cli.command {
        Commands::Render(args) => render_command(args).await,
        Commands::Targets(args) => targets_command(args),
        Commands::Inspect(args) => inspect_command(args).await,
    }
}

/// Render all targets into a page
async fn render_command(args: RenderArgs) -> Result<()> {
    let (targets, manifest_title) = load_targets(&args.source)?;
    info!("Found {} chart target(s)", targets.len());

    let loader = SourceLoader::new(fetcher(&args.source)?);
    let surface = PageSurface::new()?;
    let outcomes = pipeline::render_all(&targets, &loader, &surface).await;

    let config = PageConfig {
        title: args
            .title
            .or(manifest_title)
            .unwrap_or_else(|| PageConfig::default().title),
        output_dir: args.output_dir,
    };
    let index = html::write_page(&outcomes, &config).with_context(|| "Failed to write chart page")?;
    info!("Chart page written to {:?}", index);

    let failed: Vec<&str> = outcomes
        .iter()
        .filter(|o| o.is_failed())
        .map(|o| o.id())
        .collect();
    if !failed.is_empty() {
        error!("{} chart(s) failed: {}", failed.len(), failed.join(", "));
        if args.fail_on_error {
            std::process::exit(1);
        }
    }

    Ok(())
}

/// Print discovered targets
fn targets_command(args: SourceArgs) -> Result<()> {
    let (targets, _) = load_targets(&args)?;

    if targets.is_empty() {
        println!("No chart targets found.");
        return Ok(());
    }

    for target in &targets {
        let kind_note = match target.chart_kind() {
            Ok(_) => String::new(),
            Err(e) => format!(" [{}]", e),
        };
        println!(
            "{:<24} {:<18} {}{}",
            target.id,
            target.kind,
            target.config.csv().unwrap_or("-"),
            kind_note
        );
    }

    Ok(())
}

/// Load one source and print its transformed rows
async fn inspect_command(args: InspectArgs) -> Result<()> {
    let mut fetcher = HttpFetcher::new()?;
    if let Some(base) = &args.base {
        fetcher = fetcher.with_base_str(base)?;
    }
    let loader = SourceLoader::new(fetcher);

    let records = loader
        .load(&args.csv)
        .await
        .with_context(|| format!("Failed to load {}", args.csv))?;

    let mut config = ChartConfig::new()
        .with("sortDir", &args.sort_dir)
        .with("limit", &args.limit.to_string());
    if let Some(col) = &args.sort_col {
        config = config.with("sortCol", col);
    }
    let rows = transform::apply(&records, &TransformOptions::from_config(&config));
    debug!("{} of {} rows kept", rows.len(), records.len());

    match args.format.as_str() {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            for row in &rows {
                let columns: Vec<String> = row
                    .columns()
                    .map(|c| format!("{}={}", c, row.get(c)))
                    .collect();
                match &args.label_col {
                    Some(label_col) => println!(
                        "{}: {}",
                        label::derive_label(row, label_col, args.season_col.as_deref()),
                        columns.join(", ")
                    ),
                    None => println!("{}", columns.join(", ")),
                }
            }
        }
    }

    Ok(())
}

/// Targets and optional title from a page or manifest
fn load_targets(args: &SourceArgs) -> Result<(Vec<TargetDescriptor>, Option<String>)> {
    if let Some(page) = &args.page {
        let html = std::fs::read_to_string(page)
            .with_context(|| format!("Failed to read page: {:?}", page))?;
        let targets = discover::discover_targets(&html)?;
        return Ok((targets, None));
    }

    if let Some(path) = &args.manifest {
        let manifest = Manifest::load_from_file(path)
            .with_context(|| format!("Failed to load manifest: {:?}", path))?;
        return Ok((manifest.targets, manifest.title));
    }

    anyhow::bail!("Either --page or --manifest is required")
}

/// Fetcher resolving relative sources against `--base` or the input's directory
fn fetcher(args: &SourceArgs) -> Result<HttpFetcher> {
    let fetcher = HttpFetcher::new()?;

    if let Some(base) = &args.base {
        return Ok(fetcher.with_base_str(base)?);
    }

    let input = args.page.as_deref().or(args.manifest.as_deref());
    let dir = input
        .and_then(Path::parent)
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(fetcher.with_base_dir(dir)?)
}
