//! latplot - SSH vs QUIC-SSH latency comparison charts
//!
//! Reads line-delimited latency samples for a baseline and a variant
//! transport and renders box, density and mean bar charts per group.
//!
//! Exit codes:
//!   0 - Run completed (missing or malformed inputs are only logged)
//!   1 - Invalid arguments or configuration

mod analysis;
mod cli;
mod config;
mod loader;
mod models;
mod pipeline;
mod render;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use render::ChartStyle;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Configuration decides the log level, so it is read before logging starts
    let (config, config_source) = match prepare_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    init_logging(args.log_level(config.general.verbose));

    info!("latplot v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run(args, config).await {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .latplot.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize groups, colours, clamp ranges, and more.");
    Ok(())
}

/// Initialize logging at `level`.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Warning: a tracing subscriber is already installed");
    }
}

/// Load the configuration file (if any), apply CLI overrides and validate.
fn prepare_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    let (mut config, source) = load_config(args)?;
    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;
    Ok((config, source))
}

/// Render every group and write the optional report.
async fn run(args: Args, mut config: Config) -> Result<()> {
    if args.discover {
        let groups = loader::discover_groups(
            &config.general.input_dir,
            &config.discovery.baseline_tag,
            &config.discovery.variant_tag,
        )?;
        info!(
            "Discovered {} group(s) in {}",
            groups.len(),
            config.general.input_dir.display()
        );
        config.groups = groups;
    }

    config.retain_groups(&args.group);
    if config.groups.is_empty() {
        warn!("No groups to render");
    }

    let style = ChartStyle::from_config(&config.chart)?;

    if !args.quiet {
        println!("📈 Rendering {} group(s)", config.groups.len());
        println!("   Input:  {}", config.general.input_dir.display());
        println!("   Output: {}", config.general.output_dir.display());
        println!("   Parse policy: {}", config.loader.policy);
    }

    let report = pipeline::run_all(&config, style, !args.quiet).await;

    // A lost report does not undo the charts already on disk
    if let Some(ref path) = args.report {
        match write_report(&report, args.format, path) {
            Ok(()) => info!("Report saved to {}", path.display()),
            Err(e) => error!("{:#}", e),
        }
    }

    if !args.quiet {
        println!("\n📊 Summary:");
        for group in &report.groups {
            println!(
                "   {}: {} chart(s), {} problem(s)",
                group.prefix,
                group.artifacts.len(),
                group.failures.len() + group.baseline.issues.len() + group.variant.issues.len()
            );
        }
        println!(
            "   Charts written: {} | failed: {}",
            report.metadata.charts_written, report.metadata.charts_failed
        );
        println!("   Duration: {:.1}s", report.metadata.duration_seconds);
        println!("\n✅ Done.");
    }

    Ok(())
}

fn write_report(report: &models::RunReport, format: OutputFormat, path: &Path) -> Result<()> {
    let output = match format {
        OutputFormat::Json => report::generate_json_report(report)?,
        OutputFormat::Markdown => report::generate_markdown_report(report),
    };
    std::fs::write(path, &output)
        .with_context(|| format!("Failed to write report to {}", path.display()))
}

/// Load configuration from file or use defaults.
///
/// Runs before logging is set up; the file used (if any) is returned so
/// it can be logged afterwards.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    Ok(match Config::load_default()? {
        Some(config) => (config, Some(default_path)),
        None => (Config::default(), None),
    })
}
