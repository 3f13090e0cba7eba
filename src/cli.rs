//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// latplot - SSH vs QUIC-SSH latency comparison charts
///
/// Reads latency files (one number per line) and renders a box plot,
/// a density plot and a bar chart of means for every comparison group.
/// Without a configuration file the four standard payload sizes
/// (1KB, 1MB, 5MB, 10MB) are rendered from the working directory.
///
/// Examples:
///   latplot
///   latplot --input-dir ./results --output-dir ./charts
///   latplot --discover --skip-invalid
///   latplot --group latency_1MB --report summary.md
///   latplot --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to configuration file
    ///
    /// If not specified, looks for .latplot.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory containing the latency files
    #[arg(short, long, value_name = "DIR", env = "LATPLOT_INPUT_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the charts are written to
    #[arg(short, long, value_name = "DIR", env = "LATPLOT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only render the groups with these prefixes (comma-separated)
    ///
    /// Example: --group latency_1KB,latency_1MB
    #[arg(short, long, value_name = "PREFIX", value_delimiter = ',')]
    pub group: Vec<String>,

    /// Build groups from the latency_<tag>_<size> files in the input directory
    ///
    /// Replaces the configured group list.
    #[arg(long)]
    pub discover: bool,

    /// Skip malformed lines instead of discarding the whole file
    #[arg(long)]
    pub skip_invalid: bool,

    /// Number of groups rendered in parallel
    #[arg(long, value_name = "NUM")]
    pub concurrency: Option<usize>,

    /// Write a summary of every group to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Summary report format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Font file used for chart text
    ///
    /// Defaults to the first common system sans-serif font found.
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .latplot.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the summary report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.concurrency == Some(0) {
            return Err("Concurrency must be at least 1".to_string());
        }

        if let Some(ref dir) = self.input_dir {
            if !dir.is_dir() {
                return Err(format!("Input directory does not exist: {}", dir.display()));
            }
        }

        if let Some(ref font) = self.font {
            if !font.is_file() {
                return Err(format!("Font file does not exist: {}", font.display()));
            }
        }

        if self.group.iter().any(|g| g.trim().is_empty()) {
            return Err("Group prefixes must not be empty".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    ///
    /// `config_verbose` is `general.verbose` from the configuration file;
    /// `--quiet` wins over both.
    pub fn log_level(&self, config_verbose: bool) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose || config_verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            config: None,
            input_dir: None,
            output_dir: None,
            group: Vec::new(),
            discover: false,
            skip_invalid: false,
            concurrency: None,
            report: None,
            format: OutputFormat::Markdown,
            font: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_default_args_are_valid() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_concurrency() {
        let mut args = make_args();
        args.concurrency = Some(0);
        assert!(args.validate().is_err());

        args.concurrency = Some(2);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_missing_input_dir() {
        let mut args = make_args();
        args.input_dir = Some(PathBuf::from("/definitely/not/here"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_group_list() {
        let args = Args::try_parse_from(["latplot", "--group", "latency_1KB,latency_1MB"]).unwrap();
        assert_eq!(args.group, vec!["latency_1KB", "latency_1MB"]);
        assert_eq!(args.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(false), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(false), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(false), tracing::Level::ERROR);
    }

    #[test]
    fn test_config_verbose_raises_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(true), tracing::Level::DEBUG);

        args.quiet = true;
        assert_eq!(args.log_level(true), tracing::Level::ERROR);
    }

    #[test]
    fn test_verbose_from_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join(".latplot.toml");
        std::fs::write(&path, "[general]\nverbose = true\n").unwrap();

        let args = make_args();
        let mut config = crate::config::Config::load(&path).unwrap();
        config.merge_with_args(&args);
        assert_eq!(args.log_level(config.general.verbose), tracing::Level::DEBUG);
    }
}
