//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.latplot.toml` files.

use crate::loader::ParsePolicy;
use crate::models::ClampRange;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".latplot.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Loader settings.
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Chart settings.
    #[serde(default)]
    pub chart: ChartConfig,

    /// Group discovery settings.
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Comparison groups to render, in order.
    #[serde(default = "default_groups")]
    pub groups: Vec<GroupSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            loader: LoaderConfig::default(),
            chart: ChartConfig::default(),
            discovery: DiscoveryConfig::default(),
            groups: default_groups(),
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory the latency files are read from.
    #[serde(default = "default_dir")]
    pub input_dir: PathBuf,

    /// Directory the charts are written to.
    #[serde(default = "default_dir")]
    pub output_dir: PathBuf,

    /// Number of groups rendered at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input_dir: default_dir(),
            output_dir: default_dir(),
            concurrency: default_concurrency(),
            verbose: false,
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_concurrency() -> usize {
    1
}

/// Sample loader settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// How malformed lines are handled.
    #[serde(default)]
    pub policy: ParsePolicy,
}

/// Chart appearance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Category and legend label of the baseline series.
    #[serde(default = "default_baseline_name")]
    pub baseline_name: String,

    /// Category and legend label of the variant series.
    #[serde(default = "default_variant_name")]
    pub variant_name: String,

    /// Baseline colour as `#RRGGBB`.
    #[serde(default = "default_baseline_color")]
    pub baseline_color: String,

    /// Variant colour as `#RRGGBB`.
    #[serde(default = "default_variant_color")]
    pub variant_color: String,

    /// Latency unit shown in axis labels.
    #[serde(default = "default_unit")]
    pub unit: String,

    /// Box plot size in pixels.
    #[serde(default = "default_small_size")]
    pub box_size: [u32; 2],

    /// Density plot size in pixels.
    #[serde(default = "default_wide_size")]
    pub density_size: [u32; 2],

    /// Bar chart size in pixels.
    #[serde(default = "default_small_size")]
    pub bar_size: [u32; 2],

    /// Number of points each density curve is evaluated at.
    #[serde(default = "default_kde_points")]
    pub kde_points: usize,

    /// TrueType/OpenType font used for all chart text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<PathBuf>,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            baseline_name: default_baseline_name(),
            variant_name: default_variant_name(),
            baseline_color: default_baseline_color(),
            variant_color: default_variant_color(),
            unit: default_unit(),
            box_size: default_small_size(),
            density_size: default_wide_size(),
            bar_size: default_small_size(),
            kde_points: default_kde_points(),
            font: None,
        }
    }
}

fn default_baseline_name() -> String {
    "SSH".to_string()
}

fn default_variant_name() -> String {
    "QUIC-SSH".to_string()
}

fn default_baseline_color() -> String {
    "#0000FF".to_string()
}

fn default_variant_color() -> String {
    "#FFA500".to_string()
}

fn default_unit() -> String {
    "ms".to_string()
}

fn default_small_size() -> [u32; 2] {
    [800, 600]
}

fn default_wide_size() -> [u32; 2] {
    [1000, 600]
}

fn default_kde_points() -> usize {
    crate::analysis::DEFAULT_GRID_POINTS
}

/// File name tags used by `--discover`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Tag of baseline files (`latency_<tag>_<size>`).
    #[serde(default = "default_baseline_tag")]
    pub baseline_tag: String,

    /// Tag of variant files.
    #[serde(default = "default_variant_tag")]
    pub variant_tag: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            baseline_tag: default_baseline_tag(),
            variant_tag: default_variant_tag(),
        }
    }
}

fn default_baseline_tag() -> String {
    "ssh".to_string()
}

fn default_variant_tag() -> String {
    "quicssh".to_string()
}

/// One comparison group: two input files rendered under one prefix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    /// Output file prefix, e.g. `latency_1MB`.
    pub prefix: String,

    /// Baseline sample file, relative to the input directory.
    pub baseline: PathBuf,

    /// Variant sample file, relative to the input directory.
    pub variant: PathBuf,

    /// Y-axis range of the additional zoomed box plot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clamp: Option<ClampRange>,
}

impl GroupSpec {
    /// Group for `latency_<baseline>_<size>` vs `latency_<variant>_<size>`.
    pub fn for_size(size: &str, clamp: Option<ClampRange>) -> Self {
        Self {
            prefix: format!("latency_{}", size),
            baseline: PathBuf::from(format!("latency_ssh_{}", size)),
            variant: PathBuf::from(format!("latency_quicssh_{}", size)),
            clamp,
        }
    }
}

fn default_groups() -> Vec<GroupSpec> {
    let one_mb_clamp = ClampRange::new(300.0, 600.0).ok();
    vec![
        GroupSpec::for_size("1KB", None),
        GroupSpec::for_size("1MB", one_mb_clamp),
        GroupSpec::for_size("5MB", None),
        GroupSpec::for_size("10MB", None),
    ]
}

/// Semantic problems in an otherwise well-formed configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid colour {0:?}: expected #RRGGBB")]
    InvalidColor(String),

    #[error("group prefix must not be empty")]
    EmptyPrefix,

    #[error("duplicate group prefix {0:?}")]
    DuplicatePrefix(String),

    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    #[error("chart sizes must be non-zero")]
    ZeroSize,

    #[error("kde_points must be at least 2")]
    TooFewKdePoints,
}

/// Parses `#RRGGBB` (the `#` is optional) into RGB components.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3], ConfigError> {
    let invalid = || ConfigError::InvalidColor(value.to_string());
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        parse_hex_color(&self.chart.baseline_color)?;
        parse_hex_color(&self.chart.variant_color)?;

        if self.general.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let sizes = [self.chart.box_size, self.chart.density_size, self.chart.bar_size];
        if sizes.iter().any(|[w, h]| *w == 0 || *h == 0) {
            return Err(ConfigError::ZeroSize);
        }

        if self.chart.kde_points < 2 {
            return Err(ConfigError::TooFewKdePoints);
        }

        let mut seen = HashSet::new();
        for group in &self.groups {
            if group.prefix.trim().is_empty() {
                return Err(ConfigError::EmptyPrefix);
            }
            if !seen.insert(group.prefix.as_str()) {
                return Err(ConfigError::DuplicatePrefix(group.prefix.clone()));
            }
        }

        Ok(())
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.input_dir {
            self.general.input_dir = dir.clone();
        }
        if let Some(ref dir) = args.output_dir {
            self.general.output_dir = dir.clone();
        }
        if let Some(concurrency) = args.concurrency {
            self.general.concurrency = concurrency;
        }

        if args.skip_invalid {
            self.loader.policy = ParsePolicy::SkipInvalid;
        }

        if let Some(ref font) = args.font {
            self.chart.font = Some(font.clone());
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Keep only the groups whose prefix was asked for.
    ///
    /// An empty filter keeps everything.
    pub fn retain_groups(&mut self, prefixes: &[String]) {
        if prefixes.is_empty() {
            return;
        }
        self.groups.retain(|g| prefixes.iter().any(|p| p == &g.prefix));
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.chart.baseline_name, "SSH");
        assert_eq!(config.chart.variant_name, "QUIC-SSH");
        assert_eq!(config.general.concurrency, 1);
        assert_eq!(config.loader.policy, ParsePolicy::AllOrNothing);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_groups() {
        let config = Config::default();
        let prefixes: Vec<_> = config.groups.iter().map(|g| g.prefix.as_str()).collect();
        assert_eq!(
            prefixes,
            vec!["latency_1KB", "latency_1MB", "latency_5MB", "latency_10MB"]
        );

        let one_mb = &config.groups[1];
        assert_eq!(one_mb.baseline, PathBuf::from("latency_ssh_1MB"));
        assert_eq!(one_mb.variant, PathBuf::from("latency_quicssh_1MB"));
        assert_eq!(one_mb.clamp, ClampRange::new(300.0, 600.0).ok());
        assert!(config.groups[0].clamp.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[general]
output_dir = "charts"
concurrency = 4

[loader]
policy = "skip-invalid"

[chart]
variant_name = "QUIC"
unit = "us"

[[groups]]
prefix = "small"
baseline = "a.txt"
variant = "b.txt"
clamp = [10.0, 20.0]
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.general.output_dir, PathBuf::from("charts"));
        assert_eq!(config.general.input_dir, PathBuf::from("."));
        assert_eq!(config.general.concurrency, 4);
        assert_eq!(config.loader.policy, ParsePolicy::SkipInvalid);
        assert_eq!(config.chart.variant_name, "QUIC");
        assert_eq!(config.chart.baseline_name, "SSH");
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].clamp, ClampRange::new(10.0, 20.0).ok());
    }

    #[test]
    fn test_parse_rejects_inverted_clamp() {
        let toml_content = r#"
[[groups]]
prefix = "bad"
baseline = "a"
variant = "b"
clamp = [600.0, 300.0]
"#;
        assert!(toml::from_str::<Config>(toml_content).is_err());
    }

    #[test]
    fn test_validate_duplicate_prefix() {
        let mut config = Config::default();
        config.groups.push(GroupSpec::for_size("1KB", None));
        assert_eq!(
            config.validate(),
            Err(ConfigError::DuplicatePrefix("latency_1KB".to_string()))
        );
    }

    #[test]
    fn test_validate_bad_color() {
        let mut config = Config::default();
        config.chart.variant_color = "orange".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#0000FF"), Ok([0, 0, 255]));
        assert_eq!(parse_hex_color("ffa500"), Ok([255, 165, 0]));
        assert!(parse_hex_color("#12345").is_err());
        assert!(parse_hex_color("#GG0000").is_err());
    }

    #[test]
    fn test_retain_groups() {
        let mut config = Config::default();
        config.retain_groups(&[]);
        assert_eq!(config.groups.len(), 4);

        config.retain_groups(&["latency_5MB".to_string()]);
        assert_eq!(config.groups.len(), 1);
        assert_eq!(config.groups[0].prefix, "latency_5MB");
    }

    #[test]
    fn test_default_toml_generation() {
        let toml_str = Config::default_toml();
        assert!(toml_str.contains("[general]"));
        assert!(toml_str.contains("[chart]"));
        assert!(toml_str.contains("[[groups]]"));

        let reparsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(reparsed.groups, Config::default().groups);
    }
}
