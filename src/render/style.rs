//! Resolved chart appearance and font setup.

use crate::config::{parse_hex_color, ChartConfig};
use anyhow::{anyhow, Context, Result};
use plotters::style::{register_font, FontStyle, RGBColor};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Family every chart asks plotters for.
pub const FONT_FAMILY: &str = "sans-serif";

/// Places a sans-serif TrueType font usually lives.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Registers a font for [`FONT_FAMILY`] once per process.
///
/// `preferred` is tried before the system locations, and only on the
/// first call. Returns whether chart text can be drawn.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match register_font_file(&path) {
                Ok(()) => {
                    info!("Using font {}", path.display());
                    return true;
                }
                Err(e) => debug!("Skipping font: {:#}", e),
            }
        }

        warn!("No usable font found; charts will be drawn without titles, labels or legends");
        false
    })
}

fn register_font_file(path: &Path) -> Result<()> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read font {}", path.display()))?;

    // plotters keeps registered font data for the life of the process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    register_font(FONT_FAMILY, FontStyle::Normal, bytes)
        .map_err(|_| anyhow!("{} is not a usable font", path.display()))
}

/// Everything a chart needs to know about how to look.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    pub baseline_name: String,
    pub variant_name: String,
    pub baseline_color: RGBColor,
    pub variant_color: RGBColor,
    /// Latency unit for axis labels.
    pub unit: String,
    pub box_size: (u32, u32),
    pub density_size: (u32, u32),
    pub bar_size: (u32, u32),
    pub kde_points: usize,
    /// Whether titles, labels and legends are drawn.
    pub text: bool,
}

fn to_rgb(value: &str) -> Result<RGBColor> {
    let [r, g, b] = parse_hex_color(value)?;
    Ok(RGBColor(r, g, b))
}

impl ChartStyle {
    /// Resolves colours and registers the chart font.
    pub fn from_config(config: &ChartConfig) -> Result<Self> {
        let text = ensure_font(config.font.as_deref());
        Ok(Self {
            baseline_name: config.baseline_name.clone(),
            variant_name: config.variant_name.clone(),
            baseline_color: to_rgb(&config.baseline_color)?,
            variant_color: to_rgb(&config.variant_color)?,
            unit: config.unit.clone(),
            box_size: (config.box_size[0], config.box_size[1]),
            density_size: (config.density_size[0], config.density_size[1]),
            bar_size: (config.bar_size[0], config.bar_size[1]),
            kde_points: config.kde_points,
            text,
        })
    }

    /// Category label for the slot at `x` (0 = baseline, 1 = variant).
    pub fn category_label(&self, x: f64) -> String {
        if (x - x.round()).abs() > 1e-6 {
            return String::new();
        }
        match x.round() as i64 {
            0 => self.baseline_name.clone(),
            1 => self.variant_name.clone(),
            _ => String::new(),
        }
    }

    /// `"<baseline> vs <variant>"`
    pub fn versus(&self) -> String {
        format!("{} vs {}", self.baseline_name, self.variant_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let style = ChartStyle::from_config(&ChartConfig::default()).unwrap();
        assert_eq!(style.baseline_color, RGBColor(0, 0, 255));
        assert_eq!(style.variant_color, RGBColor(255, 165, 0));
        assert_eq!(style.box_size, (800, 600));
        assert_eq!(style.density_size, (1000, 600));
        assert_eq!(style.versus(), "SSH vs QUIC-SSH");
    }

    #[test]
    fn test_category_label() {
        let style = ChartStyle::from_config(&ChartConfig::default()).unwrap();
        assert_eq!(style.category_label(0.0), "SSH");
        assert_eq!(style.category_label(1.0), "QUIC-SSH");
        assert_eq!(style.category_label(0.5), "");
        assert_eq!(style.category_label(2.0), "");
    }

    #[test]
    fn test_bad_color_is_rejected() {
        let config = ChartConfig {
            variant_color: "not-a-colour".to_string(),
            ..ChartConfig::default()
        };
        assert!(ChartStyle::from_config(&config).is_err());
    }
}
