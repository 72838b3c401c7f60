//! Report configuration.

use crate::error::{Result, SummaryError};
use crate::profile::DEFAULT_TOP_N;
use crate::report::chart::MAX_BINS;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a displayed value is cut down to its decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Drop extra digits (toward zero).
    Truncate,
    /// Round to nearest, halves away from zero.
    HalfAwayFromZero,
}

/// Most decimal places a statistic may be displayed with.
pub const MAX_DECIMALS: u32 = 10;

/// Display rounding for a single statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rounding {
    pub mode: RoundingMode,
    pub decimals: u32,
}

impl Rounding {
    pub const fn new(mode: RoundingMode, decimals: u32) -> Self {
        Self { mode, decimals }
    }

    /// Apply the rounding to a value.
    ///
    /// Truncation works on the shortest decimal form of `value`, so a value
    /// such as `0.29` keeps both digits instead of losing one to binary error.
    pub fn apply(&self, value: f64) -> f64 {
        match self.mode {
            RoundingMode::Truncate => truncate_decimal(value, self.decimals),
            RoundingMode::HalfAwayFromZero => {
                let factor = 10f64.powi(self.decimals as i32);
                (value * factor).round() / factor
            }
        }
    }

    /// Apply the rounding and format with exactly `decimals` places.
    pub fn format(&self, value: f64) -> String {
        let rounded = self.apply(value);
        // avoid printing "-0"
        let rounded = if rounded == 0.0 { 0.0 } else { rounded };
        format!("{:.*}", self.decimals as usize, rounded)
    }
}

fn truncate_decimal(value: f64, decimals: u32) -> f64 {
    let repr = value.to_string();
    let Some(dot) = repr.find('.') else {
        return value;
    };
    let end = if decimals == 0 {
        dot
    } else {
        (dot + 1 + decimals as usize).min(repr.len())
    };
    repr[..end].parse().unwrap_or(value)
}

/// Display rounding applied to each fractional statistic in the report.
///
/// The defaults show mean depth truncated to an integer, median rounded to
/// an integer, and standard deviation and density rounded to two places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundingPolicy {
    pub mean: Rounding,
    pub median: Rounding,
    pub stddev: Rounding,
    pub density: Rounding,
}

impl Default for RoundingPolicy {
    fn default() -> Self {
        Self {
            mean: Rounding::new(RoundingMode::Truncate, 0),
            median: Rounding::new(RoundingMode::HalfAwayFromZero, 0),
            stddev: Rounding::new(RoundingMode::HalfAwayFromZero, 2),
            density: Rounding::new(RoundingMode::HalfAwayFromZero, 2),
        }
    }
}

/// Colour scheme of the report page and charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Skin {
    /// Skin name, rendered as the `skin-<name>` body class.
    pub name: String,
    /// Header and accent colour (`#rrggbb`).
    pub accent: String,
    /// Histogram bar colour (`#rrggbb`).
    pub histogram_color: String,
    /// Rank-abundance line colour (`#rrggbb`).
    pub rank_abundance_color: String,
}

impl Default for Skin {
    fn default() -> Self {
        Self {
            name: "blue".to_string(),
            accent: "#3c8dbc".to_string(),
            histogram_color: "#3498db".to_string(),
            rank_abundance_color: "#c0392b".to_string(),
        }
    }
}

/// Pixel size of rendered charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSize {
    fn default() -> Self {
        Self {
            width: 900,
            height: 600,
        }
    }
}

/// Configuration for report generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Page title.
    pub title: String,
    /// Brand text shown in the navigation bar.
    pub brand: String,
    /// Name of the subdirectory holding charts and static assets.
    pub resources_dir: String,
    /// Number of features in the rank-abundance chart and table.
    pub top_n: usize,
    /// Histogram bin count; automatic when unset.
    pub histogram_bins: Option<usize>,
    pub chart_size: ChartSize,
    pub skin: Skin,
    pub rounding: RoundingPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: "OTU Table Summary".to_string(),
            brand: "OTU Summarizer".to_string(),
            resources_dir: "otu-summary-resources".to_string(),
            top_n: DEFAULT_TOP_N,
            histogram_bins: None,
            chart_size: ChartSize::default(),
            skin: Skin::default(),
            rounding: RoundingPolicy::default(),
        }
    }
}

impl ReportConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(SummaryError::from)
    }

    /// Check that every value can be used to build a report.
    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(SummaryError::InvalidParameter(
                "top_n must be greater than 0".to_string(),
            ));
        }
        if let Some(bins) = self.histogram_bins {
            if bins == 0 || bins > MAX_BINS {
                return Err(SummaryError::InvalidParameter(format!(
                    "histogram_bins must be between 1 and {}",
                    MAX_BINS
                )));
            }
        }
        if self.chart_size.width == 0 || self.chart_size.height == 0 {
            return Err(SummaryError::InvalidParameter(
                "chart_size must be non-zero".to_string(),
            ));
        }
        let dir = self.resources_dir.as_str();
        if dir.is_empty() || dir.starts_with('.') || !dir.chars().all(is_name_char) {
            return Err(SummaryError::InvalidParameter(format!(
                "resources_dir '{}' must be a plain directory name",
                dir
            )));
        }
        if self.skin.name.is_empty() || !self.skin.name.chars().all(is_name_char) {
            return Err(SummaryError::InvalidParameter(format!(
                "skin name '{}' may only contain letters, digits, '-', '_' and '.'",
                self.skin.name
            )));
        }
        let rounding = &self.rounding;
        for (name, r) in [
            ("mean", rounding.mean),
            ("median", rounding.median),
            ("stddev", rounding.stddev),
            ("density", rounding.density),
        ] {
            if r.decimals > MAX_DECIMALS {
                return Err(SummaryError::InvalidParameter(format!(
                    "rounding.{}.decimals must be at most {}",
                    name, MAX_DECIMALS
                )));
            }
        }
        for color in [
            &self.skin.accent,
            &self.skin.histogram_color,
            &self.skin.rank_abundance_color,
        ] {
            parse_hex_color(color)?;
        }
        Ok(())
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')
}

/// Parse a `#rrggbb` colour into its components.
pub fn parse_hex_color(color: &str) -> Result<(u8, u8, u8)> {
    let invalid = || SummaryError::InvalidParameter(format!("invalid colour '{}'", color));
    let hex = color.strip_prefix('#').ok_or_else(invalid)?;
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    Ok((channel(0)?, channel(2)?, channel(4)?))
}
