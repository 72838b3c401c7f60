//! HTML assembly by template substitution.

use crate::data::{DepthRecord, SampleDepth};
use crate::error::Result;
use crate::profile::{AbundanceRanking, SummaryStats};
use crate::report::assets::stylesheet_hrefs;
use crate::report::config::{ReportConfig, Skin};
use crate::report::{DEPTH_TABLE_FILE, HISTOGRAM_STEM, RANK_ABUNDANCE_STEM};
use serde::Serialize;
use tera::{Context, Tera};

const INDEX_TEMPLATE: &str = include_str!("templates/index.html.tera");

/// Summary statistics formatted for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayStats {
    pub sample_count: usize,
    pub feature_count: usize,
    pub total_count: u64,
    pub mean: String,
    pub median: String,
    pub range: String,
    pub stddev: String,
    pub density: String,
}

impl DisplayStats {
    /// Format every statistic with the configured rounding policy.
    pub fn new(stats: &SummaryStats, config: &ReportConfig) -> Self {
        let rounding = &config.rounding;
        Self {
            sample_count: stats.sample_count,
            feature_count: stats.feature_count,
            total_count: stats.total_count,
            mean: rounding.mean.format(stats.mean_depth),
            median: rounding.median.format(stats.median_depth),
            range: format!("{}-{}", stats.min_depth, stats.max_depth),
            stddev: rounding.stddev.format(stats.stddev_depth),
            density: format!("{}%", rounding.density.format(stats.density_percent)),
        }
    }
}

/// Chart locations relative to the report index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartLinks {
    pub histogram_png: String,
    pub histogram_svg: String,
    pub histogram_pdf: String,
    pub rank_abundance_png: String,
    pub rank_abundance_svg: String,
    pub rank_abundance_pdf: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow<'a> {
    pub rank: usize,
    pub feature_id: &'a str,
    pub percent: String,
}

/// Everything substituted into the report template.
#[derive(Debug, Clone, Serialize)]
pub struct ReportContext<'a> {
    pub version: &'static str,
    pub title: &'a str,
    pub brand: &'a str,
    pub skin: &'a Skin,
    pub stylesheets: Vec<String>,
    pub stats: DisplayStats,
    pub charts: ChartLinks,
    pub depth_table: String,
    pub depths: &'a [SampleDepth],
    pub ranking: Vec<RankRow<'a>>,
}

impl<'a> ReportContext<'a> {
    pub fn new(
        stats: &SummaryStats,
        depths: &'a DepthRecord,
        ranking: &'a AbundanceRanking,
        config: &'a ReportConfig,
    ) -> Self {
        let res = config.resources_dir.as_str();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            title: &config.title,
            brand: &config.brand,
            skin: &config.skin,
            stylesheets: stylesheet_hrefs(res),
            stats: DisplayStats::new(stats, config),
            charts: ChartLinks {
                histogram_png: format!("{}/{}.png", res, HISTOGRAM_STEM),
                histogram_svg: format!("{}/{}.svg", res, HISTOGRAM_STEM),
                histogram_pdf: format!("{}/{}.pdf", res, HISTOGRAM_STEM),
                rank_abundance_png: format!("{}/{}.png", res, RANK_ABUNDANCE_STEM),
                rank_abundance_svg: format!("{}/{}.svg", res, RANK_ABUNDANCE_STEM),
                rank_abundance_pdf: format!("{}/{}.pdf", res, RANK_ABUNDANCE_STEM),
            },
            depth_table: format!("{}/{}", res, DEPTH_TABLE_FILE),
            depths: depths.entries(),
            ranking: ranking
                .entries
                .iter()
                .map(|e| RankRow {
                    rank: e.rank,
                    feature_id: &e.feature_id,
                    percent: format!("{:.3}%", e.relative_abundance * 100.0),
                })
                .collect(),
        }
    }
}

/// Render the report page.
pub fn render(context: &ReportContext<'_>) -> Result<String> {
    let mut tera = Tera::default();
    tera.add_raw_template("index.html", INDEX_TEMPLATE)?;
    let ctx = Context::from_serialize(context)?;
    Ok(tera.render("index.html", &ctx)?)
}
