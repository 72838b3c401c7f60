//! Report assembly: charts, depth table, static assets and the index page.

use crate::data::DepthRecord;
use crate::error::{Result, SummaryError};
use crate::profile::{AbundanceRanking, SummaryStats};
use crate::report::assets::copy_assets;
use crate::report::chart::{render_histogram, render_rank_abundance, ChartFiles};
use crate::report::config::ReportConfig;
use crate::report::template::{render, ReportContext};
use crate::report::{DEPTH_TABLE_FILE, HISTOGRAM_STEM, INDEX_FILE, RANK_ABUNDANCE_STEM};
use log::info;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Files written by one [`ReportBuilder::build`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub index: PathBuf,
    pub resources: PathBuf,
    pub histogram: ChartFiles,
    pub rank_abundance: ChartFiles,
    pub depth_table: PathBuf,
    pub assets: Vec<PathBuf>,
}

/// Builds a static HTML report into an output directory.
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    config: ReportConfig,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self {
            config: ReportConfig::default(),
        }
    }
}

impl ReportBuilder {
    /// Create a builder, rejecting configurations that cannot produce a report.
    pub fn new(config: ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Write the report into `output_dir`.
    ///
    /// Artifacts are written in order: static assets, histogram, rank-abundance
    /// chart, depth table and finally `index.html`. A failure stops the build
    /// with [`SummaryError::OutputWrite`] naming the artifact; files written
    /// before it are left in place. The index is written atomically, so it is
    /// either complete or absent.
    pub fn build(
        &self,
        stats: &SummaryStats,
        depths: &DepthRecord,
        ranking: &AbundanceRanking,
        output_dir: &Path,
    ) -> Result<Report> {
        fs::create_dir_all(output_dir).map_err(|e| SummaryError::output_write(output_dir, e))?;
        let resources = output_dir.join(&self.config.resources_dir);
        fs::create_dir_all(&resources).map_err(|e| SummaryError::output_write(&resources, e))?;

        let assets = copy_assets(&resources)?;
        info!("copied {} static assets to {}", assets.len(), resources.display());

        let histogram = render_histogram(
            &depths.depths(),
            self.config.histogram_bins,
            &self.config.skin.histogram_color,
            self.config.chart_size,
            &resources.join(HISTOGRAM_STEM),
        )?;
        info!("wrote {}", histogram.png.display());

        let rank_abundance = render_rank_abundance(
            ranking,
            &self.config.skin.rank_abundance_color,
            self.config.chart_size,
            &resources.join(RANK_ABUNDANCE_STEM),
        )?;
        info!("wrote {}", rank_abundance.png.display());

        let depth_table = resources.join(DEPTH_TABLE_FILE);
        write_depth_table(depths, &depth_table)
            .map_err(|e| SummaryError::output_write(&depth_table, e))?;

        let html = render(&ReportContext::new(stats, depths, ranking, &self.config))?;
        let index = output_dir.join(INDEX_FILE);
        write_atomic(output_dir, &index, html.as_bytes())
            .map_err(|e| SummaryError::output_write(&index, e))?;
        info!("wrote {}", index.display());

        Ok(Report {
            index,
            resources,
            histogram,
            rank_abundance,
            depth_table,
            assets,
        })
    }
}

fn write_depth_table(depths: &DepthRecord, path: &Path) -> std::io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    writer.write_record(["sample_id", "depth"])?;
    for entry in depths.iter() {
        writer.write_record([entry.sample_id.as_str(), entry.depth.to_string().as_str()])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write through a temporary file in `dir`, then rename it into place.
fn write_atomic(dir: &Path, target: &Path, contents: &[u8]) -> std::io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
