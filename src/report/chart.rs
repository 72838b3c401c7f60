//! Chart rendering for the sampling-depth histogram and rank-abundance plot.
//!
//! Every chart is drawn twice from the same data: once to PNG and once to
//! SVG as a scalable copy. The SVG is then converted to a PDF.

use crate::error::{Result, SummaryError};
use crate::profile::AbundanceRanking;
use crate::report::config::{parse_hex_color, ChartSize};
use log::debug;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use usvg::{fontdb, PostProcessingSteps, TreeParsing, TreePostProc};

/// Upper bound on the automatic histogram bin count.
const MAX_AUTO_BINS: usize = 50;

/// Upper bound on any histogram bin count, including a fixed one.
pub const MAX_BINS: usize = 1000;

/// Bitmap text needs a font backend. Without one the PNG is drawn with no
/// label areas, so no text is rendered, and the SVG copy carries the labels.
const PNG_TEXT: bool = cfg!(feature = "ttf");

/// One histogram bar: `[lower, upper)` with the number of samples inside.
///
/// The last bin is closed on the right so the maximum depth is counted.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// PNG, SVG and PDF renderings of one chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartFiles {
    pub png: PathBuf,
    pub svg: PathBuf,
    pub pdf: PathBuf,
}

/// Bin sampling depths for the histogram.
///
/// `bins` fixes the bin count, capped at [`MAX_BINS`]. When unset the
/// Freedman-Diaconis rule is used, falling back to Sturges' rule when the
/// interquartile range is zero, and the result is capped at 50 bins.
pub fn histogram_bins(depths: &[u64], bins: Option<usize>) -> Vec<HistogramBin> {
    if depths.is_empty() {
        return vec![];
    }
    let mut sorted: Vec<f64> = depths.iter().map(|&d| d as f64).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];

    if min == max {
        return vec![HistogramBin {
            lower: min - 0.5,
            upper: max + 0.5,
            count: sorted.len(),
        }];
    }

    let n_bins = bins
        .unwrap_or_else(|| auto_bin_count(&sorted))
        .clamp(1, MAX_BINS);
    let width = (max - min) / n_bins as f64;
    let mut result: Vec<HistogramBin> = (0..n_bins)
        .map(|i| HistogramBin {
            lower: min + i as f64 * width,
            upper: if i + 1 == n_bins {
                max
            } else {
                min + (i + 1) as f64 * width
            },
            count: 0,
        })
        .collect();

    for &v in &sorted {
        let idx = (((v - min) / width).floor() as usize).min(n_bins - 1);
        result[idx].count += 1;
    }
    result
}

fn auto_bin_count(sorted: &[f64]) -> usize {
    let n = sorted.len() as f64;
    let range = sorted[sorted.len() - 1] - sorted[0];
    let iqr = quantile(sorted, 0.75) - quantile(sorted, 0.25);
    let count = if iqr > 0.0 {
        let h = 2.0 * iqr / n.cbrt();
        (range / h).ceil() as usize
    } else {
        n.log2().ceil() as usize + 1
    };
    count.clamp(1, MAX_AUTO_BINS)
}

/// Linear-interpolated quantile of sorted values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Render the sampling-depth histogram with a rug of per-sample ticks.
pub fn render_histogram(
    depths: &[u64],
    bins: Option<usize>,
    color: &str,
    size: ChartSize,
    stem: &Path,
) -> Result<ChartFiles> {
    let color = rgb(color)?;
    let histogram = histogram_bins(depths, bins);
    debug!("histogram with {} bins over {} samples", histogram.len(), depths.len());

    let files = chart_files(stem);
    let dims = (size.width, size.height);

    let root = BitMapBackend::new(&files.png, dims).into_drawing_area();
    draw_histogram(&root, &histogram, depths, color, PNG_TEXT)
        .map_err(|e| plot_error(&files.png, e))?;
    drop(root);

    let root = SVGBackend::new(&files.svg, dims).into_drawing_area();
    draw_histogram(&root, &histogram, depths, color, true)
        .map_err(|e| plot_error(&files.svg, e))?;
    drop(root);

    write_pdf(&files.svg, &files.pdf)?;

    Ok(files)
}

/// Render relative abundance against rank on a logarithmic y-axis.
///
/// Features with zero abundance cannot be placed on a log axis and are skipped.
pub fn render_rank_abundance(
    ranking: &AbundanceRanking,
    color: &str,
    size: ChartSize,
    stem: &Path,
) -> Result<ChartFiles> {
    let color = rgb(color)?;
    let points: Vec<(f64, f64)> = ranking
        .entries
        .iter()
        .filter(|e| e.relative_abundance > 0.0)
        .map(|e| (e.rank as f64, e.relative_abundance))
        .collect();

    let files = chart_files(stem);
    let dims = (size.width, size.height);

    let root = BitMapBackend::new(&files.png, dims).into_drawing_area();
    draw_rank_abundance(&root, &points, color, PNG_TEXT)
        .map_err(|e| plot_error(&files.png, e))?;
    drop(root);

    let root = SVGBackend::new(&files.svg, dims).into_drawing_area();
    draw_rank_abundance(&root, &points, color, true)
        .map_err(|e| plot_error(&files.svg, e))?;
    drop(root);

    write_pdf(&files.svg, &files.pdf)?;

    Ok(files)
}

fn draw_histogram<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    bins: &[HistogramBin],
    depths: &[u64],
    color: RGBColor,
    text: bool,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = match (bins.first(), bins.last()) {
        (Some(first), Some(last)) => (first.lower, last.upper),
        _ => (0.0, 1.0),
    };
    let max_count = bins.iter().map(|b| b.count).max().unwrap_or(0).max(1);
    let y_hi = max_count as f64 * 1.1;
    let count_label = |v: &f64| format!("{:.0}", v);

    let mut builder = ChartBuilder::on(root);
    builder.margin(15);
    if text {
        builder
            .caption("Sampling Depth Histogram", ("sans-serif", 24))
            .x_label_area_size(45)
            .y_label_area_size(55);
    }
    let mut chart = builder.build_cartesian_2d(x_lo..x_hi, 0f64..y_hi)?;

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh();
    if text {
        mesh.x_desc("Sampling depths")
            .y_desc("Frequency")
            .x_label_formatter(&count_label)
            .y_label_formatter(&count_label);
    }
    mesh.draw()?;

    chart.draw_series(bins.iter().map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], color.filled())
    }))?;
    chart.draw_series(bins.iter().filter(|b| b.count > 0).map(|b| {
        Rectangle::new([(b.lower, 0.0), (b.upper, b.count as f64)], WHITE.stroke_width(1))
    }))?;

    let rug_height = y_hi * 0.04;
    chart.draw_series(depths.iter().map(|&d| {
        PathElement::new(vec![(d as f64, 0.0), (d as f64, rug_height)], BLACK.mix(0.7))
    }))?;

    root.present()?;
    Ok(())
}

fn draw_rank_abundance<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[(f64, f64)],
    color: RGBColor,
    text: bool,
) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    let n = points.len().max(1) as f64;
    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| {
            (lo.min(y), hi.max(y))
        });
    let (y_lo, y_hi) = if points.is_empty() {
        (1e-4, 1.0)
    } else {
        (lo / 2.0, (hi * 2.0).min(1.0).max(lo))
    };
    let rank_label = |v: &f64| format!("{:.0}", v);
    let abundance_label = |v: &f64| format!("{:.0e}", v);

    let mut builder = ChartBuilder::on(root);
    builder.margin(15);
    if text {
        builder
            .caption("OTU Rank Abundance", ("sans-serif", 24))
            .x_label_area_size(45)
            .y_label_area_size(70);
    }
    let mut chart =
        builder.build_cartesian_2d(0.5f64..(n + 0.5), (y_lo..y_hi).log_scale())?;

    let mut mesh = chart.configure_mesh();
    if text {
        mesh.x_desc("Rank")
            .y_desc("Relative abundance")
            .x_label_formatter(&rank_label)
            .y_label_formatter(&abundance_label);
    }
    mesh.draw()?;

    chart.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?;
    chart.draw_series(points.iter().map(|&p| Circle::new(p, 4, color.filled())))?;

    root.present()?;
    Ok(())
}

fn chart_files(stem: &Path) -> ChartFiles {
    ChartFiles {
        png: stem.with_extension("png"),
        svg: stem.with_extension("svg"),
        pdf: stem.with_extension("pdf"),
    }
}

/// System fonts used to outline chart text in PDFs, loaded once per process.
fn font_database() -> &'static fontdb::Database {
    static FONTS: OnceLock<fontdb::Database> = OnceLock::new();
    FONTS.get_or_init(|| {
        let mut db = fontdb::Database::new();
        db.load_system_fonts();
        debug!("loaded {} font faces for PDF text", db.len());
        db
    })
}

/// Convert a rendered SVG chart into a single-page PDF.
///
/// Text is outlined with system fonts; with none installed the PDF keeps
/// the plot marks and drops the labels.
fn write_pdf(svg: &Path, pdf: &Path) -> Result<()> {
    let source = fs::read_to_string(svg).map_err(|e| SummaryError::output_write(pdf, e))?;
    let mut tree = usvg::Tree::from_str(&source, &usvg::Options::default()).map_err(|e| {
        SummaryError::output_write(pdf, std::io::Error::other(e.to_string()))
    })?;
    tree.postprocess(PostProcessingSteps::default(), font_database());
    let bytes = svg2pdf::convert_tree(&tree, svg2pdf::Options::default());
    fs::write(pdf, bytes).map_err(|e| SummaryError::output_write(pdf, e))
}

fn rgb(color: &str) -> Result<RGBColor> {
    let (r, g, b) = parse_hex_color(color)?;
    Ok(RGBColor(r, g, b))
}

fn plot_error<E: std::error::Error + Send + Sync>(
    artifact: &Path,
    err: DrawingAreaErrorKind<E>,
) -> SummaryError {
    SummaryError::output_write(artifact, std::io::Error::other(err.to_string()))
}
