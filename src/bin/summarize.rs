//! otu-summarize - OTU table summary CLI
//!
//! Command-line interface for summarizing OTU/feature count tables.

use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use otu_summarizer::data::CountMatrix;
use otu_summarizer::error::Result;
use otu_summarizer::pipeline::{profile_table, summarize_table};
use otu_summarizer::report::ReportConfig;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Summarize OTU/feature count tables
#[derive(Parser)]
#[command(name = "otu-summarize")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a static HTML summary report for a count table
    Summarize {
        /// Path to count table (TSV, or BIOM 1.0 JSON with .biom/.json extension)
        #[arg(short, long)]
        table: PathBuf,

        /// Output directory for the report
        #[arg(short, long)]
        output: PathBuf,

        /// Path to report configuration YAML
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Number of features in the rank-abundance plot (overrides config)
        #[arg(long)]
        top_n: Option<usize>,
    },

    /// Print summary statistics without writing a report
    Profile {
        /// Path to count table
        #[arg(short, long)]
        table: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Number of ranked features to print
        #[arg(long, default_value = "30")]
        top_n: usize,
    },

    /// Write the default report configuration
    ExampleConfig {
        /// Output path for the example YAML
        #[arg(short, long, default_value = "report.yaml")]
        output: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Summarize {
            table,
            output,
            config,
            top_n,
        } => cmd_summarize(&table, &output, config.as_ref(), top_n),

        Commands::Profile {
            table,
            format,
            top_n,
        } => cmd_profile(&table, format, top_n),

        Commands::ExampleConfig { output } => cmd_example_config(&output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Build the report
fn cmd_summarize(
    table_path: &PathBuf,
    output_dir: &PathBuf,
    config_path: Option<&PathBuf>,
    top_n: Option<usize>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => {
            info!("Loading report configuration from {:?}", path);
            ReportConfig::from_file(path)?
        }
        None => ReportConfig::default(),
    };
    if let Some(n) = top_n {
        config.top_n = n;
    }

    info!("Loading count table from {:?}", table_path);
    let counts = CountMatrix::load(table_path)?;
    info!(
        "Loaded {} features x {} samples",
        counts.n_features(),
        counts.n_samples()
    );

    let report = summarize_table(output_dir, &counts, &config)?;
    info!("Done! Report written to {:?}", report.index);
    Ok(())
}

/// Print statistics and ranking
fn cmd_profile(table_path: &PathBuf, format: OutputFormat, top_n: usize) -> Result<()> {
    info!("Loading count table from {:?}", table_path);
    let counts = CountMatrix::load(table_path)?;
    let profile = profile_table(&counts, top_n)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profile)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&profile)?),
        OutputFormat::Text => {
            print!("{}", profile.stats);
            println!();
            print!("{}", profile.ranking);
        }
    }

    Ok(())
}

/// Write the default configuration
fn cmd_example_config(output_path: &PathBuf) -> Result<()> {
    let yaml = ReportConfig::default().to_yaml()?;
    std::fs::write(output_path, yaml)?;
    info!("Example configuration written to {:?}", output_path);
    Ok(())
}
