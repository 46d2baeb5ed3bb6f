mod analysis;
mod collect;
mod config;
mod filter;
mod record;
mod report;

use clap::{Parser, Subcommand};
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn};
use tracing_subscriber::EnvFilter;

use collect::{FixtureSource, GitHubIssueSource, RecordSource};
use record::{dataset, RawRecord};

const DEFAULT_RAW: &str = "data/bugs_raw.csv";
const DEFAULT_FILTERED: &str = "data/bugs_filtered.csv";

/// bugfix-stats — collects closed bug reports from a GitHub repository and
/// compares how core members and community contributors fix them.
#[derive(Parser, Debug)]
#[command(name = "bugfix-stats", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect closed bug issues into a raw CSV dataset
    Collect {
        /// Repository as owner/repo or a github.com URL (defaults to config)
        repo: Option<String>,

        #[arg(short, long, default_value = DEFAULT_RAW)]
        output: PathBuf,

        /// Maximum number of records to collect
        #[arg(long)]
        limit: Option<usize>,

        /// Use the bundled sample dataset instead of the GitHub API
        #[arg(long)]
        sample: bool,
    },

    /// Remove test fixtures, automation PRs and incomplete rows
    Filter {
        #[arg(default_value = DEFAULT_RAW)]
        input: PathBuf,

        #[arg(short, long, default_value = DEFAULT_FILTERED)]
        output: PathBuf,
    },

    /// Compute monthly statistics, the summary table and correlations
    Analyze {
        #[arg(default_value = DEFAULT_FILTERED)]
        input: PathBuf,

        /// Drop months with fewer fixes than this (0 or 1 keeps every month)
        #[arg(long)]
        min_fixes: Option<usize>,

        /// Root directory for exported tables
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Filter and analyze the bundled sample dataset (no input file needed)
        #[arg(long)]
        sample: bool,
    },

    /// Collect, filter and analyze in one go
    Run {
        repo: Option<String>,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        min_fixes: Option<usize>,

        #[arg(long)]
        out_dir: Option<PathBuf>,

        #[arg(long)]
        sample: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;

    match cli.command {
        Command::Collect {
            repo,
            output,
            limit,
            sample,
        } => {
            let source = build_source(repo.as_deref(), sample, &config)?;
            let raw = collect_records(source.as_ref(), limit.unwrap_or(config.github.max_records)).await?;
            dataset::write_raw(&output, &raw)?;
            info!(rows = raw.len(), path = %output.display(), "saved raw dataset");
        }
        Command::Filter { input, output } => {
            let raw = dataset::load_raw(&input)?;
            filter_step(&raw, &config, Some(&output))?;
        }
        Command::Analyze {
            input,
            min_fixes,
            out_dir,
            sample,
        } => {
            let filtered = if sample {
                let raw = collect_records(&FixtureSource::sample(), usize::MAX).await?;
                filter_step(&raw, &config, None)?
            } else {
                dataset::load_raw(&input)?
            };
            analyze_step(&filtered, &config, min_fixes, out_dir)?;
        }
        Command::Run {
            repo,
            limit,
            min_fixes,
            out_dir,
            sample,
        } => {
            let source = build_source(repo.as_deref(), sample, &config)?;
            let raw = collect_records(source.as_ref(), limit.unwrap_or(config.github.max_records)).await?;
            dataset::write_raw(Path::new(DEFAULT_RAW), &raw)?;
            let filtered = filter_step(&raw, &config, Some(Path::new(DEFAULT_FILTERED)))?;
            analyze_step(&filtered, &config, min_fixes, out_dir)?;
        }
    }

    info!("done");
    Ok(())
}

fn build_source(repo: Option<&str>, sample: bool, config: &config::Config) -> Result<Box<dyn RecordSource>, Box<dyn Error>> {
    if sample {
        info!("using bundled sample dataset");
        return Ok(Box::new(FixtureSource::sample()));
    }
    let slug = record::parse_repo_slug(repo.unwrap_or(&config.github.repo))?;
    let source = GitHubIssueSource::new(
        slug,
        config.github_token(),
        config.github.labels.clone(),
        config.github.core_top_n,
    )?;
    Ok(Box::new(source))
}

async fn collect_records(source: &dyn RecordSource, limit: usize) -> Result<Vec<RawRecord>, Box<dyn Error>> {
    info!(source = source.name(), limit, "collecting records");
    let collected = source.collect(limit).await?;
    if collected.interrupted {
        warn!(records = collected.records.len(), "collection incomplete, continuing with partial results");
    }
    Ok(collected.records)
}

fn filter_step(raw: &[RawRecord], config: &config::Config, output: Option<&Path>) -> Result<Vec<RawRecord>, Box<dyn Error>> {
    let _span = info_span!("filter", rows = raw.len()).entered();
    let outcome = filter::filter(raw, &config.filter);
    report::print_removal_report(&outcome.report);

    let records = dataset::into_analysis_records(&outcome.records);
    report::print_quick_stats(&analysis::QuickStats::compute(&records));

    if let Some(path) = output {
        dataset::write_raw(path, &outcome.records)?;
        info!(path = %path.display(), "saved filtered dataset");
    }
    Ok(outcome.records)
}

fn analyze_step(
    filtered: &[RawRecord],
    config: &config::Config,
    min_fixes: Option<usize>,
    out_dir: Option<PathBuf>,
) -> Result<(), Box<dyn Error>> {
    let _span = info_span!("analyze", rows = filtered.len()).entered();
    let records = dataset::into_analysis_records(filtered);
    info!(records = records.len(), "data loaded");

    let min_fixes = min_fixes.unwrap_or(config.analysis.min_fixes_per_month);
    let output = analysis::run_all(&records, min_fixes);
    report::print_analysis(&output);

    let ctx = report::RunContext::new(out_dir.unwrap_or_else(|| config.output.root.clone()));
    let written = report::export::export(&output, &ctx)?;
    for path in &written {
        info!(path = %path.display(), "saved");
    }
    Ok(())
}
