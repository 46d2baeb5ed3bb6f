pub mod export;
pub mod types;

pub use types::RunContext;

use colored::Colorize;
use thiserror::Error;

use crate::analysis::{AnalysisOutput, Correlation, QuickStats, SummaryRow};
use crate::filter::{FilterRule, RemovalReport};
use crate::record::Field;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode CSV table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render a statistic for display; undefined values show as `NaN`.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

/// Render summary rows as a pipe-delimited Markdown table.
pub fn markdown_table(rows: &[SummaryRow]) -> String {
    let mut md = String::new();
    md.push_str(&format!("| {} |\n", SummaryRow::HEADERS.join(" | ")));
    md.push_str(&format!("| {} |\n", vec!["---"; SummaryRow::HEADERS.len()].join(" | ")));
    for row in rows {
        let mut cells = vec![row.group.to_string(), row.n.to_string()];
        cells.extend(row.values().iter().map(|v| format_stat(*v)));
        md.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    md
}

/// Print the per-rule removal counts of a filter pass.
pub fn print_removal_report(report: &RemovalReport) {
    println!();
    println!("{}", "═══ Filter Report ═══".bold());
    println!("Original rows: {}", report.original);
    for (i, rule) in FilterRule::ORDER.iter().enumerate() {
        println!("  {}. {} ({}): {} rows", i + 1, rule.label(), rule.key(), report.count(*rule));
    }
    println!("Total removed: {}", report.total_removed());
    println!("Retained: {}", report.retained.to_string().green().bold());
    println!("Removal rate: {:.1}%", report.removal_rate());
    println!();
}

/// Print the headline figures of a filtered dataset.
pub fn print_quick_stats(stats: &QuickStats) {
    println!("{}", "═══ Filtered Dataset ═══".bold());
    println!("Mean {}: {:.2}", Field::DurationDays.label(), stats.mean_duration);
    println!("Median {}: {:.2}", Field::DurationDays.label(), stats.median_duration);
    println!("Mean {}: {:.2}", Field::CommentsCount.label(), stats.mean_comments);
    println!("Core member share: {:.1}%", stats.core_share);
    println!(
        "{}: {} issues, {} PRs",
        Field::Kind.label(),
        stats.issues,
        stats.pull_requests
    );
    println!();
}

/// Print monthly series, summary table and correlation to the terminal.
pub fn print_analysis(output: &AnalysisOutput) {
    println!();
    println!("Records analysed: {}", output.records);
    println!();

    println!("{}", "═══ Monthly Statistics ═══".bold());
    if output.monthly.is_empty() {
        println!("  {}", "No month met the sample threshold.".yellow());
    } else {
        println!(
            "{:<8} {:>6} {:>5} {:>10} {:>10} {:>9} {:>6}",
            "month", "total", "core", "mean_dur", "median_dur", "mean_com", "ratio"
        );
        for row in &output.monthly {
            println!(
                "{:<8} {:>6} {:>5} {:>10.2} {:>10.2} {:>9.2} {:>6.2}",
                row.month.to_string(),
                row.total_fixes,
                row.core_fixes,
                row.mean_duration,
                row.median_duration,
                row.mean_comments,
                row.core_ratio
            );
        }
    }
    println!();

    println!("{}", "═══ Table 1: Descriptive Statistics ═══".bold());
    let rounded: Vec<SummaryRow> = output.summary.iter().map(SummaryRow::rounded).collect();
    print!("{}", markdown_table(&rounded));
    println!();

    println!("{}", "═══ Core Participation vs Mean Fix Duration ═══".bold());
    match output.correlation {
        Correlation::Defined { pearson, spearman } => {
            println!("Pearson r:  {}", colorize_coefficient(pearson));
            println!("Spearman ρ: {}", colorize_coefficient(spearman));
        }
        Correlation::Undefined(reason) => {
            println!("{} ({})", "Correlation undefined".yellow().bold(), reason);
        }
    }
    println!();
}

/// Strong relations stand out in the terminal.
fn colorize_coefficient(value: f64) -> colored::ColoredString {
    let text = format!("{value:.4}");
    if value.abs() >= 0.7 {
        text.red().bold()
    } else if value.abs() >= 0.3 {
        text.yellow().bold()
    } else {
        text.normal()
    }
}
