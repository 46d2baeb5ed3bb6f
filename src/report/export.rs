use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{debug, info, instrument};

use super::{markdown_table, ReportError, RunContext};
use crate::analysis::{AnalysisOutput, Correlation, MonthlyStatRow, SummaryRow};

pub const MONTHLY_CSV: &str = "monthly_stats.csv";
pub const SUMMARY_CSV: &str = "table1_summary.csv";
pub const SUMMARY_MD: &str = "table1_summary.md";
pub const CORRELATION_JSON: &str = "correlation.json";

/// Write every table of an analysis run, as a latest copy and an archived copy.
/// Returns the latest-copy paths.
#[instrument(skip(output), fields(run = %ctx.run_tag))]
pub fn export(output: &AnalysisOutput, ctx: &RunContext) -> Result<Vec<PathBuf>, ReportError> {
    fs::create_dir_all(ctx.archive_dir())?;

    let rounded: Vec<SummaryRow> = output.summary.iter().map(SummaryRow::rounded).collect();
    let artifacts = [
        (MONTHLY_CSV, monthly_csv(&output.monthly)?),
        (SUMMARY_CSV, csv_bytes(&rounded)?),
        (SUMMARY_MD, markdown_table(&rounded).into_bytes()),
        (CORRELATION_JSON, correlation_json(&output.correlation, output.monthly.len())?),
    ];

    let mut written = Vec::with_capacity(artifacts.len());
    for (name, bytes) in artifacts {
        let latest = ctx.tables_dir().join(name);
        let archive = ctx.archive_dir().join(name);
        fs::write(&latest, &bytes)?;
        fs::write(&archive, &bytes)?;
        debug!(latest = %latest.display(), archive = %archive.display(), "saved table");
        written.push(latest);
    }

    info!(files = written.len(), archive = %ctx.archive_dir().display(), "exported tables");
    Ok(written)
}

fn monthly_csv(rows: &[MonthlyStatRow]) -> Result<Vec<u8>, ReportError> {
    if rows.is_empty() {
        // serde-driven headers need at least one row
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([
            "month",
            "total_fixes",
            "core_fixes",
            "mean_duration",
            "median_duration",
            "mean_comments",
            "core_ratio",
        ])?;
        return finish(writer);
    }
    csv_bytes(rows)
}

fn csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>, ReportError> {
    writer
        .into_inner()
        .map_err(|err| ReportError::Io(err.into_error()))
}

fn correlation_json(correlation: &Correlation, monthly_points: usize) -> Result<Vec<u8>, ReportError> {
    let undefined_reason = match correlation {
        Correlation::Defined { .. } => None,
        Correlation::Undefined(reason) => Some(reason.to_string()),
    };
    let value = serde_json::json!({
        "monthly_points": monthly_points,
        "pearson": correlation.pearson(),
        "spearman": correlation.spearman(),
        "undefined_reason": undefined_reason,
    });
    Ok(serde_json::to_vec_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::run_all;
    use crate::analysis::tests::record_on;

    fn output() -> AnalysisOutput {
        let records = vec![
            record_on("2023-01-10", true, 1.0, 2),
            record_on("2023-02-10", false, 8.0, 4),
            record_on("2023-03-10", true, 2.0, 3),
            record_on("2023-03-11", false, 6.0, 1),
        ];
        run_all(&records, 0)
    }

    #[test]
    fn test_export_writes_latest_and_archive() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let written = export(&output(), &ctx).unwrap();

        assert_eq!(written.len(), 4);
        for name in [MONTHLY_CSV, SUMMARY_CSV, SUMMARY_MD, CORRELATION_JSON] {
            assert!(ctx.tables_dir().join(name).exists(), "missing latest {name}");
            assert!(ctx.archive_dir().join(name).exists(), "missing archive {name}");
        }

        let monthly = fs::read_to_string(ctx.tables_dir().join(MONTHLY_CSV)).unwrap();
        let mut lines = monthly.lines();
        assert_eq!(
            lines.next(),
            Some("month,total_fixes,core_fixes,mean_duration,median_duration,mean_comments,core_ratio")
        );
        assert!(lines.next().unwrap().starts_with("2023-01,1,1,"));

        let summary = fs::read_to_string(ctx.tables_dir().join(SUMMARY_CSV)).unwrap();
        assert!(summary.starts_with("Group,N,Duration_mean,Duration_median,Duration_Q1,Duration_Q3,"));
        assert!(summary.contains("Community Contributor,2,7.0,"));
        assert!(summary.contains("Overall,4,"));
    }

    #[test]
    fn test_export_with_no_months() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = RunContext::new(dir.path());
        let empty = run_all(&[], 10);
        export(&empty, &ctx).unwrap();

        let monthly = fs::read_to_string(ctx.tables_dir().join(MONTHLY_CSV)).unwrap();
        assert_eq!(monthly.lines().count(), 1);

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(ctx.tables_dir().join(CORRELATION_JSON)).unwrap()).unwrap();
        assert_eq!(json["monthly_points"], 0);
        assert!(json["pearson"].is_null());
        assert!(json["undefined_reason"].as_str().unwrap().contains("at least 3"));

        let summary = fs::read_to_string(ctx.tables_dir().join(SUMMARY_CSV)).unwrap();
        assert!(summary.contains("Core Member,0,NaN"));
    }

    #[test]
    fn test_correlation_json_defined() {
        let bytes = correlation_json(
            &Correlation::Defined {
                pearson: -0.5,
                spearman: -0.4,
            },
            7,
        )
        .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["pearson"], -0.5);
        assert_eq!(json["spearman"], -0.4);
        assert!(json["undefined_reason"].is_null());
    }
}
