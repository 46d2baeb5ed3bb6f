use std::fs;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate};
use tracing::{debug, instrument, warn};

use super::types::{BugFixRecord, Field, RawRecord};
use super::RecordError;

/// Load a raw dataset from a CSV file with a header row.
///
/// Returns `RecordError::MissingInput` when the file does not exist so callers
/// can stop before producing any output.
#[instrument]
pub fn load_raw(path: &Path) -> Result<Vec<RawRecord>, RecordError> {
    if !path.exists() {
        return Err(RecordError::MissingInput(path.to_path_buf()));
    }
    let file = fs::File::open(path)?;
    let records = read_raw(file)?;
    debug!(rows = records.len(), "loaded raw dataset");
    Ok(records)
}

/// Read raw records from any CSV source. Rows that cannot be decoded at all
/// are skipped with a warning.
pub fn read_raw<R: Read>(reader: R) -> Result<Vec<RawRecord>, RecordError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in reader.deserialize::<RawRecord>().enumerate() {
        match row {
            Ok(record) => records.push(record),
            Err(err) if err.is_io_error() => return Err(err.into()),
            Err(err) => warn!(row = index + 1, error = %err, "skipping undecodable row"),
        }
    }
    Ok(records)
}

/// Write raw records as CSV with every cell quoted, creating parent directories.
#[instrument(skip(records), fields(rows = records.len()))]
pub fn write_raw(path: &Path, records: &[RawRecord]) -> Result<(), RecordError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), "wrote dataset");
    Ok(())
}

/// Convert raw rows into analysis records, dropping any row that lacks a field
/// the analysis needs (including a parseable creation date).
pub fn into_analysis_records(raw: &[RawRecord]) -> Vec<BugFixRecord> {
    let mut records = Vec::with_capacity(raw.len());
    let mut dropped = 0usize;

    for row in raw {
        match BugFixRecord::try_from(row) {
            Ok(record) if record.created_at.is_some() => records.push(record),
            Ok(record) => {
                dropped += 1;
                debug!(issue_id = record.issue_id, missing = %Field::CreatedAt, "dropping malformed row");
            }
            Err(field) => {
                dropped += 1;
                debug!(issue_id = ?row.issue_id, missing = %field, "dropping malformed row");
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, kept = records.len(), "dropped rows with missing analysis fields");
    }
    records
}

impl TryFrom<&RawRecord> for BugFixRecord {
    /// The first required field found missing.
    type Error = Field;

    fn try_from(raw: &RawRecord) -> Result<Self, Self::Error> {
        let duration_days = raw
            .duration_days
            .filter(|d| *d >= 0.0)
            .ok_or(Field::DurationDays)?;

        Ok(BugFixRecord {
            issue_id: raw.issue_id.ok_or(Field::IssueId)?,
            kind: raw.kind,
            title: raw.title.clone().ok_or(Field::Title)?,
            duration_days,
            comments_count: raw.comments_count.ok_or(Field::CommentsCount)?,
            fixer_login: raw.fixer_login.clone().ok_or(Field::FixerLogin)?,
            is_core_member: raw.is_core_member.ok_or(Field::IsCoreMember)?,
            created_at: raw.created_at.as_deref().and_then(parse_created_at),
        })
    }
}

/// Parse a creation timestamp down to its calendar date.
///
/// Accepts `YYYY-MM-DD`, RFC 3339, and `YYYY-MM-DD HH:MM:SS[+zz:zz]`.
pub fn parse_created_at(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(stamp) = DateTime::parse_from_rfc3339(raw) {
        return Some(stamp.date_naive());
    }
    let date_part = raw.get(..10)?;
    let rest = &raw[10..];
    if !(rest.is_empty() || rest.starts_with(' ') || rest.starts_with('T')) {
        return None;
    }
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Serde helpers that turn unparseable cells into `None` instead of failing the row.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::record::types::IssueKind;

    fn cell<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let value = Option::<String>::deserialize(d)?;
        Ok(value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty()))
    }

    pub fn text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        cell(d)
    }

    /// Whole numbers only, `3.0` included. A fractional cell such as `2.5` is
    /// treated as absent, so the zero-comments rule drops it even though it is
    /// positive; GitHub counts are always integers.
    pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        Ok(cell(d)?.and_then(|v| {
            v.parse::<u64>().ok().or_else(|| {
                v.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
                    .map(|f| f as u64)
            })
        }))
    }

    pub fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(cell(d)?.and_then(|v| v.parse::<f64>().ok().filter(|f| f.is_finite())))
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<Option<bool>, D::Error> {
        Ok(cell(d)?.and_then(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "1.0" | "true" => Some(true),
            "0" | "0.0" | "false" => Some(false),
            _ => None,
        }))
    }

    pub fn kind<'de, D: Deserializer<'de>>(d: D) -> Result<Option<IssueKind>, D::Error> {
        Ok(cell(d)?.and_then(|v| match v.to_ascii_lowercase().as_str() {
            "issue" => Some(IssueKind::Issue),
            "pr" | "pull request" => Some(IssueKind::Pr),
            _ => None,
        }))
    }

    pub fn serialize_flag<S: Serializer>(value: &Option<bool>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(true) => s.serialize_u8(1),
            Some(false) => s.serialize_u8(0),
            None => s.serialize_none(),
        }
    }
}
