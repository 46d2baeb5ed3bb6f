use std::path::PathBuf;

use chrono::{DateTime, Local};

/// Where and under which tag one run writes its artifacts.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// `YYYYmmdd_HHMMSS` stamp naming the archive directory.
    pub run_tag: String,
    pub root: PathBuf,
}

impl RunContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::at(root, Local::now())
    }

    pub fn at(root: impl Into<PathBuf>, started: DateTime<Local>) -> Self {
        Self {
            run_tag: started.format("%Y%m%d_%H%M%S").to_string(),
            root: root.into(),
        }
    }

    /// Latest copies, overwritten every run.
    pub fn tables_dir(&self) -> PathBuf {
        self.root.join("tables")
    }

    /// Per-run copies, never overwritten.
    pub fn archive_dir(&self) -> PathBuf {
        self.tables_dir().join(format!("run_{}", self.run_tag))
    }
}
