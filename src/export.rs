//! Coverage export via the resolved llvm-cov tool.
//!
//! One subprocess, fully buffered, no retries: a failed export cannot be
//! fixed by re-running the instrumentation tool against the same data.

use crate::error::GateError;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Summary-only export payload as emitted by `llvm-cov export`.
#[derive(Deserialize, Debug)]
pub struct ExportReport {
    #[serde(default)]
    pub data: Vec<ExportDataset>,
}

#[derive(Deserialize, Debug)]
pub struct ExportDataset {
    #[serde(default)]
    pub files: Vec<FileRecord>,
}

/// Per-file line counters; consumed once during aggregation.
#[derive(Deserialize, Debug)]
pub struct FileRecord {
    #[serde(default)]
    pub filename: PathBuf,
    #[serde(default)]
    pub summary: FileSummary,
}

#[derive(Deserialize, Debug, Default)]
pub struct FileSummary {
    #[serde(default)]
    pub lines: LineSummary,
}

#[derive(Deserialize, Debug, Default)]
pub struct LineSummary {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub covered: u64,
}

impl ExportReport {
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> {
        self.data.iter().flat_map(|dataset| dataset.files.iter())
    }
}

pub fn export(tool: &Path, profdata: &Path, binary: &Path) -> Result<ExportReport> {
    let output = Command::new(tool)
        .arg("export")
        .arg("-summary-only")
        .arg("-instr-profile")
        .arg(profdata)
        .arg(binary)
        .output()
        .with_context(|| format!("spawn {}", tool.display()))?;

    if !output.status.success() {
        return Err(GateError::ExportFailed {
            code: output.status.code().unwrap_or(-1),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
        .into());
    }

    decode(&output.stdout)
}

fn decode(stdout: &[u8]) -> Result<ExportReport> {
    serde_json::from_slice(stdout)
        .map_err(|source| GateError::MalformedReport { source }.into())
}
