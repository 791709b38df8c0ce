//! Failure taxonomy for the coverage gate.
//!
//! Infrastructure failures (tooling, artifacts, export) and the expected
//! gate verdict share an exit status but not a message shape, so the gate
//! keeps a typed error enum instead of bare message strings.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("unable to locate llvm-cov; set LLVM_COV or add it to PATH")]
    ToolNotFound,

    #[error("unable to locate test binary for {bundle} under {}", .path.display())]
    BinaryNotFound { bundle: String, path: PathBuf },

    #[error("unable to disambiguate binary inside {}; candidates: {}", .bundle.display(), .candidates.join(", "))]
    AmbiguousBinary {
        bundle: PathBuf,
        candidates: Vec<String>,
    },

    #[error("coverage export failed with status {code}")]
    ExportFailed { code: i32, stderr: String },

    #[error("coverage export is not a summary report: {source}")]
    MalformedReport {
        #[source]
        source: serde_json::Error,
    },

    #[error("coverage below threshold for: {}", format_failing(.failing))]
    GateFailed { failing: Vec<(String, f64)> },
}

fn format_failing(failing: &[(String, f64)]) -> String {
    failing
        .iter()
        .map(|(name, percent)| format!("{name} ({percent:.2}%)"))
        .collect::<Vec<_>>()
        .join(", ")
}
