//! Markdown convention checks for docs and the README.

use crate::util::collect_files_recursive;
use anyhow::{bail, Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Headings the project README must carry.
pub const REQUIRED_README_HEADINGS: &[&str] = &[
    "## Development quick start",
    "## CLI usage",
    "## Coverage gate",
    "## Packaging templates",
    "## Fixtures",
    "## Troubleshooting & FAQ",
];

/// Snippets the project README must mention.
pub const REQUIRED_README_SNIPPETS: &[&str] = &[
    "Fixtures/manifest.json",
    "relgate coverage",
    "relgate fixtures",
    "relgate lint-docs",
    "--threshold",
    "LLVM_COV",
];

/// Expand file and directory arguments into the list of files to lint;
/// directories contribute their Markdown files in sorted order. An empty
/// argument list falls back to the README.
pub fn collect_markdown_paths(paths: &[PathBuf], readme: &Path) -> Result<Vec<PathBuf>> {
    let mut discovered = Vec::new();
    for raw in paths {
        if !raw.exists() {
            bail!("path does not exist: {}", raw.display());
        }
        if raw.is_dir() {
            let markdown = collect_files_recursive(raw)?
                .into_iter()
                .filter(|path| path.extension().is_some_and(|ext| ext == "md"));
            discovered.extend(markdown);
        } else {
            discovered.push(raw.clone());
        }
    }
    if discovered.is_empty() {
        discovered.push(readme.to_path_buf());
    }
    Ok(discovered)
}

pub fn lint_file(path: &Path, readme: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let mut failures = Vec::new();
    if text.contains('\r') {
        failures.push(format!(
            "{}: contains CR line endings; convert to LF",
            path.display()
        ));
    }
    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        if line.trim_end() != line {
            failures.push(format!(
                "{}:{line_no}: trailing whitespace detected",
                path.display()
            ));
        }
        if line.contains('\t') {
            failures.push(format!(
                "{}:{line_no}: tab character detected; use spaces",
                path.display()
            ));
        }
    }
    if is_readme(path, readme) {
        failures.extend(check_readme(&text, readme));
    }
    Ok(failures)
}

fn is_readme(path: &Path, readme: &Path) -> bool {
    match (fs::canonicalize(path), fs::canonicalize(readme)) {
        (Ok(lhs), Ok(rhs)) => lhs == rhs,
        _ => path == readme,
    }
}

pub fn check_readme(text: &str, readme: &Path) -> Vec<String> {
    let mut failures = Vec::new();
    for heading in REQUIRED_README_HEADINGS {
        if !text.contains(heading) {
            failures.push(format!(
                "{}: missing required heading '{heading}'",
                readme.display()
            ));
        }
    }
    for snippet in REQUIRED_README_SNIPPETS {
        if !text.contains(snippet) {
            failures.push(format!(
                "{}: missing required snippet '{snippet}'",
                readme.display()
            ));
        }
    }
    failures
}
