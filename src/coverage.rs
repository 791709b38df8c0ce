//! Target attribution and per-target line totals.
//!
//! Each exported file record is attributed to at most one configured
//! target: the first one, in declaration order, whose path prefix matches
//! the record's repository-relative path. Records outside the repository
//! belong to dependencies and are skipped without comment.

use crate::export::ExportReport;
use anyhow::{bail, Result};
use std::path::{Component, Path, PathBuf};

/// A logical component gated independently, declared as `name=path-prefix`.
pub struct TargetSpec {
    pub name: String,
    pub prefix: PathBuf,
}

pub fn default_targets() -> Vec<TargetSpec> {
    vec![
        TargetSpec {
            name: "lib".to_string(),
            prefix: PathBuf::from("src/lib"),
        },
        TargetSpec {
            name: "bin".to_string(),
            prefix: PathBuf::from("src/bin"),
        },
    ]
}

pub fn parse_target_specs(values: &[String]) -> Result<Vec<TargetSpec>> {
    let mut targets: Vec<TargetSpec> = Vec::with_capacity(values.len());
    for value in values {
        let Some((name, prefix)) = value.split_once('=') else {
            bail!("invalid --target value '{value}'; expected name=path-prefix");
        };
        let name = name.trim();
        let prefix = prefix.trim();
        if name.is_empty() || prefix.is_empty() {
            bail!("invalid --target value '{value}'; expected name=path-prefix");
        }
        if targets.iter().any(|target| target.name == name) {
            bail!("duplicate target name '{name}'");
        }
        targets.push(TargetSpec {
            name: name.to_string(),
            prefix: PathBuf::from(prefix),
        });
    }
    Ok(targets)
}

/// Line-coverage accumulator for one target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CoverageTotals {
    pub covered: u64,
    pub total: u64,
}

impl CoverageTotals {
    /// Zero measured lines reads as 0%: an unmeasured target cannot pass
    /// the gate.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.covered as f64 / self.total as f64 * 100.0
    }
}

pub struct TargetTotals {
    pub name: String,
    pub totals: CoverageTotals,
}

/// Sum line counters per target, in target declaration order.
pub fn aggregate(
    report: &ExportReport,
    targets: &[TargetSpec],
    repo_root: &Path,
) -> Vec<TargetTotals> {
    let mut totals: Vec<TargetTotals> = targets
        .iter()
        .map(|target| TargetTotals {
            name: target.name.clone(),
            totals: CoverageTotals::default(),
        })
        .collect();
    let root = normalize(repo_root);

    for record in report.files() {
        let Some(relative) = relative_to_root(&record.filename, &root) else {
            continue;
        };
        if record.summary.lines.count == 0 {
            continue;
        }
        for (target, slot) in targets.iter().zip(totals.iter_mut()) {
            if relative.starts_with(&target.prefix) {
                slot.totals.covered += record.summary.lines.covered;
                slot.totals.total += record.summary.lines.count;
                break;
            }
        }
    }

    totals
}

fn relative_to_root(filename: &Path, root: &Path) -> Option<PathBuf> {
    let absolute = if filename.is_absolute() {
        normalize(filename)
    } else {
        normalize(&root.join(filename))
    };
    absolute.strip_prefix(root).ok().map(Path::to_path_buf)
}

/// Lexical normalization: resolves `.` and `..` without touching the
/// filesystem, so synthetic report paths behave deterministically.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::ExportReport;

    fn report(files: &[(&str, u64, u64)]) -> ExportReport {
        let entries: Vec<String> = files
            .iter()
            .map(|(filename, count, covered)| {
                format!(
                    r#"{{"filename": "{filename}", "summary": {{"lines": {{"count": {count}, "covered": {covered}}}}}}}"#
                )
            })
            .collect();
        let json = format!(r#"{{"data": [{{"files": [{}]}}]}}"#, entries.join(","));
        serde_json::from_str(&json).expect("build report")
    }

    fn targets(specs: &[(&str, &str)]) -> Vec<TargetSpec> {
        specs
            .iter()
            .map(|(name, prefix)| TargetSpec {
                name: (*name).to_string(),
                prefix: PathBuf::from(prefix),
            })
            .collect()
    }

    #[test]
    fn partitioned_report_conserves_total_lines() {
        let report = report(&[
            ("/repo/src/lib/a.rs", 60, 50),
            ("/repo/src/lib/b.rs", 40, 40),
            ("/repo/src/bin/main.rs", 30, 10),
        ]);
        let targets = targets(&[("lib", "src/lib"), ("bin", "src/bin")]);
        let totals = aggregate(&report, &targets, Path::new("/repo"));
        let summed: u64 = totals.iter().map(|entry| entry.totals.total).sum();
        assert_eq!(summed, 130);
        assert_eq!(totals[0].totals, CoverageTotals { covered: 90, total: 100 });
        assert_eq!(totals[1].totals, CoverageTotals { covered: 10, total: 30 });
    }

    #[test]
    fn files_outside_repo_root_never_contribute() {
        let inside = report(&[("/repo/src/lib/a.rs", 10, 5)]);
        let with_dependency = report(&[
            ("/repo/src/lib/a.rs", 10, 5),
            ("/deps/vendored/lib.rs", 1000, 0),
            ("/repo/../elsewhere/src/lib/b.rs", 50, 50),
        ]);
        let targets = targets(&[("lib", "src/lib")]);
        let a = aggregate(&inside, &targets, Path::new("/repo"));
        let b = aggregate(&with_dependency, &targets, Path::new("/repo"));
        assert_eq!(a[0].totals, b[0].totals);
    }

    #[test]
    fn zero_line_files_are_skipped() {
        let report = report(&[("/repo/src/lib/empty.rs", 0, 0)]);
        let targets = targets(&[("lib", "src/lib")]);
        let totals = aggregate(&report, &targets, Path::new("/repo"));
        assert_eq!(totals[0].totals, CoverageTotals::default());
    }

    #[test]
    fn first_matching_target_wins_with_overlapping_prefixes() {
        let report = report(&[("/repo/src/lib/nested/a.rs", 10, 10)]);
        let targets = targets(&[("outer", "src/lib"), ("inner", "src/lib/nested")]);
        let totals = aggregate(&report, &targets, Path::new("/repo"));
        assert_eq!(totals[0].totals.total, 10);
        assert_eq!(totals[1].totals.total, 0);
    }

    #[test]
    fn unmatched_files_are_silently_excluded() {
        let report = report(&[("/repo/docs/guide.rs", 10, 10)]);
        let targets = targets(&[("lib", "src/lib")]);
        let totals = aggregate(&report, &targets, Path::new("/repo"));
        assert_eq!(totals[0].totals, CoverageTotals::default());
    }

    #[test]
    fn prefix_match_is_per_component() {
        // src/library is not inside the src/lib target.
        let report = report(&[("/repo/src/library/a.rs", 10, 10)]);
        let targets = targets(&[("lib", "src/lib")]);
        let totals = aggregate(&report, &targets, Path::new("/repo"));
        assert_eq!(totals[0].totals.total, 0);
    }

    #[test]
    fn percent_is_monotonic_and_exact_at_extremes() {
        let total = 200;
        let mut previous = -1.0;
        for covered in 0..=total {
            let totals = CoverageTotals { covered, total };
            let percent = totals.percent();
            assert!(percent >= previous);
            previous = percent;
        }
        assert_eq!(CoverageTotals { covered: 0, total }.percent(), 0.0);
        assert_eq!(CoverageTotals { covered: total, total }.percent(), 100.0);
    }

    #[test]
    fn parse_rejects_malformed_specs() {
        assert!(parse_target_specs(&["no-equals".to_string()]).is_err());
        assert!(parse_target_specs(&["=src/lib".to_string()]).is_err());
        assert!(parse_target_specs(&["lib=".to_string()]).is_err());
        assert!(parse_target_specs(&["lib=src/a".to_string(), "lib=src/b".to_string()]).is_err());
    }

    #[test]
    fn parse_trims_and_preserves_order() {
        let specs = parse_target_specs(&[
            " core = src/core ".to_string(),
            "cli=src/cli".to_string(),
        ])
        .expect("parse");
        assert_eq!(specs[0].name, "core");
        assert_eq!(specs[0].prefix, PathBuf::from("src/core"));
        assert_eq!(specs[1].name, "cli");
    }
}
