//! Test-artifact discovery across flat and bundle layouts.
//!
//! A test bundle is either a plain executable file or a directory bundle
//! carrying the real executable at `Contents/MacOS`. The locator handles
//! both without assuming the host platform, and refuses to guess when a
//! bundle holds more than one candidate.

use crate::error::GateError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Conventional suffix of the test-bundle name produced by package builds.
pub const DEFAULT_BUNDLE_NAME: &str = "PackageTests.xctest";

pub fn locate(build_dir: &Path, bundle_name: &str) -> Result<PathBuf> {
    if !build_dir.is_dir() {
        return Err(not_found(bundle_name, build_dir));
    }
    let mut bundles = Vec::new();
    collect_bundles(build_dir, bundle_name, &mut bundles)?;
    bundles.sort();
    let Some(bundle) = bundles.into_iter().next() else {
        return Err(not_found(bundle_name, build_dir));
    };
    tracing::debug!(bundle = %bundle.display(), "found test bundle");
    resolve_executable(&bundle, bundle_name)
}

fn collect_bundles(dir: &Path, bundle_name: &str, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.with_context(|| format!("read entry under {}", dir.display()))?;
        let path = entry.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(bundle_name));
        if matches {
            // A matching directory is a bundle, not a tree to descend into.
            out.push(path);
            continue;
        }
        if path.is_dir() {
            collect_bundles(&path, bundle_name, out)?;
        }
    }
    Ok(())
}

fn resolve_executable(bundle: &Path, bundle_name: &str) -> Result<PathBuf> {
    if bundle.is_file() {
        return Ok(bundle.to_path_buf());
    }

    let binary_dir = bundle.join("Contents").join("MacOS");
    if binary_dir.is_dir() {
        if let Some(stem) = bundle.file_stem() {
            let stem_candidate = binary_dir.join(stem);
            if stem_candidate.is_file() {
                return Ok(stem_candidate);
            }
        }

        let mut binaries = Vec::new();
        for entry in
            fs::read_dir(&binary_dir).with_context(|| format!("read {}", binary_dir.display()))?
        {
            let path = entry
                .with_context(|| format!("read entry under {}", binary_dir.display()))?
                .path();
            if path.is_file() {
                binaries.push(path);
            }
        }
        binaries.sort();
        match binaries.len() {
            0 => {}
            1 => return Ok(binaries.remove(0)),
            _ => {
                let candidates = binaries
                    .iter()
                    .filter_map(|path| path.file_name())
                    .map(|name| name.to_string_lossy().to_string())
                    .collect();
                return Err(GateError::AmbiguousBinary {
                    bundle: bundle.to_path_buf(),
                    candidates,
                }
                .into());
            }
        }
    }

    Err(not_found(bundle_name, bundle))
}

fn not_found(bundle_name: &str, path: &Path) -> anyhow::Error {
    GateError::BinaryNotFound {
        bundle: bundle_name.to_string(),
        path: path.to_path_buf(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, b"").expect("touch");
    }

    #[test]
    fn flat_executable_is_returned_directly() {
        let temp = tempfile::tempdir().expect("tempdir");
        let flat = temp.path().join("debug").join("AppPackageTests.xctest");
        touch(&flat);
        let found = locate(temp.path(), DEFAULT_BUNDLE_NAME).expect("locate");
        assert_eq!(found, flat);
    }

    #[test]
    fn bundle_with_stem_named_binary_resolves_to_it() {
        let temp = tempfile::tempdir().expect("tempdir");
        let bundle = temp.path().join("AppPackageTests.xctest");
        let nested = bundle
            .join("Contents")
            .join("MacOS")
            .join("AppPackageTests");
        touch(&nested);
        let found = locate(temp.path(), DEFAULT_BUNDLE_NAME).expect("locate");
        assert_eq!(found, nested);
    }

    #[test]
    fn bundle_with_single_binary_resolves_to_it() {
        let temp = tempfile::tempdir().expect("tempdir");
        let bundle = temp.path().join("AppPackageTests.xctest");
        let nested = bundle.join("Contents").join("MacOS").join("runner");
        touch(&nested);
        let found = locate(temp.path(), DEFAULT_BUNDLE_NAME).expect("locate");
        assert_eq!(found, nested);
    }

    #[test]
    fn bundle_with_two_binaries_is_ambiguous() {
        let temp = tempfile::tempdir().expect("tempdir");
        let bundle = temp.path().join("AppPackageTests.xctest");
        touch(&bundle.join("Contents").join("MacOS").join("alpha"));
        touch(&bundle.join("Contents").join("MacOS").join("beta"));
        let err = locate(temp.path(), DEFAULT_BUNDLE_NAME).expect_err("ambiguous");
        match err.downcast_ref::<GateError>() {
            Some(GateError::AmbiguousBinary { candidates, .. }) => {
                assert_eq!(candidates, &["alpha".to_string(), "beta".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_bundle_reports_binary_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        let bundle = temp.path().join("AppPackageTests.xctest");
        fs::create_dir_all(bundle.join("Contents").join("MacOS")).expect("mkdir");
        let err = locate(temp.path(), DEFAULT_BUNDLE_NAME).expect_err("empty bundle");
        assert!(matches!(
            err.downcast_ref::<GateError>(),
            Some(GateError::BinaryNotFound { .. })
        ));
    }

    #[test]
    fn missing_bundle_reports_binary_not_found() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(temp.path().join("debug")).expect("mkdir");
        let err = locate(temp.path(), DEFAULT_BUNDLE_NAME).expect_err("nothing to find");
        assert!(matches!(
            err.downcast_ref::<GateError>(),
            Some(GateError::BinaryNotFound { .. })
        ));
    }

    #[test]
    fn first_bundle_in_sorted_order_wins() {
        let temp = tempfile::tempdir().expect("tempdir");
        let first = temp.path().join("a").join("AppPackageTests.xctest");
        let second = temp.path().join("b").join("AppPackageTests.xctest");
        touch(&first);
        touch(&second);
        let found = locate(temp.path(), DEFAULT_BUNDLE_NAME).expect("locate");
        assert_eq!(found, first);
    }
}
