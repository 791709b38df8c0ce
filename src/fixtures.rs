//! Fixture-manifest validation for release gating.
//!
//! The manifest declares checksum and size for every fixture bundle; both
//! are recomputed from disk and any mismatch fails the release.

use crate::util::collect_files_recursive;
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

#[derive(Deserialize, Debug)]
pub struct FixtureManifest {
    #[serde(default)]
    pub bundles: Vec<FixtureBundle>,
}

#[derive(Deserialize, Debug, Default)]
pub struct FixtureBundle {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relative_path: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub checksum: Option<BundleChecksum>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

#[derive(Deserialize, Debug, Default)]
pub struct BundleChecksum {
    #[serde(default)]
    pub algorithm: String,
    #[serde(default)]
    pub value: String,
}

impl FixtureBundle {
    /// Placeholder rows with no identity fields are tolerated so a
    /// manifest can be committed before its fixtures land.
    fn is_populated(&self) -> bool {
        [&self.id, &self.name, &self.relative_path]
            .iter()
            .any(|field| !field.trim().is_empty())
    }

    fn label(&self) -> &str {
        if !self.id.is_empty() {
            &self.id
        } else if !self.name.is_empty() {
            &self.name
        } else {
            "<unknown>"
        }
    }
}

pub struct ValidationOutcome {
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
    pub validated: usize,
}

pub fn validate_manifest(manifest_path: &Path) -> Result<ValidationOutcome> {
    if !manifest_path.exists() {
        bail!("manifest not found: {}", manifest_path.display());
    }
    let text = fs::read_to_string(manifest_path)
        .with_context(|| format!("read {}", manifest_path.display()))?;
    let manifest: FixtureManifest = serde_json::from_str(&text)
        .with_context(|| format!("invalid JSON in {}", manifest_path.display()))?;

    let mut outcome = ValidationOutcome {
        failures: Vec::new(),
        warnings: Vec::new(),
        validated: 0,
    };
    let populated: Vec<&FixtureBundle> = manifest
        .bundles
        .iter()
        .filter(|bundle| bundle.is_populated())
        .collect();
    if populated.is_empty() {
        outcome.warnings.push(format!(
            "{}: contains no populated bundle entries; nothing to validate",
            manifest_path.display()
        ));
        return Ok(outcome);
    }

    let fixtures_root = manifest_path.parent().unwrap_or_else(|| Path::new("."));
    for bundle in &populated {
        validate_bundle(bundle, fixtures_root, &mut outcome)?;
    }
    outcome.validated = populated.len();
    Ok(outcome)
}

fn validate_bundle(
    bundle: &FixtureBundle,
    fixtures_root: &Path,
    outcome: &mut ValidationOutcome,
) -> Result<()> {
    let label = bundle.label();

    let mut missing = Vec::new();
    if bundle.id.is_empty() {
        missing.push("id");
    }
    if bundle.name.is_empty() {
        missing.push("name");
    }
    if bundle.relative_path.is_empty() {
        missing.push("relative_path");
    }
    if bundle.kind.is_empty() {
        missing.push("type");
    }
    if bundle.checksum.is_none() {
        missing.push("checksum");
    }
    if bundle.size_bytes.is_none() {
        missing.push("size_bytes");
    }
    if !missing.is_empty() {
        outcome.failures.push(format!(
            "bundle '{label}' missing fields: {}",
            missing.join(", ")
        ));
        return Ok(());
    }

    let bundle_path = fixtures_root.join(&bundle.relative_path);
    if !bundle_path.exists() {
        outcome.failures.push(format!(
            "bundle '{label}' missing at {}",
            bundle_path.display()
        ));
        return Ok(());
    }

    let Some(checksum) = bundle.checksum.as_ref() else {
        return Ok(());
    };
    let algorithm = checksum.algorithm.to_lowercase();
    let expected = checksum.value.to_lowercase();
    if algorithm != "sha256" || expected.is_empty() {
        outcome.failures.push(format!(
            "bundle '{label}' must declare a sha256 checksum value; found '{algorithm}'"
        ));
    } else {
        let digest = bundle_digest(&bundle_path)?;
        if digest != expected {
            outcome.failures.push(format!(
                "bundle '{label}' checksum mismatch: expected {expected}, computed {digest}"
            ));
        }
    }

    let Some(declared_size) = bundle.size_bytes else {
        return Ok(());
    };
    let actual_size = bundle_byte_size(&bundle_path)?;
    if declared_size == 0 {
        outcome.warnings.push(format!(
            "bundle '{label}' size_bytes is 0; consider updating the manifest"
        ));
    } else if declared_size != actual_size {
        outcome.failures.push(format!(
            "bundle '{label}' size mismatch: expected {declared_size}, got {actual_size}"
        ));
    }

    Ok(())
}

/// Content hash over the bundle: a single file hashes directly, a
/// directory hashes every file's bytes in sorted path order.
fn bundle_digest(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    for file in bundle_files(path)? {
        let bytes = fs::read(&file).with_context(|| format!("read {}", file.display()))?;
        hasher.update(&bytes);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn bundle_byte_size(path: &Path) -> Result<u64> {
    let mut size = 0;
    for file in bundle_files(path)? {
        let metadata =
            fs::metadata(&file).with_context(|| format!("stat {}", file.display()))?;
        size += metadata.len();
    }
    Ok(size)
}

fn bundle_files(path: &Path) -> Result<Vec<std::path::PathBuf>> {
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }
    collect_files_recursive(path)
}
