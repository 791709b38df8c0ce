//! CLI argument parsing for the release-gate toolkit.
//!
//! The CLI is intentionally thin: each subcommand collects paths and
//! policy knobs, and all decision logic lives in the per-concern modules.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::locate::DEFAULT_BUNDLE_NAME;

/// Root CLI entrypoint for the release-gate toolkit.
#[derive(Parser, Debug)]
#[command(
    name = "relgate",
    version,
    about = "Release gates: coverage enforcement, packaging templates, docs and fixture checks",
    after_help = "Commands:\n  coverage    Enforce per-target line coverage from llvm-cov export data\n  formula     Render a deterministic Homebrew formula\n  pkgbuild    Render a deterministic Arch Linux PKGBUILD\n  lint-docs   Check Markdown conventions (plus README requirements)\n  fixtures    Validate fixture-manifest checksums and sizes\n\nExamples:\n  relgate coverage --threshold 90 --target core=src/core --target cli=src/cli\n  relgate coverage --profdata .build/debug/codecov/default.profdata\n  relgate formula --version v1.2.3 --arm64-url URL --arm64-sha256 SHA --x86-64-url URL --x86-64-sha256 SHA --output packaging/relgate.rb\n  relgate lint-docs README.md docs/\n  relgate fixtures Fixtures/manifest.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level release-gate commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Coverage(CoverageArgs),
    Formula(FormulaArgs),
    Pkgbuild(PkgbuildArgs),
    LintDocs(LintDocsArgs),
    Fixtures(FixturesArgs),
}

/// Coverage-gate inputs.
#[derive(Parser, Debug)]
#[command(about = "Enforce minimum line coverage per target")]
pub struct CoverageArgs {
    /// Repository root that exported file paths are resolved against
    #[arg(long, value_name = "DIR")]
    pub repo_root: Option<PathBuf>,

    /// Build output tree searched for the test bundle
    #[arg(long, value_name = "DIR", default_value = ".build")]
    pub build_dir: PathBuf,

    /// Path to the coverage profile data
    #[arg(long, value_name = "PATH")]
    pub profdata: Option<PathBuf>,

    /// Path to the test binary (discovered under the build tree if omitted)
    #[arg(long, value_name = "PATH")]
    pub binary: Option<PathBuf>,

    /// Test-bundle name matched during discovery
    #[arg(long, value_name = "NAME", default_value = DEFAULT_BUNDLE_NAME)]
    pub bundle: String,

    /// Required minimum line coverage percentage
    #[arg(long, default_value_t = 90.0)]
    pub threshold: f64,

    /// Target specification in the form name=relative/source/prefix
    #[arg(long = "target", value_name = "NAME=PREFIX")]
    pub targets: Vec<String>,
}

/// Homebrew formula inputs.
#[derive(Parser, Debug)]
#[command(about = "Render a Homebrew formula referencing per-arch macOS artifacts")]
pub struct FormulaArgs {
    /// Semantic version (accepts an optional leading 'v')
    #[arg(long, value_name = "VERSION")]
    pub version: String,

    /// Download URL for the arm64 macOS zip artifact
    #[arg(long, value_name = "URL")]
    pub arm64_url: String,

    /// SHA256 checksum for the arm64 artifact
    #[arg(long, value_name = "SHA")]
    pub arm64_sha256: String,

    /// Download URL for the x86_64 macOS zip artifact
    #[arg(long, value_name = "URL")]
    pub x86_64_url: String,

    /// SHA256 checksum for the x86_64 artifact
    #[arg(long, value_name = "SHA")]
    pub x86_64_sha256: String,

    /// Destination file path for the rendered formula
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

/// Arch Linux PKGBUILD inputs.
#[derive(Parser, Debug)]
#[command(about = "Render a PKGBUILD consuming released tarballs")]
pub struct PkgbuildArgs {
    /// Semantic version (accepts an optional leading 'v')
    #[arg(long, value_name = "VERSION")]
    pub version: String,

    /// Arch package release number
    #[arg(long, value_name = "REL", default_value = "1")]
    pub pkgrel: String,

    /// URL to the x86_64 Linux tarball
    #[arg(long, value_name = "URL")]
    pub x86_64_url: String,

    /// SHA256 checksum for the x86_64 tarball
    #[arg(long, value_name = "SHA")]
    pub x86_64_sha256: String,

    /// URL to the aarch64 Linux tarball
    #[arg(long, value_name = "URL")]
    pub aarch64_url: String,

    /// SHA256 checksum for the aarch64 tarball
    #[arg(long, value_name = "SHA")]
    pub aarch64_sha256: String,

    /// Destination path for the generated PKGBUILD
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

/// Markdown lint inputs.
#[derive(Parser, Debug)]
#[command(about = "Lint Markdown files for line-ending and whitespace conventions")]
pub struct LintDocsArgs {
    /// Markdown files or directories to lint (defaults to the README)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// README path that receives the additional content requirements
    #[arg(long, value_name = "PATH", default_value = "README.md")]
    pub readme: PathBuf,
}

/// Fixture-manifest validation inputs.
#[derive(Parser, Debug)]
#[command(about = "Validate fixture manifest contents against on-disk bundles")]
pub struct FixturesArgs {
    /// Path to the fixture manifest JSON
    #[arg(value_name = "MANIFEST")]
    pub manifest: PathBuf,
}
