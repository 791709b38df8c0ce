use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::process::ExitCode;

mod cli;
mod coverage;
mod environment;
mod error;
mod export;
mod fixtures;
mod gate;
mod lint;
mod locate;
mod packaging;
mod toolchain;
mod util;

use cli::{Command, CoverageArgs, FixturesArgs, FormulaArgs, LintDocsArgs, PkgbuildArgs, RootArgs};
use environment::Environment;
use error::GateError;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = RootArgs::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: RootArgs) -> Result<()> {
    match args.command {
        Command::Coverage(args) => cmd_coverage(args),
        Command::Formula(args) => cmd_formula(args),
        Command::Pkgbuild(args) => cmd_pkgbuild(args),
        Command::LintDocs(args) => cmd_lint_docs(args),
        Command::Fixtures(args) => cmd_fixtures(args),
    }
}

/// A failed gate prints its own summary; infrastructure failures get the
/// generic error prefix, with relayed subprocess stderr where it exists.
fn report_failure(err: &anyhow::Error) {
    if let Some(gate_err) = err.downcast_ref::<GateError>() {
        if let GateError::ExportFailed { stderr, .. } = gate_err {
            if !stderr.is_empty() {
                eprint!("{stderr}");
                if !stderr.ends_with('\n') {
                    eprintln!();
                }
            }
        }
        if matches!(gate_err, GateError::GateFailed { .. }) {
            eprintln!("{gate_err}");
            return;
        }
    }
    eprintln!("error: {err:#}");
}

fn cmd_coverage(args: CoverageArgs) -> Result<()> {
    let env = Environment::capture()?;

    let repo_root = args
        .repo_root
        .clone()
        .unwrap_or_else(|| env.cwd().to_path_buf());
    let repo_root = fs::canonicalize(&repo_root)
        .with_context(|| format!("resolve repo root {}", repo_root.display()))?;
    let build_dir = if args.build_dir.is_absolute() {
        args.build_dir.clone()
    } else {
        repo_root.join(&args.build_dir)
    };

    let profdata = args.profdata.clone().unwrap_or_else(|| {
        build_dir
            .join("debug")
            .join("codecov")
            .join("default.profdata")
    });
    if !profdata.exists() {
        bail!("coverage data not found at {}", profdata.display());
    }

    let binary = match &args.binary {
        Some(binary) => {
            if !binary.exists() {
                bail!("test binary not found at {}", binary.display());
            }
            binary.clone()
        }
        None => locate::locate(&build_dir, &args.bundle)?,
    };

    let targets = if args.targets.is_empty() {
        coverage::default_targets()
    } else {
        coverage::parse_target_specs(&args.targets)?
    };

    let tool = toolchain::resolve(&env)?;
    tracing::info!(
        tool = %tool.display(),
        binary = %binary.display(),
        profdata = %profdata.display(),
        "exporting coverage summary"
    );
    let report = export::export(&tool, &profdata, &binary)?;
    let totals = coverage::aggregate(&report, &targets, &repo_root);
    let verdict = gate::evaluate(&totals, args.threshold);

    println!("Coverage threshold: {:.1}%", args.threshold);
    for row in &verdict.rows {
        println!(
            "  {}: {:.2}% (covered {} of {} lines)",
            row.name, row.percent, row.covered, row.total
        );
    }

    if verdict.passed() {
        Ok(())
    } else {
        Err(GateError::GateFailed {
            failing: verdict.failing,
        }
        .into())
    }
}

fn cmd_formula(args: FormulaArgs) -> Result<()> {
    let version = packaging::sanitize_version(&args.version)?;
    let formula = packaging::render_formula(
        version,
        &args.arm64_url,
        &args.arm64_sha256,
        &args.x86_64_url,
        &args.x86_64_sha256,
    );
    packaging::write_rendered(&args.output, &formula)?;
    println!("{}", args.output.display());
    Ok(())
}

fn cmd_pkgbuild(args: PkgbuildArgs) -> Result<()> {
    let version = packaging::sanitize_version(&args.version)?;
    let pkgbuild = packaging::render_pkgbuild(
        version,
        &args.pkgrel,
        &args.x86_64_url,
        &args.x86_64_sha256,
        &args.aarch64_url,
        &args.aarch64_sha256,
    );
    packaging::write_rendered(&args.output, &pkgbuild)?;
    println!("{}", args.output.display());
    Ok(())
}

fn cmd_lint_docs(args: LintDocsArgs) -> Result<()> {
    let paths = lint::collect_markdown_paths(&args.paths, &args.readme)?;
    let mut failures: Vec<String> = Vec::new();
    for path in &paths {
        failures.extend(lint::lint_file(path, &args.readme)?);
    }
    if failures.is_empty() {
        return Ok(());
    }
    for failure in &failures {
        eprintln!("[lint] {failure}");
    }
    bail!("{} documentation check(s) failed", failures.len());
}

fn cmd_fixtures(args: FixturesArgs) -> Result<()> {
    let outcome = fixtures::validate_manifest(&args.manifest)?;
    for warning in &outcome.warnings {
        println!("[WARN] {warning}");
    }
    for failure in &outcome.failures {
        eprintln!("[ERROR] {failure}");
    }
    if !outcome.failures.is_empty() {
        bail!("{} fixture bundle check(s) failed", outcome.failures.len());
    }
    if outcome.validated > 0 {
        println!(
            "[OK] Validated {} fixture bundle(s) declared in {}.",
            outcome.validated,
            args.manifest.display()
        );
    }
    Ok(())
}
