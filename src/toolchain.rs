//! Coverage-export tool discovery.
//!
//! Resolution is an ordered list of strategies; the first that yields an
//! existing path wins. Given an identical environment the outcome is
//! deterministic, and the only side effects are existence checks plus one
//! best-effort `rustup which` subprocess.

use crate::environment::Environment;
use crate::error::GateError;
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable naming the export tool, as a bare name or a path.
pub const TOOL_ENV_OVERRIDE: &str = "LLVM_COV";

const TOOL_NAME: &str = "llvm-cov";
const TOOLCHAIN_LOCATOR: &str = "rustup";
const SIBLING_COMPILER: &str = "clang";

pub fn resolve(env: &Environment) -> Result<PathBuf> {
    let strategies: &[(&str, fn(&Environment) -> Option<PathBuf>)] = &[
        ("override", from_override),
        ("search-path", from_search_path),
        ("toolchain-locator", from_toolchain_locator),
        ("compiler-sibling", from_compiler_siblings),
    ];
    for &(label, strategy) in strategies {
        if let Some(path) = strategy(env) {
            tracing::debug!(tool = %path.display(), strategy = label, "resolved coverage export tool");
            return Ok(path);
        }
    }
    Err(GateError::ToolNotFound.into())
}

fn from_override(env: &Environment) -> Option<PathBuf> {
    let value = env.var(TOOL_ENV_OVERRIDE)?;
    let raw = Path::new(value);
    // A bare identifier goes through the search path; anything with a
    // directory component is taken literally.
    let candidate = if raw.components().count() == 1 {
        lookup(value, env)?
    } else {
        raw.to_path_buf()
    };
    candidate.exists().then_some(candidate)
}

fn from_search_path(env: &Environment) -> Option<PathBuf> {
    lookup(TOOL_NAME, env)
}

fn from_toolchain_locator(env: &Environment) -> Option<PathBuf> {
    let locator = lookup(TOOLCHAIN_LOCATOR, env)?;
    let output = Command::new(locator)
        .args(["which", TOOL_NAME])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8(output.stdout).ok()?;
    let line = stdout.lines().find(|line| !line.trim().is_empty())?;
    let candidate = PathBuf::from(line.trim());
    candidate.exists().then_some(candidate)
}

fn from_compiler_siblings(env: &Environment) -> Option<PathBuf> {
    let compiler = lookup(SIBLING_COMPILER, env)?;
    let compiler = compiler.canonicalize().ok()?;
    let bin_dir = compiler.parent()?;
    let mut candidates = vec![bin_dir.join(TOOL_NAME)];
    if let Some(toolchain_root) = bin_dir.parent() {
        candidates.push(toolchain_root.join("usr").join("bin").join(TOOL_NAME));
        candidates.push(toolchain_root.join("bin").join(TOOL_NAME));
    }
    candidates.into_iter().find(|candidate| candidate.exists())
}

fn lookup(name: &str, env: &Environment) -> Option<PathBuf> {
    which::which_in(name, env.search_path(), env.cwd()).ok()
}
