//! Process-environment snapshot used for tool and artifact discovery.
//!
//! Discovery never reads ambient process state directly; everything it
//! needs is captured once here so tests can substitute a fake environment.

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

pub struct Environment {
    vars: BTreeMap<String, String>,
    search_path: Option<OsString>,
    cwd: PathBuf,
}

impl Environment {
    pub fn new(
        vars: BTreeMap<String, String>,
        search_path: Option<OsString>,
        cwd: PathBuf,
    ) -> Self {
        Self {
            vars,
            search_path,
            cwd,
        }
    }

    /// Snapshot the real process environment.
    pub fn capture() -> Result<Self> {
        let cwd = env::current_dir().context("resolve current directory")?;
        let vars = env::vars().collect();
        Ok(Self::new(vars, env::var_os("PATH"), cwd))
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn search_path(&self) -> Option<&OsStr> {
        self.search_path.as_deref()
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn var_reads_from_snapshot_not_process() {
        let mut vars = BTreeMap::new();
        vars.insert("LLVM_COV".to_string(), "/opt/llvm/bin/llvm-cov".to_string());
        let env = Environment::new(vars, None, PathBuf::from("/tmp"));
        assert_eq!(env.var("LLVM_COV"), Some("/opt/llvm/bin/llvm-cov"));
        assert_eq!(env.var("PATH"), None);
    }
}
