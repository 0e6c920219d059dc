//! Detection of the language toolchains a scaffolded project installs with.
//!
//! Only `PATH` lookups: nothing is executed.

use crate::types::Ecosystem;
use serde::Serialize;
use std::path::PathBuf;

/// Executables tried per ecosystem, in priority order. The first hit is the
/// interpreter; the package manager must also be present.
fn candidates(ecosystem: Ecosystem) -> (&'static [&'static str], &'static str) {
    match ecosystem {
        Ecosystem::Python => (&["python3", "python"], "pip3"),
        Ecosystem::Node => (&["node"], "npm"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toolchain {
    pub ecosystem: Ecosystem,
    /// Interpreter found on `PATH`, if any.
    pub runtime: Option<PathBuf>,
    pub package_manager: Option<PathBuf>,
}

impl Toolchain {
    pub fn is_ready(&self) -> bool {
        self.runtime.is_some() && self.package_manager.is_some()
    }
}

/// Look up the interpreter and package manager for `ecosystem`.
pub fn detect(ecosystem: Ecosystem) -> Toolchain {
    let (runtimes, manager) = candidates(ecosystem);
    let runtime = runtimes.iter().find_map(|bin| which::which(bin).ok());
    let mut package_manager = which::which(manager).ok();
    // some installs only ship a bare `pip`
    if package_manager.is_none() && ecosystem == Ecosystem::Python {
        package_manager = which::which("pip").ok();
    }
    tracing::debug!(
        %ecosystem,
        runtime = ?runtime,
        package_manager = ?package_manager,
        "toolchain detection"
    );
    Toolchain {
        ecosystem,
        runtime,
        package_manager,
    }
}

pub fn detect_all() -> Vec<Toolchain> {
    Ecosystem::all().iter().map(|e| detect(*e)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_all_reports_every_ecosystem() {
        let found = detect_all();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].ecosystem, Ecosystem::Python);
        assert_eq!(found[1].ecosystem, Ecosystem::Node);
    }

    #[test]
    fn ready_requires_both_tools() {
        let t = Toolchain {
            ecosystem: Ecosystem::Node,
            runtime: Some(PathBuf::from("/usr/bin/node")),
            package_manager: None,
        };
        assert!(!t.is_ready());
    }
}
