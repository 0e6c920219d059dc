use crate::error::{Result, SpinboxError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Project-relative constants
// ---------------------------------------------------------------------------

pub const SPINBOX_DIR: &str = ".spinbox";
pub const PROJECT_FILE: &str = ".spinbox/project.yaml";

pub const REQUIREMENTS_TXT: &str = "requirements.txt";
pub const PACKAGE_JSON: &str = "package.json";
pub const SETUP_PYTHON_DEPS: &str = "setup-python-deps.sh";
pub const SETUP_NODEJS_DEPS: &str = "setup-nodejs-deps.sh";
pub const EXAMPLES_MD: &str = "EXAMPLES.md";

// ---------------------------------------------------------------------------
// User-level constants
// ---------------------------------------------------------------------------

pub const GLOBAL_CONFIG_FILE: &str = "config.yaml";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn project_file(root: &Path) -> PathBuf {
    root.join(PROJECT_FILE)
}

/// Resolve the user-level spinbox directory.
pub fn user_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let home = home::home_dir().ok_or(SpinboxError::HomeNotFound)?;
    Ok(home.join(SPINBOX_DIR))
}

pub fn global_config_path(user_dir: &Path) -> PathBuf {
    user_dir.join(GLOBAL_CONFIG_FILE)
}
