//! Companion install scripts written next to each manifest.

use crate::types::Ecosystem;

const PYTHON_SCRIPT: &str = r#"#!/usr/bin/env bash
# Install Python dependencies for __PROJECT__.
# Generated by spinbox; safe to re-run.
set -e

cd "$(dirname "$0")"

if command -v python3 >/dev/null 2>&1; then
    PYTHON=python3
elif command -v python >/dev/null 2>&1; then
    PYTHON=python
else
    echo "error: python3 not found; install Python __PYTHON_VERSION__ or newer" >&2
    exit 1
fi

if ! "$PYTHON" -m pip --version >/dev/null 2>&1; then
    echo "error: pip is not available for $PYTHON" >&2
    exit 1
fi

echo "Installing Python dependencies from requirements.txt..."
"$PYTHON" -m pip install -r requirements.txt
echo "Python dependencies installed."
"#;

const NODE_SCRIPT: &str = r#"#!/usr/bin/env bash
# Install Node.js dependencies for __PROJECT__.
# Generated by spinbox; safe to re-run.
set -e

cd "$(dirname "$0")"

if ! command -v node >/dev/null 2>&1; then
    echo "error: node not found; install Node.js __NODE_VERSION__ or newer" >&2
    exit 1
fi

if ! command -v npm >/dev/null 2>&1; then
    echo "error: npm not found" >&2
    exit 1
fi

echo "Installing Node.js dependencies from package.json..."
npm install
echo "Node.js dependencies installed."
"#;

/// Values substituted into the script templates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptContext<'a> {
    pub project_name: &'a str,
    pub python_version: &'a str,
    pub node_version: &'a str,
}

pub fn render_setup_script(ecosystem: Ecosystem, ctx: &ScriptContext<'_>) -> String {
    let template = match ecosystem {
        Ecosystem::Python => PYTHON_SCRIPT,
        Ecosystem::Node => NODE_SCRIPT,
    };
    template
        .replace("__PROJECT__", ctx.project_name)
        .replace("__PYTHON_VERSION__", ctx.python_version)
        .replace("__NODE_VERSION__", ctx.node_version)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ScriptContext<'static> {
        ScriptContext {
            project_name: "demo",
            python_version: "3.12",
            node_version: "20",
        }
    }

    #[test]
    fn python_script_installs_requirements() {
        let s = render_setup_script(Ecosystem::Python, &ctx());
        assert!(s.starts_with("#!/usr/bin/env bash\n"));
        assert!(s.contains("set -e"));
        assert!(s.contains("-m pip install -r requirements.txt"));
        assert!(s.contains("Python 3.12"));
        assert!(s.contains("exit 1"));
        assert!(!s.contains("__"));
    }

    #[test]
    fn node_script_runs_npm_install() {
        let s = render_setup_script(Ecosystem::Node, &ctx());
        assert!(s.contains("command -v npm"));
        assert!(s.contains("npm install"));
        assert!(s.contains("for demo"));
        assert!(!s.contains("__"));
    }
}
