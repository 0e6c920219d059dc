#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

/// Workspace with an isolated user config directory.
struct Sandbox {
    dir: TempDir,
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
            home: TempDir::new().unwrap(),
        }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn project(&self) -> std::path::PathBuf {
        self.dir.path().join("proj")
    }

    fn spinbox(&self) -> Command {
        let mut cmd = Command::cargo_bin("spinbox").unwrap();
        cmd.current_dir(self.dir.path())
            .env("HOME", self.home.path())
            .env("SPINBOX_HOME", self.home.path().join(".spinbox"))
            .env_remove("SPINBOX_ROOT")
            .env_remove("RUST_LOG");
        cmd
    }

    /// `spinbox` rooted at the project directory.
    fn in_project(&self) -> Command {
        let mut cmd = self.spinbox();
        cmd.env("SPINBOX_ROOT", self.project());
        cmd
    }

    fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.project().join(rel)).unwrap()
    }
}

fn requirement_names(text: &str) -> Vec<String> {
    text.lines()
        .filter(|l| !l.is_empty() && !l.starts_with('#') && !l.starts_with('-'))
        .map(|l| {
            l.split(|c: char| "=<>!~;[ ".contains(c))
                .next()
                .unwrap()
                .to_string()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// spinbox create
// ---------------------------------------------------------------------------

#[test]
fn create_fastapi_postgresql_writes_requirements() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--fastapi", "--postgresql", "--with-deps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project 'proj'"));

    let names = requirement_names(&sb.read("requirements.txt"));
    assert_eq!(
        names,
        vec![
            "alembic",
            "asyncpg",
            "fastapi",
            "psycopg2-binary",
            "pydantic",
            "python-dotenv",
            "sqlalchemy",
            "uvicorn",
        ]
    );
    assert!(!sb.project().join("package.json").exists());
    assert!(sb.project().join("setup-python-deps.sh").exists());
    assert!(sb.project().join(".spinbox/project.yaml").exists());
}

#[test]
fn create_nextjs_writes_package_json() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--nextjs", "--with-deps"])
        .assert()
        .success();

    let pkg: serde_json::Value = serde_json::from_str(&sb.read("package.json")).unwrap();
    for name in ["next", "react", "react-dom", "axios"] {
        assert!(pkg["dependencies"][name].is_string(), "{name} missing");
    }
    assert!(pkg["devDependencies"]["typescript"].is_string());
    assert!(!sb.project().join("requirements.txt").exists());
    assert!(sb.project().join("setup-nodejs-deps.sh").exists());
}

#[test]
fn create_unknown_component_fails_before_writing() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--component", "unknown-component", "--with-deps"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown component 'unknown-component'"));
    assert!(!sb.project().exists());
}

#[test]
fn create_without_components_fails() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no components requested"));
}

#[test]
fn create_twice_is_refused() {
    let sb = Sandbox::new();
    sb.spinbox().args(["create", "proj", "--python"]).assert().success();
    sb.spinbox()
        .args(["create", "proj", "--python"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn create_profile_with_examples() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--profile", "ai-llm", "--with-examples", "--with-deps"])
        .assert()
        .success();

    assert!(sb.project().join("ai-llm/openai/example-chat.py").exists());
    assert!(sb.project().join("chroma/example-rag-system.py").exists());
    assert!(sb.project().join("chroma/EXAMPLES.md").exists());
    let reqs = sb.read("requirements.txt");
    assert!(reqs.contains("openai>=1.3.0"));
    assert!(reqs.contains("chromadb>=0.4.18"));

    let record: serde_yaml::Value = serde_yaml::from_str(&sb.read(".spinbox/project.yaml")).unwrap();
    assert_eq!(record["profile"].as_str(), Some("ai-llm"));
    assert_eq!(record["template"].as_str(), Some("ai-llm"));
}

#[test]
fn create_json_output() {
    let sb = Sandbox::new();
    let out = sb
        .spinbox()
        .args(["--json", "create", "proj", "--redis", "--with-deps"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let report: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(report["mode"], "create");
    assert_eq!(report["components"][0], "redis");
    assert_eq!(report["dependencies"]["manifests"][0]["path"], "requirements.txt");
}

#[test]
fn default_profile_from_config_applies() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["config", "set", "default_profile", "api-only"])
        .assert()
        .success();
    sb.spinbox().args(["create", "proj"]).assert().success();

    let record: serde_yaml::Value = serde_yaml::from_str(&sb.read(".spinbox/project.yaml")).unwrap();
    let components: Vec<&str> = record["components"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(components, vec!["fastapi", "postgresql", "redis"]);
}

// ---------------------------------------------------------------------------
// spinbox add
// ---------------------------------------------------------------------------

#[test]
fn add_preserves_user_pin() {
    let sb = Sandbox::new();
    std::fs::create_dir_all(sb.project()).unwrap();
    std::fs::write(sb.project().join("requirements.txt"), "fastapi==0.100.0\n").unwrap();

    sb.in_project()
        .args(["add", "--fastapi", "--with-deps"])
        .assert()
        .success();

    let text = sb.read("requirements.txt");
    assert!(text.contains("fastapi==0.100.0"));
    assert!(!text.contains("fastapi>=0.104.0"));
    assert!(text.contains("uvicorn>=0.24.0"));
}

#[test]
fn add_redis_next_to_pinned_fastapi() {
    let sb = Sandbox::new();
    std::fs::create_dir_all(sb.project()).unwrap();
    std::fs::write(sb.project().join("requirements.txt"), "fastapi==0.100.0\n").unwrap();

    sb.in_project()
        .args(["add", "--redis", "--with-deps"])
        .assert()
        .success();

    let text = sb.read("requirements.txt");
    assert_eq!(text, "fastapi==0.100.0\nhiredis>=2.2.3\nredis>=5.0.1\n");
    let names = requirement_names(&text);
    assert_eq!(names.iter().filter(|n| *n == "fastapi").count(), 1);
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
}

#[test]
fn ai_profile_with_fastapi_stages_api_examples() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--profile", "ai-llm", "--fastapi", "--with-examples"])
        .assert()
        .success();
    for rel in [
        "fastapi/example-chat-api.py",
        "fastapi/example-rag-system.py",
        "ai-llm/langchain/example-memory.py",
        "ai-llm/llamaindex/example-knowledge-base.py",
    ] {
        assert!(sb.project().join(rel).exists(), "{rel} missing");
    }
}

#[test]
fn add_twice_is_byte_identical() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--fastapi", "--nextjs", "--with-deps", "--with-examples"])
        .assert()
        .success();
    sb.in_project()
        .args(["add", "--redis", "--with-deps", "--with-examples"])
        .assert()
        .success();
    let reqs = sb.read("requirements.txt");
    let pkg = sb.read("package.json");
    let example = sb.read("fastapi/example-redis-caching.py");

    sb.in_project()
        .args(["add", "--redis", "--with-deps", "--with-examples"])
        .assert()
        .success();
    assert_eq!(sb.read("requirements.txt"), reqs);
    assert_eq!(sb.read("package.json"), pkg);
    assert_eq!(sb.read("fastapi/example-redis-caching.py"), example);
}

#[test]
fn add_keeps_edited_example() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--redis", "--with-examples"])
        .assert()
        .success();
    std::fs::write(sb.project().join("redis/example-caching.py"), "# mine\n").unwrap();

    sb.in_project()
        .args(["add", "--redis", "--with-examples"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 preserved"));
    assert_eq!(sb.read("redis/example-caching.py"), "# mine\n");
}

#[test]
fn malformed_package_json_fails_but_writes_requirements() {
    let sb = Sandbox::new();
    std::fs::create_dir_all(sb.project()).unwrap();
    std::fs::write(sb.project().join("package.json"), "{ nope").unwrap();

    sb.in_project()
        .args(["add", "--fastapi", "--nextjs", "--with-deps"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json"));

    assert!(sb.project().join("requirements.txt").exists());
    assert_eq!(sb.read("package.json"), "{ nope");
}

#[test]
fn add_to_missing_directory_fails() {
    let sb = Sandbox::new();
    sb.in_project()
        .args(["add", "--redis"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("target directory not found"));
}

// ---------------------------------------------------------------------------
// spinbox profiles / status
// ---------------------------------------------------------------------------

#[test]
fn profiles_lists_builtins() {
    let sb = Sandbox::new();
    sb.spinbox()
        .arg("profiles")
        .assert()
        .success()
        .stdout(predicate::str::contains("web-app"))
        .stdout(predicate::str::contains("ai-llm"));
}

#[test]
fn profiles_show_one() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["profiles", "api-only"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fastapi, postgresql, redis"))
        .stdout(predicate::str::contains("api-development"));
}

#[test]
fn profiles_unknown_fails() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["profiles", "mystery"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown profile 'mystery'"));
}

#[test]
fn status_reports_project() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["create", "proj", "--python", "--mongodb"])
        .assert()
        .success();
    let out = sb
        .in_project()
        .args(["status", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["project"]["name"], "proj");
    assert_eq!(value["project"]["components"][0], "mongodb");
    assert_eq!(value["toolchains"].as_array().unwrap().len(), 2);
}

#[test]
fn status_without_project() {
    let sb = Sandbox::new();
    let mut cmd = sb.spinbox();
    cmd.env("SPINBOX_ROOT", sb.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("No spinbox project"));
}

// ---------------------------------------------------------------------------
// spinbox config
// ---------------------------------------------------------------------------

#[test]
fn config_set_get_reset() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["config", "set", "python_version", "3.11"])
        .assert()
        .success();
    sb.spinbox()
        .args(["config", "get", "python_version"])
        .assert()
        .success()
        .stdout("3.11\n");
    sb.spinbox()
        .args(["config", "reset", "python_version"])
        .assert()
        .success();
    sb.spinbox()
        .args(["config", "get", "python_version"])
        .assert()
        .success()
        .stdout("3.12\n");
}

#[test]
fn config_rejects_unknown_key_and_bad_value() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown config key 'colour'"));
    sb.spinbox()
        .args(["config", "set", "with_deps", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value 'maybe'"));
}

#[test]
fn config_with_deps_default_applies() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["config", "set", "with_deps", "true"])
        .assert()
        .success();
    sb.spinbox().args(["create", "proj", "--fastapi"]).assert().success();
    assert!(sb.project().join("requirements.txt").exists());
}

#[test]
fn config_validate_flags_unknown_profile() {
    let sb = Sandbox::new();
    sb.spinbox()
        .args(["config", "set", "default_profile", "mystery"])
        .assert()
        .success();
    sb.spinbox()
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("'mystery'"));
}
