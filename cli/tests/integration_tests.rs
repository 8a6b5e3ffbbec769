//! Integration tests for the Codescroll CLI
//!
//! These tests run the binary against real directory trees. Each command runs
//! from an empty working directory so no stray config file is picked up.

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::TempDir;

/// README.md (11 bytes), main.bin, big.txt (1124 bytes) and .git/config
fn create_scenario_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();

    fs::write(base.join("README.md"), "# Hello\n\nHi").unwrap();
    fs::write(base.join("main.bin"), [0x7fu8, b'E', b'L', b'F', 0, 1]).unwrap();
    fs::write(base.join("big.txt"), "x".repeat(1124)).unwrap();
    fs::create_dir_all(base.join(".git")).unwrap();
    fs::write(base.join(".git/config"), "[core]\n\tbare = false\n").unwrap();

    temp_dir
}

/// A small source tree with nested directories
fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path();

    fs::create_dir_all(base.join("src/util")).unwrap();
    fs::create_dir_all(base.join("docs")).unwrap();

    fs::write(
        base.join("src/main.rs"),
        r#"fn main() {
    if 1 < 2 && 3 > 2 {
        println!("Hello, world!");
    }
}
"#,
    )
    .unwrap();

    fs::write(base.join("src/util/mod.rs"), "pub fn helper() {}\n").unwrap();

    fs::write(
        base.join("docs/guide.md"),
        r#"# Guide

| Step | Action |
|------|--------|
| 1    | Build  |

- [x] done
- [ ] todo
"#,
    )
    .unwrap();

    fs::write(base.join("Cargo.toml"), "[package]\nname = \"demo\"\n").unwrap();

    temp_dir
}

fn codescroll(cwd: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("codescroll").unwrap();
    cmd.current_dir(cwd.path());
    cmd.env_remove("CODESCROLL_CONFIG");
    cmd.env_remove("CODESCROLL_FORMAT");
    cmd.env_remove("CODESCROLL_MAX_BYTES");
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("codescroll").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("render"))
        .stdout(predicate::str::contains("scan"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("codescroll").unwrap();
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("codescroll"));
}

#[test]
fn test_render_html_scenario() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();

    let output = codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .args(["--max-bytes", "1024"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).unwrap();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Revision: <code>"));
    assert!(html.contains("Total files: 4 · Rendered: 1 · Skipped: 3"));
    assert!(html.contains("<a href=\"#file-README-md\">README.md</a>"));
    assert!(html.contains("Skipped binaries (1)"));
    assert!(html.contains("Skipped large files (1)"));
    assert!(html.contains("<h1>Hello</h1>"));
    assert!(!html.contains(".git/config"));
}

#[test]
fn test_render_llm_scenario_exact() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .args(["--max-bytes", "1024", "--format", "llm"])
        .assert()
        .success()
        .stdout(predicate::eq(
            "<documents>\n<document index=\"1\">\n<source>README.md</source>\n<document_content>\n# Hello\n\nHi\n</document_content>\n</document>\n</documents>\n",
        ));
}

#[test]
fn test_render_json() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();

    let output = codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .args(["--max-bytes", "1024", "-f", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["total_files"], 4);
    assert_eq!(value["stats"]["rendered"], 1);
    assert_eq!(value["stats"]["skipped_ignored"], 1);
    assert_eq!(value["sections"][0]["relative_path"], "README.md");
}

#[test]
fn test_default_threshold_includes_big_txt() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .args(["-f", "llm"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<source>big.txt</source>"))
        .stdout(predicate::str::contains("<document index=\"2\">"));
}

#[test]
fn test_render_tree_and_markdown() {
    let repo = create_test_repo();
    let cwd = TempDir::new().unwrap();

    let output = codescroll(&cwd).arg("render").arg(repo.path()).output().unwrap();
    assert!(output.status.success());
    let html = String::from_utf8(output.stdout).unwrap();

    // Directories first in the tree
    let docs = html.find("├── docs").unwrap();
    let src = html.find("├── src").unwrap();
    let cargo = html.find("└── Cargo.toml").unwrap();
    assert!(docs < src && src < cargo);

    assert!(html.contains("<table>"));
    assert!(html.contains("type=\"checkbox\""));
    assert!(html.contains("class=\"language-rust\""));
    assert!(html.contains("<span class=\"hl-keyword\">fn</span>"));
    assert!(html.contains("&amp;&amp;"));
    assert!(!html.contains("1 < 2"));
}

#[test]
fn test_render_to_output_file() {
    let repo = create_test_repo();
    let cwd = TempDir::new().unwrap();
    let out = cwd.path().join("out.html");

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Wrote html"));

    let html = fs::read_to_string(&out).unwrap();
    assert!(html.contains("<main id=\"machine-view\" hidden>"));
    assert!(html.contains("src/util/mod.rs"));
}

#[test]
fn test_render_without_style() {
    let repo = create_test_repo();
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .arg("--no-style")
        .assert()
        .success()
        .stdout(predicate::str::contains("<style>").not());
}

#[test]
fn test_decode_failure_does_not_abort() {
    let repo = create_test_repo();
    fs::write(repo.path().join("latin1.txt"), [b'c', b'a', b'f', 0xe9]).unwrap();
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed to render: File is not valid UTF-8"))
        .stdout(predicate::str::contains("src/main.rs"));
}

#[test]
fn test_render_nonexistent_path_fails() {
    let cwd = TempDir::new().unwrap();
    let missing = cwd.path().join("does-not-exist");

    codescroll(&cwd)
        .arg("render")
        .arg(&missing)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to render"));
}

#[test]
fn test_render_file_as_root_fails() {
    let repo = create_test_repo();
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path().join("Cargo.toml"))
        .assert()
        .failure();
}

#[test]
fn test_scan_json_counts() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();

    let output = codescroll(&cwd)
        .arg("scan")
        .arg(repo.path())
        .args(["--max-bytes", "1024", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["total_files"], 4);
    assert_eq!(value["stats"]["rendered"], 1);
    assert_eq!(value["stats"]["skipped_binary"], 1);
    assert_eq!(value["stats"]["skipped_oversize"], 1);
    assert_eq!(value["stats"]["skipped_ignored"], 1);
    assert_eq!(value["included_bytes"], 11);
}

#[test]
fn test_scan_verbose_lists_files() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd)
        .arg("scan")
        .arg(repo.path())
        .args(["--max-bytes", "1024", "-v"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Scan Results"))
        .stdout(predicate::str::contains("main.bin"))
        .stdout(predicate::str::contains(".git/config"));
}

#[test]
fn test_info_command() {
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd)
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("Version"))
        .stdout(predicate::str::contains("51200"))
        .stdout(predicate::str::contains("rust"));
}

#[test]
fn test_init_creates_config() {
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd).arg("init").assert().success();
    let content = fs::read_to_string(cwd.path().join(".codescroll.toml")).unwrap();
    assert!(content.contains("max_bytes = 51200"));

    // Refuses to overwrite without --force
    codescroll(&cwd)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    codescroll(&cwd).args(["init", "--force"]).assert().success();
}

#[test]
fn test_init_yaml() {
    let cwd = TempDir::new().unwrap();

    codescroll(&cwd).args(["init", "-f", "yaml"]).assert().success();
    let content = fs::read_to_string(cwd.path().join(".codescroll.yaml")).unwrap();
    assert!(content.contains("max_bytes: 51200"));
}

#[test]
fn test_config_file_in_working_directory() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join(".codescroll.toml"), "max_bytes = 1024\nformat = \"llm\"\n").unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("<documents>"))
        .stdout(predicate::str::contains("big.txt").not());
}

#[test]
fn test_flags_override_config_and_env() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join(".codescroll.toml"), "format = \"llm\"\n").unwrap();

    let output = codescroll(&cwd)
        .env("CODESCROLL_MAX_BYTES", "1024")
        .arg("render")
        .arg(repo.path())
        .args(["-f", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["stats"]["skipped_oversize"], 1);
}

#[test]
fn test_zero_max_bytes_flag_is_rejected() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();

    for command in ["render", "scan"] {
        codescroll(&cwd)
            .arg(command)
            .arg(repo.path())
            .args(["--max-bytes", "0"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--max-bytes"));
    }
}

#[test]
fn test_zero_max_bytes_in_config_is_rejected() {
    let repo = create_scenario_repo();
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join(".codescroll.toml"), "max_bytes = 0\n").unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_bytes must be at least 1"));
}

#[test]
fn test_invalid_config_fails() {
    let repo = create_test_repo();
    let cwd = TempDir::new().unwrap();
    fs::write(cwd.path().join(".codescroll.toml"), "max_bytes = \"huge\"\n").unwrap();

    codescroll(&cwd)
        .arg("render")
        .arg(repo.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load configuration"));
}
