//! CLI smoke tests for the `interview` binary.

mod common;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

use common::MockBackend;

/// `interview` command isolated from the caller's environment and config dir.
fn interview(dir: &TempDir) -> Command {
    let mut cmd = cargo_bin_cmd!("interview");
    cmd.current_dir(dir.path())
        .env("XDG_CONFIG_HOME", dir.path().join("xdg"))
        .env_remove("INTERVIEW_BASE_URL")
        .env_remove("API_BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

// =============================================================================
// Basic CLI Tests
// =============================================================================

mod cli_basics {
    use super::*;

    #[test]
    fn test_help() {
        let dir = TempDir::new().unwrap();
        interview(&dir)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("run"))
            .stdout(predicate::str::contains("report"))
            .stdout(predicate::str::contains("config"));
    }

    #[test]
    fn test_version() {
        let dir = TempDir::new().unwrap();
        interview(&dir)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("interview"));
    }

    #[test]
    fn test_run_help_lists_offer_flags() {
        let dir = TempDir::new().unwrap();
        interview(&dir)
            .args(["run", "--help"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--tech-skills"))
            .stdout(predicate::str::contains("--yes"));
    }
}

// =============================================================================
// Config Command Tests
// =============================================================================

mod config_command {
    use super::*;

    #[test]
    fn test_init_creates_file() {
        let dir = TempDir::new().unwrap();
        interview(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Created interview.toml"));

        let content = fs::read_to_string(dir.path().join("interview.toml")).unwrap();
        assert!(content.contains("[backend]"));
        assert!(content.contains("max_attempts = 20"));
    }

    #[test]
    fn test_init_does_not_overwrite() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("interview.toml"), "[candidate]\nrole = \"Auditor\"\n").unwrap();
        interview(&dir)
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));

        let content = fs::read_to_string(dir.path().join("interview.toml")).unwrap();
        assert!(content.contains("Auditor"));
    }

    #[test]
    fn test_show_defaults_without_file() {
        let dir = TempDir::new().unwrap();
        interview(&dir)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "http://localhost:8000/api/interview",
            ))
            .stdout(predicate::str::contains("config init"));
    }

    #[test]
    fn test_show_applies_env_and_cli_overrides() {
        let dir = TempDir::new().unwrap();
        interview(&dir)
            .env("API_BASE_URL", "http://env-host:9000")
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "http://env-host:9000/api/interview",
            ))
            .stdout(predicate::str::contains("(from environment)"));

        interview(&dir)
            .env("API_BASE_URL", "http://env-host:9000")
            .args(["--base-url", "http://cli-host/api/interview", "config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains(
                "base_url = \"http://cli-host/api/interview\"",
            ))
            .stdout(predicate::str::contains("(from --base-url)"))
            .stdout(predicate::str::contains("(from environment)").not());
    }

    #[test]
    fn test_validate_reports_warnings() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("interview.toml"),
            "[polling]\nmax_attempts = 0\n",
        )
        .unwrap();
        interview(&dir)
            .args(["config", "validate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("max_attempts"));
    }

    #[test]
    fn test_invalid_config_file_fails() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("interview.toml"), "[polling\n").unwrap();
        interview(&dir)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("interview.toml"));
    }

    #[test]
    fn test_explicit_missing_config_fails() {
        let dir = TempDir::new().unwrap();
        interview(&dir)
            .args(["--config", "missing.toml", "config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Config file not found"));
    }
}

// =============================================================================
// Report Command Tests
// =============================================================================

mod report_command {
    use super::*;

    #[test]
    fn test_report_against_unreachable_backend_fails() {
        let dir = TempDir::new().unwrap();
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let base_url = format!("http://127.0.0.1:{}/api/interview", port);
        interview(&dir)
            .args(["--base-url", base_url.as_str(), "report", "abc123"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to fetch report"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_report_prints_backend_transcript() {
        let backend = MockBackend::start().await;
        backend
            .seed_session(
                "abc123",
                &[("Introduce yourself", "I audit ledgers"), ("Explain accruals", "[skipped]")],
            )
            .await;
        let base_url = backend.base_url();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("report.txt");
        let out_arg = out.display().to_string();

        let dir = tokio::task::spawn_blocking(move || {
            interview(&dir)
                .args([
                    "--base-url",
                    base_url.as_str(),
                    "report",
                    "abc123",
                    "--output",
                    out_arg.as_str(),
                ])
                .assert()
                .success();
            dir
        })
        .await
        .unwrap();

        let text = fs::read_to_string(&out).unwrap();
        assert!(text.contains("Session: abc123"));
        assert!(text.contains("1. Introduce yourself\n   Answer: I audit ledgers"));
        assert!(text.contains("Status: in progress"));
        drop(dir);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_report_for_unknown_session_fails() {
        let backend = MockBackend::start().await;
        let base_url = backend.base_url();
        let dir = TempDir::new().unwrap();

        tokio::task::spawn_blocking(move || {
            interview(&dir)
                .args(["--base-url", base_url.as_str(), "report", "nope"])
                .assert()
                .failure()
                .stderr(predicate::str::contains("404"));
        })
        .await
        .unwrap();
    }
}
