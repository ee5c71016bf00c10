use assert_cmd::Command;
use predicates::prelude::*;

fn hanna(session_dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hanna").unwrap();
    cmd.env("HANNA_SESSION_FILE", session_dir.path().join("session.json"))
        .env("HANNA_API_BASE_URL", "http://127.0.0.1:9/api")
        .env_remove("HANNA_PASSWORD");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let dir = tempfile::tempdir().unwrap();
    hanna(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("whoami"));
}

#[test]
fn test_whoami_without_session_fails() {
    let dir = tempfile::tempdir().unwrap();
    hanna(&dir)
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_unknown_resource_is_rejected_by_parser() {
    let dir = tempfile::tempdir().unwrap();
    hanna(&dir)
        .args(["list", "invoices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown resource"));
}

#[test]
fn test_create_requires_json_object() {
    let dir = tempfile::tempdir().unwrap();
    hanna(&dir)
        .args(["create", "contacts", "--data", "[1]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--data must be a JSON object"));
}

#[test]
fn test_local_logout_without_session_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    hanna(&dir)
        .args(["logout", "--local"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Logged out"));
}
