use crate::support::{StubServer, runs_body};
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write_config(dir: &Path, api_url: &str, workflows: &str) {
    fs::write(
        dir.join("wfdash.yml"),
        format!(
            r#"version: 1

dashboard:
  title: "Test Dashboard"
  time_zone: "America/New_York"

api:
  url: "{api_url}"
  timeout: "5s"

workflows:
  - group: LSDB
    owner: astronomy-commons
    repo: lsdb
    workflows: [{workflows}]
"#
        ),
    )
    .expect("write config");
}

#[test]
fn generate_writes_html_dashboard() {
    let dir = tempdir().expect("tempdir");
    let server = StubServer::serve(vec![
        (200, runs_body(Some("success"), "2023-01-01T12:00:00Z")),
        (404, r#"{"message":"Not Found"}"#.to_string()),
    ]);
    write_config(dir.path(), &server.url, "smoke-test.yml, asv-nightly.yml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .args(["--no-color", "generate", "tok123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote index.html"))
        .stderr(predicate::str::contains(
            "https://github.com/astronomy-commons/lsdb/actions/workflows/asv-nightly.yml",
        ));

    let requests = server.finish();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer tok123"));

    let html = fs::read_to_string(dir.path().join("index.html")).expect("read index.html");
    assert!(html.contains("<title>Test Dashboard</title>"));
    assert!(html.contains("<td class=\"green-icon\">✓</td>"));
    assert!(html.contains("<td>07:00 Jan 01, 2023</td>"));
    assert!(html.contains("<td>404</td><td></td>"));
    assert!(html.contains("<p>Last Updated "));
    assert!(html.trim_end().ends_with("</body></html>"));
    assert!(!dir.path().join("README.md").exists());
}

#[test]
fn generate_both_formats_reports_json_summary() {
    let dir = tempdir().expect("tempdir");
    let server = StubServer::serve(vec![(
        200,
        runs_body(Some("failure"), "2023-01-01T12:00:00Z"),
    )]);
    write_config(dir.path(), &server.url, "smoke-test.yml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    let out = cmd
        .current_dir(dir.path())
        .args([
            "generate",
            "tok",
            "--format",
            "both",
            "--markdown-out",
            "STATUS.md",
            "--time-zone",
            "none",
            "--json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    server.finish();

    let parsed: Value = serde_json::from_slice(&out).expect("generate json");
    assert_eq!(parsed["documents"][0], "index.html");
    assert_eq!(parsed["documents"][1], "STATUS.md");
    assert_eq!(parsed["rows"], 1);
    assert_eq!(parsed["succeeded"], 0);
    assert_eq!(parsed["warnings"], 1);

    let markdown = fs::read_to_string(dir.path().join("STATUS.md")).expect("read markdown");
    assert!(markdown.starts_with("Last Updated "));
    assert!(markdown.contains(
        "| ⚠ | lsdb | [smoke-test.yml](https://github.com/astronomy-commons/lsdb/actions/workflows/smoke-test.yml) | failure | 2023-01-01T12:00:00Z |"
    ));
}

#[test]
fn generate_reads_token_from_environment() {
    let dir = tempdir().expect("tempdir");
    let server = StubServer::serve(vec![(
        200,
        runs_body(Some("success"), "2023-01-01T12:00:00Z"),
    )]);
    write_config(dir.path(), &server.url, "smoke-test.yml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .env("GITHUB_TOKEN", "from-env")
        .args(["generate", "--json"])
        .assert()
        .success();

    let requests = server.finish();
    assert!(requests[0].to_ascii_lowercase().contains("authorization: bearer from-env"));
}

#[test]
fn generate_without_token_is_usage_error() {
    let dir = tempdir().expect("tempdir");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .env_remove("GITHUB_TOKEN")
        .args(["--no-color", "generate"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("GitHub token is required"));

    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn generate_malformed_response_fails_and_leaves_partial_output() {
    let dir = tempdir().expect("tempdir");
    let server = StubServer::serve(vec![
        (200, runs_body(Some("success"), "2023-01-01T12:00:00Z")),
        (200, r#"{"total_count":0}"#.to_string()),
    ]);
    write_config(
        dir.path(),
        &server.url,
        "smoke-test.yml, asv-nightly.yml, build-documentation.yml",
    );

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .args(["--no-color", "generate", "tok"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed response"));
    server.finish();

    let html = fs::read_to_string(dir.path().join("index.html")).expect("read index.html");
    assert_eq!(html.matches("<tr><td").count(), 1);
    assert!(!html.contains("</table>"));
}

#[test]
fn generate_applies_daylight_time_and_zone_override() {
    let dir = tempdir().expect("tempdir");
    let server = StubServer::serve(vec![
        (200, runs_body(Some("success"), "2023-07-01T12:00:00Z")),
        (200, runs_body(Some("success"), "2023-07-01T12:00:00Z")),
    ]);
    write_config(dir.path(), &server.url, "smoke-test.yml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .args(["generate", "tok"])
        .assert()
        .success();

    let html = fs::read_to_string(dir.path().join("index.html")).expect("read index.html");
    assert!(html.contains("<td>08:00 Jul 01, 2023</td>"));

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .args(["generate", "tok", "--time-zone", "-05:00"])
        .assert()
        .success();
    server.finish();

    let html = fs::read_to_string(dir.path().join("index.html")).expect("read index.html");
    assert!(html.contains("<td>07:00 Jul 01, 2023</td>"));
}

#[test]
fn generate_rejects_unknown_time_zone() {
    let dir = tempdir().expect("tempdir");
    write_config(dir.path(), "http://127.0.0.1:9", "smoke-test.yml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .args(["--no-color", "generate", "tok", "--time-zone", "Mars/Olympus_Mons"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--time-zone"));

    assert!(!dir.path().join("index.html").exists());
}

#[test]
fn list_with_missing_config_is_usage_error() {
    let dir = tempdir().expect("tempdir");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .args(["--no-color", "list", "--config", "missing.yml"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn list_with_unreadable_config_is_internal_error() {
    let dir = tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("conf.yml")).expect("create dir");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    cmd.current_dir(dir.path())
        .args(["--no-color", "list", "--config", "conf.yml"])
        .assert()
        .failure()
        .code(3)
        .stderr(predicate::str::contains("read config"));
}

#[test]
fn init_then_list_shows_builtin_workflows() {
    let dir = tempdir().expect("tempdir");

    let mut init = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    init.current_dir(dir.path())
        .args(["--no-color", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("created ./wfdash.yml"));

    let mut again = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    again
        .current_dir(dir.path())
        .args(["init"])
        .assert()
        .failure()
        .code(2);

    let mut list = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    let out = list
        .current_dir(dir.path())
        .args(["list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: Value = serde_json::from_slice(&out).expect("list json");
    let items = parsed.as_array().expect("array");
    assert_eq!(items.len(), 27);
    assert_eq!(items[0]["repo"], "asv-formatter");
    assert_eq!(
        items[0]["url"],
        "https://github.com/lincc-frameworks/asv-formatter/actions/workflows/smoke-test.yml"
    );
}

#[test]
fn validate_json_reports_valid_config() {
    let dir = tempdir().expect("tempdir");
    write_config(dir.path(), "https://api.github.com", "smoke-test.yml");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    let out = cmd
        .current_dir(dir.path())
        .args(["validate", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let parsed: Value = serde_json::from_slice(&out).expect("validate json");
    assert_eq!(parsed["valid"], true);
    assert_eq!(parsed["config"], "./wfdash.yml");
    assert_eq!(parsed["workflows"], 1);
    assert!(parsed.get("issues").is_none());
}

#[test]
fn validate_json_reports_invalid_config_and_fails() {
    let dir = tempdir().expect("tempdir");
    fs::write(
        dir.path().join("wfdash.yml"),
        r#"version: 1

workflows:
  - owner: astronomy-commons
    repo: lsdb
    workflows: [smoke-test.txt]
"#,
    )
    .expect("write config");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wfdash");
    let out = cmd
        .current_dir(dir.path())
        .args(["validate", "--json"])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .stdout
        .clone();

    let parsed: Value = serde_json::from_slice(&out).expect("validate json");
    assert_eq!(parsed["valid"], false);
    assert_eq!(parsed["issues"][0]["field"], "workflows[0].workflows[0]");
    assert!(parsed["error"].as_str().is_some());
}
