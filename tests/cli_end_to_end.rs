#![deny(clippy::all, clippy::pedantic)]

use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use std::io::Write;

fn presswire() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("presswire"));
    cmd.env_remove("PRESSWIRE_CONFIG_FILE")
        .env_remove("PRESSWIRE__WORDPRESS__BASE_URL")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn categories_print_normalized_json() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET")
            .path("/categories")
            .query_param("per_page", "100")
            .query_param("hide_empty", "false");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":4,"name":"Databricks","slug":"databricks","count":9},{"id":5}]"#);
    });

    let assert = presswire()
        .arg("--base-url")
        .arg(server.base_url())
        .arg("categories")
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains("\"slug\": \"databricks\""));
    assert!(output.contains("\"name\": \"Unnamed Category\""));
    mock.assert();
}

#[test]
fn posts_filter_by_tag_slug() {
    let server = MockServer::start();
    let tags = server.mock(|when, then| {
        when.method("GET").path("/tags");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":30,"name":"S3","slug":"s3"}]"#);
    });
    let posts = server.mock(|when, then| {
        when.method("GET").path("/posts").query_param("tags", "30");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"[{"id":8,"slug":"tagged-s3","title":{"rendered":"Tagged"}}]"#);
    });

    presswire()
        .arg("--base-url")
        .arg(server.base_url())
        .arg("posts")
        .arg("--tag")
        .arg("S3")
        .assert()
        .success()
        .stdout(contains("\"slug\": \"tagged-s3\""));
    tags.assert();
    posts.assert();
}

#[test]
fn base_url_can_come_from_environment() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/posts").query_param("slug", "hello");
        then.status(200)
            .body(r#"[{"id":1,"slug":"hello","title":{"rendered":"Hello"}}]"#);
    });

    presswire()
        .env("PRESSWIRE__WORDPRESS__BASE_URL", server.base_url())
        .arg("post")
        .arg("hello")
        .assert()
        .success()
        .stdout(contains("\"title\": \"Hello\""))
        .stdout(contains("\"readTime\": \"1 min read\""));
    mock.assert();
}

#[test]
fn config_file_supplies_base_url() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("GET").path("/posts/3/related");
        then.status(200).body("[]");
    });

    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("tmp config");
    writeln!(file, "[wordpress]\nbase_url = \"{}\"", server.base_url()).expect("write config");

    presswire()
        .arg("--config-file")
        .arg(file.path())
        .arg("related")
        .arg("3")
        .assert()
        .success()
        .stdout(contains("[]"));
    mock.assert();
}

#[test]
fn missing_post_fails_with_message() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(200).body("[]");
    });

    presswire()
        .arg("--base-url")
        .arg(server.base_url())
        .arg("post")
        .arg("ghost")
        .assert()
        .failure()
        .stderr(contains("not found"));
}

#[test]
fn health_fails_when_site_is_down() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("GET").path("/posts");
        then.status(502);
    });

    presswire()
        .arg("--base-url")
        .arg(server.base_url())
        .arg("health")
        .assert()
        .failure()
        .stdout(contains("\"healthy\": false"));
}

#[test]
fn invalid_timeout_is_rejected() {
    presswire()
        .arg("--timeout-ms")
        .arg("0")
        .arg("health")
        .assert()
        .failure()
        .stderr(contains("wordpress.timeout_ms"));
}
