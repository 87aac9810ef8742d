//! End-to-end CLI tests for the iiif-downloader binary.
//!
//! The binary is pointed at a mock server through a config file under a
//! temporary `XDG_CONFIG_HOME`.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const VIEWER_URL: &str = "https://iiif.lib.harvard.edu/manifests/view/ids:12345";

/// Writes a config file and returns the config home holding it.
fn config_home(server: &MockServer, output_dir: &Path) -> TempDir {
    let home = TempDir::new().expect("failed to create config home");
    let dir = home.path().join("iiif-downloader");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.toml"),
        format!(
            "manifest_base = \"{}/manifests/\"\noutput_dir = \"{}\"\nmax_retries = 1\n",
            server.uri(),
            output_dir.display()
        ),
    )
    .unwrap();
    home
}

fn command(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("iiif-downloader").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    cmd
}

async fn mount_object(server: &MockServer, image_status: u16) {
    let thumbnail = format!("{}/iiif/12345/full/,150/0/default.jpg", server.uri());
    let canvases = ["(seq. 1)", "(seq. 2)"]
        .iter()
        .map(|label| {
            json!({
                "label": label,
                "width": 800,
                "height": 1200,
                "thumbnail": { "@id": thumbnail },
            })
        })
        .collect::<Vec<_>>();
    Mock::given(method("GET"))
        .and(path("/manifests/ids:12345"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "label": "Test Book",
            "sequences": [{ "canvases": canvases }],
        })))
        .mount(server)
        .await;

    // Both canvases share one image URL; the first request always succeeds.
    Mock::given(method("GET"))
        .and(path("/iiif/12345/0,0,800,1200/800,/0/default.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0_u8; 1_572_864]))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/iiif/12345/0,0,800,1200/800,/0/default.jpg"))
        .respond_with(ResponseTemplate::new(image_status).set_body_bytes(vec![0_u8; 1_572_864]))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_binary_downloads_object_and_exits_zero() {
    let server = MockServer::start().await;
    mount_object(&server, 200).await;
    let output = TempDir::new().unwrap();
    let home = config_home(&server, output.path());

    command(home.path())
        .args(["--url", VIEWER_URL])
        .assert()
        .code(0)
        .stdout(predicate::str::contains("12345-(seq.-1)-800x1200.jpg  ==>  1.50 MB"))
        .stdout(predicate::str::contains("12345-(seq.-2)-800x1200.jpg  ==>  1.50 MB"))
        .stdout(predicate::str::contains("Test Book").not())
        .stderr(predicate::str::contains("Test Book"))
        .stderr(predicate::str::contains("2 image(s) ==> "));

    let dir = output.path().join("12345-Test-Book");
    assert!(dir.join("manifest.json").is_file());
    assert!(dir.join("12345-(seq.-2)-800x1200.jpg").is_file());
}

#[tokio::test]
async fn test_binary_partial_download_exits_one() {
    let server = MockServer::start().await;
    mount_object(&server, 404).await;
    let output = TempDir::new().unwrap();
    let home = config_home(&server, output.path());

    command(home.path())
        .args(["--url", VIEWER_URL])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("12345-(seq.-1)-800x1200.jpg"))
        .stderr(predicate::str::contains("12345-(seq.-2)-800x1200.jpg"));
}

#[tokio::test]
async fn test_binary_manifest_404_exits_two_without_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/manifests/ids:12345"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let output = TempDir::new().unwrap();
    let home = config_home(&server, output.path());

    command(home.path())
        .args(["--url", VIEWER_URL])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("404"));

    assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
}

#[test]
fn test_binary_invalid_url_exits_two() {
    let home = TempDir::new().unwrap();
    command(home.path())
        .args(["--url", "https://example.com/not-a-manifest"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Suggestion"));
}

#[test]
fn test_binary_missing_url_is_usage_error() {
    let home = TempDir::new().unwrap();
    command(home.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn test_binary_help_shows_sample() {
    let home = TempDir::new().unwrap();
    command(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("sample: https://iiif.lib.harvard.edu"));
}

#[test]
fn test_binary_invalid_config_exits_two() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("iiif-downloader");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "concurrency = 4\n").unwrap();

    command(home.path())
        .args(["--url", VIEWER_URL])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Unknown configuration key"));
}
