//! Release lookup against a stub GitHub API.

use noidea::core::update::{check_for_update_at, UpdateCheckResult};
use semver::Version;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const RELEASES_PATH: &str = "/repos/AccursedGalaxy/noidea/releases/latest";

async fn server_with_release(body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn newer_release_is_reported() {
    let server = server_with_release(json!({
        "tag_name": "v9.1.0",
        "html_url": "https://github.com/AccursedGalaxy/noidea/releases/tag/v9.1.0",
        "prerelease": false,
        "draft": false
    }))
    .await;

    let current = Version::new(0, 4, 2);
    let result = check_for_update_at(&server.uri(), &current).await.unwrap();
    assert_eq!(
        result,
        UpdateCheckResult::Available {
            version: Version::new(9, 1, 0),
            url: "https://github.com/AccursedGalaxy/noidea/releases/tag/v9.1.0".to_string(),
        }
    );
}

#[tokio::test]
async fn same_version_is_up_to_date() {
    let server = server_with_release(json!({ "tag_name": "v0.4.2" })).await;

    let result = check_for_update_at(&server.uri(), &Version::new(0, 4, 2))
        .await
        .unwrap();
    assert_eq!(result, UpdateCheckResult::UpToDate);
}

#[tokio::test]
async fn failed_lookup_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(RELEASES_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(check_for_update_at(&server.uri(), &Version::new(0, 4, 2))
        .await
        .is_err());
}
