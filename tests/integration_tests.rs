//! Integration tests for the Transifex language sync
//!
//! These tests run the full sync against a mocked Transifex API and verify
//! which language additions reach the server.

use std::time::Duration;
use wiremock::{
    matchers::{body_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use tx_language_sync::{
    config::Config,
    error::TransifexError,
    languages::ExclusionMode,
    reconcile,
    retry::RetryConfig,
    transifex::TransifexClient,
};

// ==================== Test Helpers ====================

fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::new("test-token");
    config.api_url = server.uri();
    config
}

fn create_client(config: &Config) -> TransifexClient {
    TransifexClient::new(config)
        .expect("client")
        .with_retry(RetryConfig::new(2, Duration::from_millis(5)))
}

fn project_id(slug: &str) -> String {
    format!("o:hisp-uio:p:{}", slug)
}

/// Mount the project listing plus one languages endpoint per project
async fn mount_organization(server: &MockServer, projects: Vec<(&str, &str, Vec<&str>)>) {
    let data: Vec<serde_json::Value> = projects
        .iter()
        .map(|(slug, name, _)| {
            serde_json::json!({
                "type": "projects",
                "id": project_id(slug),
                "attributes": { "name": name, "slug": slug }
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/projects"))
        .and(query_param("filter[organization]", "o:hisp-uio"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": data,
            "links": { "next": null }
        })))
        .expect(1)
        .mount(server)
        .await;

    for (slug, _, codes) in &projects {
        let languages: Vec<serde_json::Value> = codes
            .iter()
            .map(|code| {
                serde_json::json!({
                    "type": "languages",
                    "id": format!("l:{}", code),
                    "attributes": { "code": code, "name": code }
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(path(format!("/projects/{}/languages", project_id(slug))))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "data": languages })),
            )
            .mount(server)
            .await;
    }
}

async fn expect_addition(server: &MockServer, slug: &str, language_id: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!(
            "/projects/{}/relationships/languages",
            project_id(slug)
        )))
        .and(body_json(serde_json::json!({
            "data": [{ "type": "languages", "id": language_id }]
        })))
        .respond_with(ResponseTemplate::new(204))
        .expect(times)
        .mount(server)
        .await;
}

async fn expect_no_additions(server: &MockServer, slug: &str) {
    Mock::given(method("POST"))
        .and(path(format!(
            "/projects/{}/relationships/languages",
            project_id(slug)
        )))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(server)
        .await;
}

// ==================== Sync Tests ====================

#[tokio::test]
async fn test_sync_adds_missing_languages_only_to_matching_projects() {
    let server = MockServer::start().await;
    mount_organization(
        &server,
        vec![
            ("andr-1", "ANDR-1", vec!["en", "fr"]),
            ("app-2", "APP-2", vec!["en"]),
            ("other-3", "OTHER-3", vec!["de"]),
        ],
    )
    .await;

    expect_addition(&server, "app-2", "l:fr", 1).await;
    expect_no_additions(&server, "andr-1").await;
    expect_no_additions(&server, "other-3").await;

    let config = create_test_config(&server);
    let report = reconcile::sync(&create_client(&config), &config)
        .await
        .expect("sync");

    assert_eq!(report.projects_total, 3);
    assert_eq!(report.projects_matched, 2);
    assert_eq!(
        report.global.iter().collect::<Vec<_>>(),
        vec!["l:en", "l:fr"]
    );
    assert_eq!(report.added, 1);
    assert!(report.is_success());
}

#[tokio::test]
async fn test_sync_enforce_mode_never_adds_excluded_locale() {
    let server = MockServer::start().await;
    mount_organization(
        &server,
        vec![
            ("andr-1", "ANDROID: Capture", vec!["en", "uz", "fr"]),
            ("app-2", "APP: Dashboard", vec!["en"]),
        ],
    )
    .await;

    expect_addition(&server, "app-2", "l:fr", 1).await;
    expect_addition(&server, "app-2", "l:uz", 0).await;

    let mut config = create_test_config(&server);
    config.exclusion_mode = ExclusionMode::Enforce;

    let report = reconcile::sync(&create_client(&config), &config)
        .await
        .expect("sync");

    assert!(!report.global.contains("l:uz"));
    assert_eq!(report.added, 1);
}

#[tokio::test]
async fn test_sync_legacy_mode_propagates_excluded_locale() {
    let server = MockServer::start().await;
    mount_organization(
        &server,
        vec![
            ("andr-1", "ANDROID: Capture", vec!["en", "uz"]),
            ("app-2", "APP: Dashboard", vec!["en"]),
        ],
    )
    .await;

    expect_addition(&server, "app-2", "l:uz", 1).await;

    let config = create_test_config(&server);
    let report = reconcile::sync(&create_client(&config), &config)
        .await
        .expect("sync");

    assert!(report.global.contains("l:uz"));
    assert_eq!(report.added, 1);
}

#[tokio::test]
async fn test_sync_dry_run_sends_no_posts() {
    let server = MockServer::start().await;
    mount_organization(
        &server,
        vec![
            ("andr-1", "ANDR-1", vec!["en", "fr", "es"]),
            ("app-2", "APP-2", vec!["en"]),
        ],
    )
    .await;

    expect_no_additions(&server, "app-2").await;

    let mut config = create_test_config(&server);
    config.dry_run = true;

    let report = reconcile::sync(&create_client(&config), &config)
        .await
        .expect("sync");

    assert!(report.dry_run);
    assert_eq!(report.planned, 2);
    assert_eq!(report.added, 0);
}

#[tokio::test]
async fn test_sync_continues_after_rejected_addition() {
    let server = MockServer::start().await;
    mount_organization(
        &server,
        vec![
            ("andr-1", "ANDR-1", vec!["en", "fr", "es"]),
            ("app-2", "APP-2", vec!["en"]),
        ],
    )
    .await;

    Mock::given(method("POST"))
        .and(path(format!(
            "/projects/{}/relationships/languages",
            project_id("app-2")
        )))
        .and(body_json(serde_json::json!({
            "data": [{ "type": "languages", "id": "l:es" }]
        })))
        .respond_with(ResponseTemplate::new(400).set_body_string("language not allowed"))
        .expect(1)
        .mount(&server)
        .await;
    expect_addition(&server, "app-2", "l:fr", 1).await;

    let config = create_test_config(&server);
    let report = reconcile::sync(&create_client(&config), &config)
        .await
        .expect("sync");

    assert_eq!(report.planned, 2);
    assert_eq!(report.added, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].project, "APP-2");
    assert_eq!(report.failures[0].language_id, "l:es");
    assert!(report.failures[0].error.contains("language not allowed"));
    assert!(!report.is_success());
}

// ==================== Error Handling Tests ====================

#[tokio::test]
async fn test_sync_aborts_on_invalid_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let err = reconcile::sync(&create_client(&config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, TransifexError::Auth { status: 401, .. }));
}

#[tokio::test]
async fn test_sync_aborts_when_project_languages_unavailable() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                { "type": "projects", "id": project_id("andr-1"), "attributes": { "name": "ANDR-1" } }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/projects/{}/languages", project_id("andr-1"))))
        .respond_with(ResponseTemplate::new(502))
        .expect(2)
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let err = reconcile::sync(&create_client(&config), &config)
        .await
        .unwrap_err();

    assert!(matches!(err, TransifexError::Server { status: 502, .. }));
}
