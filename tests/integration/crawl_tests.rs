//! Integration tests for the harvester
//!
//! These tests use wiremock to serve a fake user listing and run the full
//! probe → crawl → export cycle against the real HTTP fetcher.

use rep_roster::config::Config;
use rep_roster::crawler::Coordinator;
use rep_roster::output::CSV_HEADER;
use rep_roster::{PipelineState, RosterError};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, csv_path: &str) -> Config {
    let mut config = Config::default();
    config.site.root_url = format!("{}/users", base_url);
    config.site.page_url_template =
        format!("{}/users/list?page={{page}}&tab=reputation", base_url);
    config.crawler.max_concurrent_fetches = 5;
    config.crawler.request_timeout_secs = 5;
    config.output.csv_path = csv_path.to_string();
    config
}

fn pagination_page(labels: &[&str]) -> String {
    let items: String = labels
        .iter()
        .map(|l| {
            format!(
                r#"<a class="s-pagination--item js-pagination-item" href="?page={0}">{0}</a>"#,
                l
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="s-pagination site1 themed">{}</div></body></html>"#,
        items
    )
}

fn user_card(name: &str, location: &str, reputation: &str, tags: &[&str]) -> String {
    let tags: String = tags
        .iter()
        .map(|t| format!(r#"<a href="/questions/tagged/{0}">{0}</a>"#, t))
        .collect();
    format!(
        r#"<div class="user-info user-hover">
            <div class="user-gravatar48"><a href="/users/1"><div class="gravatar-wrapper-48"><img src="a.png"></div></a></div>
            <div class="user-details">
                <a href="/users/1/x">{}</a>
                <span class="user-location">{}</span>
                <div class="-flair"><span class="reputation-score" title="reputation score">{}</span></div>
            </div>
            <div class="user-tags">{}</div>
        </div>"#,
        name, location, reputation, tags
    )
}

async fn mount_listing(server: &MockServer, pages: &[(&str, String)]) {
    for (page, body) in pages {
        Mock::given(method("GET"))
            .and(path("/users/list"))
            .and(query_param("page", *page))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body.clone())
                    .insert_header("content-type", "text/html"),
            )
            .expect(1)
            .mount(server)
            .await;
    }
}

#[tokio::test]
async fn test_full_harvest() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = dir.path().join("data.csv");

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(pagination_page(&["1", "2", "…", "3", "Next"]))
                .insert_header("content-type", "text/html"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_listing(
        &mock_server,
        &[
            (
                "1",
                format!(
                    "<html><body>{}{}</body></html>",
                    user_card(
                        "Ada",
                        "London, UK",
                        "9,365",
                        &["rust", "c", "haskell", "ocaml", "lisp"]
                    ),
                    user_card("Grace", "", "9.7k", &["cobol"])
                ),
            ),
            (
                "2",
                format!(
                    "<html><body>{}</body></html>",
                    user_card("Linus", "Portland", "100k", &[])
                ),
            ),
            (
                "3",
                format!(
                    "<html><body>{}</body></html>",
                    user_card("Ken", "", "42", &["go", "c"])
                ),
            ),
        ],
    )
    .await;

    let config = create_test_config(&base_url, &csv_path.display().to_string());
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Harvest failed");

    assert_eq!(coordinator.state(), PipelineState::Done);
    assert_eq!(report.stats.pages_discovered, 3);
    assert_eq!(report.stats.pages_succeeded, 3);
    assert_eq!(report.stats.records, 4);
    assert_eq!(report.stats.parse_failures, 0);

    let content = std::fs::read_to_string(&csv_path).expect("Failed to read output");
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[0], CSV_HEADER);

    // Ids are sequential regardless of page completion order
    for (index, line) in lines[1..].iter().enumerate() {
        assert!(line.starts_with(&format!("{},\"", index + 1)), "bad line: {}", line);
    }

    let body = lines[1..].join("\n");
    assert!(body.contains(r#""Ada","London, UK",9365,"rust","c","haskell""#));
    assert!(body.contains(r#""Grace","",9700,"cobol","","""#));
    assert!(body.contains(r#""Linus","Portland",100000,"","","""#));
    assert!(body.contains(r#""Ken","",42,"go","c","""#));
}

#[tokio::test]
async fn test_listing_without_pagination() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = dir.path().join("data.csv");

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>no pager</body></html>"),
        )
        .mount(&mock_server)
        .await;

    mount_listing(
        &mock_server,
        &[("1", user_card("Solo", "Moon", "1", &["asm"]))],
    )
    .await;

    let config = create_test_config(&base_url, &csv_path.display().to_string());
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Harvest failed");

    assert_eq!(report.stats.pages_discovered, 1);
    let content = std::fs::read_to_string(&csv_path).expect("Failed to read output");
    assert_eq!(
        content,
        format!("{}\n1,\"Solo\",\"Moon\",1,\"asm\",\"\",\"\"\n", CSV_HEADER)
    );
}

#[tokio::test]
async fn test_probe_failure_writes_nothing() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = dir.path().join("data.csv");

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    // No page may be requested after a failed probe
    Mock::given(method("GET"))
        .and(path("/users/list"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &csv_path.display().to_string());
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let err = coordinator.run().await.expect_err("Probe should fail");

    assert!(matches!(err, RosterError::Probe { .. }));
    assert_eq!(coordinator.state(), PipelineState::Failed);
    assert!(!csv_path.exists());
}

#[tokio::test]
async fn test_failed_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = dir.path().join("data.csv");

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pagination_page(&["1", "2"])))
        .mount(&mock_server)
        .await;

    mount_listing(&mock_server, &[("1", user_card("Kept", "", "7", &[]))]).await;

    Mock::given(method("GET"))
        .and(path("/users/list"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &csv_path.display().to_string());
    let mut coordinator = Coordinator::new(config).expect("Failed to create coordinator");
    let report = coordinator.run().await.expect("Harvest failed");

    assert_eq!(report.stats.pages_failed, 1);
    assert_eq!(report.stats.records, 1);
    let content = std::fs::read_to_string(&csv_path).expect("Failed to read output");
    assert_eq!(content.lines().count(), 2);
}

#[tokio::test]
async fn test_rerun_overwrites_output() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    let dir = TempDir::new().expect("Failed to create temp dir");
    let csv_path = dir.path().join("data.csv");

    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(ResponseTemplate::new(200).set_body_string(pagination_page(&["1"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/users/list"))
        .respond_with(ResponseTemplate::new(200).set_body_string(user_card("Same", "", "3", &[])))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&base_url, &csv_path.display().to_string());

    Coordinator::new(config.clone())
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("First harvest failed");
    let first = std::fs::read(&csv_path).expect("Failed to read output");

    Coordinator::new(config)
        .expect("Failed to create coordinator")
        .run()
        .await
        .expect("Second harvest failed");
    let second = std::fs::read(&csv_path).expect("Failed to read output");

    assert_eq!(first, second);
}
