//! Integration tests for the export crawl
//!
//! These tests use wiremock to stand in for the listing site and drive the
//! real HTTP fetcher through the full pagination cycle.

use tempfile::tempdir;
use url::Url;
use vndb_export::config::Config;
use vndb_export::crawler::{crawl, Coordinator, ListKind, TableTarget};
use vndb_export::output::{write_export_file, UTF8_BOM};
use vndb_export::state::CrawlState;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LIST_PATH: &str = "/u2/ulist";

/// Creates a test configuration pointed at the mock server
fn create_test_config(host: &str) -> Config {
    let mut config = Config::default();
    config.target.host = host.to_string();
    config.fetch.retry_delay_ms = 0;
    config.fetch.timeout_secs = 5;
    config
}

/// Renders a user list page with the given titles
fn list_page(titles: &[&str], next_href: Option<&str>) -> String {
    let rows: String = titles
        .iter()
        .enumerate()
        .map(|(i, title)| {
            format!(
                "<tr><td>{}/{}</td><td>{} 👁</td><td>Playing▾</td></tr>",
                i + 1,
                titles.len(),
                title
            )
        })
        .collect();
    let next = next_href
        .map(|href| format!(r#"<a href="{}" rel="next">next ›</a>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><head><title>List</title></head><body>
        <div class="browsetabs"><a href="{path}?vnlist=0">All</a>{next}</div>
        <article class="ulist browse">
          <table>
            <thead><tr><td>Opt</td><td>Title ▴▾</td><td>Labels</td></tr></thead>
            <tbody>{rows}</tbody>
          </table>
        </article>
        </body></html>"#,
        path = LIST_PATH,
        next = next,
        rows = rows
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, page: &str, body: String, expected: u64) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("p", page))
        .respond_with(html(body))
        .expect(expected)
        .mount(server)
        .await;
}

fn start_url(server: &MockServer, query: &str) -> Url {
    Url::parse(&format!("{}{}{}", server.uri(), LIST_PATH, query)).unwrap()
}

#[tokio::test]
async fn test_full_crawl_multiple_pages() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "1", list_page(&["Alpha", "Beta"], Some("?p=2")), 1).await;
    mount_page(&mock_server, "2", list_page(&["Gamma"], Some("?p=3")), 1).await;
    mount_page(&mock_server, "3", list_page(&["Delta"], None), 1).await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(
        &config,
        &start_url(&mock_server, "?p=1"),
        &TableTarget::new(ListKind::UserList),
    )
    .await
    .expect("crawl should not error");

    assert_eq!(report.state, CrawlState::Done);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.rows_exported, 4);
    assert_eq!(
        report.export,
        concat!(
            "\"\",\"Title\",\"Labels\"\n",
            "\"\",\"Alpha\",\"Playing\"\n",
            "\"\",\"Beta\",\"Playing\"\n",
            "\"\",\"Gamma\",\"Playing\"\n",
            "\"\",\"Delta\",\"Playing\"\n",
        )
    );
}

#[tokio::test]
async fn test_requests_carry_identifying_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(header("user-agent", "Mozilla/5.0"))
        .and(header("accept", "text/html"))
        .respond_with(html(list_page(&["Alpha"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(
        &config,
        &start_url(&mock_server, ""),
        &TableTarget::new(ListKind::UserList),
    )
    .await
    .unwrap();

    assert_eq!(report.state, CrawlState::Done);
    assert_eq!(report.rows_exported, 1);
}

#[tokio::test]
async fn test_server_error_keeps_partial_export() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "1", list_page(&["Alpha"], Some("?p=2")), 1).await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("p", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "3", list_page(&["Gamma"], None), 0).await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(
        &config,
        &start_url(&mock_server, ""),
        &TableTarget::new(ListKind::UserList),
    )
    .await
    .unwrap();

    assert_eq!(report.state, CrawlState::Failed);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(
        report.export,
        "\"\",\"Title\",\"Labels\"\n\"\",\"Alpha\",\"Playing\"\n"
    );
    assert!(report
        .last_error
        .as_deref()
        .is_some_and(|e| e.contains("500")));
}

#[tokio::test]
async fn test_accept_error_status_keeps_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_string(list_page(&["Alpha"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.fetch.accept_error_status = true;

    let report = crawl(
        &config,
        &start_url(&mock_server, ""),
        &TableTarget::new(ListKind::UserList),
    )
    .await
    .unwrap();

    assert_eq!(report.state, CrawlState::Done);
    assert_eq!(report.rows_exported, 1);
}

#[tokio::test]
async fn test_fake_url_redirects_to_first_page() {
    let mock_server = MockServer::start().await;

    // Page 2 is mounted first so it wins over the broader first-page matcher
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("vnlist", "0"))
        .and(query_param("p", "2"))
        .respond_with(html(list_page(&["Gamma"], None)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("vnlist", "0"))
        .respond_with(html(list_page(&["Alpha", "Beta"], Some("?vnlist=0&p=2"))))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(query_param("vnlist", "1"))
        .respond_with(html(list_page(&["Wrong"], Some("?p=2"))))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(
        &config,
        &start_url(&mock_server, "?vnlist=1"),
        &TableTarget::new(ListKind::UserList),
    )
    .await
    .unwrap();

    assert_eq!(report.state, CrawlState::Done);
    assert_eq!(report.pages_fetched, 2);
    assert!(!report.export.contains("Wrong"));
    let body: Vec<&str> = report.export.lines().skip(1).collect();
    assert_eq!(
        body,
        vec![
            "\"\",\"Alpha\",\"Playing\"",
            "\"\",\"Beta\",\"Playing\"",
            "\"\",\"Gamma\",\"Playing\""
        ]
    );
}

#[tokio::test]
async fn test_length_votes_keep_first_column() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/u2/lengthvotes"))
        .respond_with(html(
            r#"<div class="lengthlist browse"><table>
                 <thead><tr><th>Date</th><th>Title</th></tr></thead>
                 <tbody><tr><td>3/120</td><td>Some Title</td></tr></tbody>
               </table></div>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let location = Url::parse(&format!("{}/u2/lengthvotes", mock_server.uri())).unwrap();
    let report = Coordinator::new(&config)
        .unwrap()
        .run(&location, &TableTarget::new(ListKind::LengthVotes))
        .await
        .unwrap();

    assert_eq!(
        report.export,
        "\"Date\",\"Title\"\n\"3/120\",\"Some Title\"\n"
    );
}

#[tokio::test]
async fn test_export_written_with_bom() {
    let mock_server = MockServer::start().await;
    mount_page(&mock_server, "1", list_page(&["Alpha"], None), 1).await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(
        &config,
        &start_url(&mock_server, ""),
        &TableTarget::new(ListKind::UserList),
    )
    .await
    .unwrap();

    let dir = tempdir().unwrap();
    let written = write_export_file(dir.path(), "export.csv", &report.export).unwrap();

    let bytes = std::fs::read(written).unwrap();
    assert_eq!(&bytes[..3], &UTF8_BOM);
    assert_eq!(std::str::from_utf8(&bytes[3..]).unwrap(), report.export);
}
