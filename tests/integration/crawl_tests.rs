//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run full
//! crawls end-to-end through the real HTTP fetcher and HTML extractor.

use sitecheck::config::Config;
use sitecheck::crawler::Coordinator;
use sitecheck::output::{CollectingReporter, CrawlSummary};
use sitecheck::{Category, Settings, TerminationReason};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates test settings for a crawl seeded at `seed`
///
/// Hrefs are followed and client errors checked; `tweak` adjusts the rest.
fn create_test_settings(seed: &str, tweak: impl FnOnce(&mut Config)) -> Settings {
    let mut config = Config {
        url: Some(seed.to_string()),
        ..Config::default()
    };
    config.watch.href = true;
    config.checks.client_errors = true;
    config.limits.time_delay = Duration::from_millis(10);
    config.limits.time_wait = Duration::from_secs(2);
    config.limits.request_timeout = Duration::from_secs(5);
    tweak(&mut config);

    Settings::from_config(&config).expect("Test configuration should be valid")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body).into_bytes(),
        "text/html",
    )
}

async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn run_crawl(settings: Settings) -> (CrawlSummary, Arc<CollectingReporter>) {
    let reporter = Arc::new(CollectingReporter::new());
    let coordinator =
        Coordinator::with_http(settings, reporter.clone()).expect("Failed to build coordinator");

    let summary = tokio::time::timeout(Duration::from_secs(20), coordinator.run())
        .await
        .expect("Crawl did not terminate")
        .expect("Crawl failed");
    (summary, reporter)
}

async fn hits(server: &MockServer, page: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == page)
        .count()
}

#[tokio::test]
async fn test_full_crawl_completes() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<a href="/page1">One</a> <a href="page2#top">Two</a>"#),
    )
    .await;
    mount_page(&server, "/page1", html(r#"<a href="/">Home</a> <a href="/page2">Two</a>"#)).await;
    mount_page(&server, "/page2", html("no links")).await;

    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |_| {})).await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    assert!(summary.is_clean());
    assert_eq!(summary.visited(), 3);
    assert!(reporter.findings().is_empty());

    // Fragment differences do not produce extra fetches
    assert_eq!(hits(&server, "/").await, 1);
    assert_eq!(hits(&server, "/page1").await, 1);
    assert_eq!(hits(&server, "/page2").await, 1);
}

#[tokio::test]
async fn test_missing_page_exhausts_budget() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html(r#"<a href="/missing">Missing</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.limits.max_errors = 1;
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::BudgetExceeded);
    assert_eq!(summary.reported_errors(), 1);

    let findings = reporter.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].category, Category::ClientError);
    assert_eq!(findings[0].status_code, Some(404));
    assert_eq!(findings[0].url, format!("{}/missing", base));
    assert_eq!(findings[0].parent.as_deref(), Some(format!("{}/", base).as_str()));

    let reported = reporter.summary().expect("Summary should be reported");
    assert_eq!(reported.reason, TerminationReason::BudgetExceeded);
}

#[tokio::test]
async fn test_filename_pattern_skips_non_matching() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<a href="/index.html">Index</a> <a href="/image.png">Image</a>"#),
    )
    .await;
    mount_page(&server, "/index.html", html(r#"<a href="/deep.html">Deep</a>"#)).await;
    Mock::given(method("GET"))
        .and(path("/deep.html"))
        .respond_with(html("end"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/image.png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (summary, _) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.watch.pattern = Some(r"\.html$".to_string());
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    assert_eq!(summary.stats.out_of_scope, 1);
    assert_eq!(hits(&server, "/image.png").await, 0);
}

#[tokio::test]
async fn test_other_hosts_are_out_of_scope() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(&format!(r#"<a href="{}/elsewhere">Elsewhere</a>"#, other.uri())),
    )
    .await;
    Mock::given(method("GET"))
        .respond_with(html("other host"))
        .expect(0)
        .mount(&other)
        .await;

    let (summary, _) = run_crawl(create_test_settings(&format!("{}/", base), |_| {})).await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    assert_eq!(summary.stats.out_of_scope, 1);
    assert_eq!(summary.visited(), 1);
}

#[tokio::test]
async fn test_span_hosts_follows_other_hosts() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(&format!(r#"<a href="{}/gone">Gone</a>"#, other.uri())),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&other)
        .await;

    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.scope.span_hosts = true;
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    let findings = reporter.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].url, format!("{}/gone", other.uri()));
}

#[tokio::test]
async fn test_eviction_allows_refetch() {
    let server = MockServer::start().await;
    let base = server.uri();

    // The home page answers once, then disappears
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<a href="/a">A</a>"#))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/a", html(r#"<a href="/">Home</a>"#)).await;

    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.limits.max_visited = 1;
        c.limits.max_errors = 1;
    }))
    .await;

    // "/" was evicted when "/a" was marked, so it was rediscovered and fetched again
    assert_eq!(summary.reason, TerminationReason::BudgetExceeded);
    assert_eq!(hits(&server, "/").await, 2);
    assert_eq!(summary.visited(), 3);

    let findings = reporter.findings();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].url, format!("{}/", base));
    assert_eq!(findings[0].parent.as_deref(), Some(format!("{}/a", base).as_str()));
}

#[tokio::test]
async fn test_redirects_are_reported_not_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html(r#"<a href="/old">Old</a>"#)).await;
    mount_page(
        &server,
        "/old",
        ResponseTemplate::new(301).insert_header("location", "/new"),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(html("new"))
        .expect(0)
        .mount(&server)
        .await;

    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.checks.redirection = true;
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    let findings = reporter.findings_in(Category::Redirection);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].status_code, Some(301));
    assert!(findings[0].url.ends_with("/old"));
}

#[tokio::test]
async fn test_src_references_checked() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<img src="/logo.png"> <a href="/page">Page</a>"#),
    )
    .await;
    mount_page(&server, "/logo.png", ResponseTemplate::new(404)).await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("page"))
        .expect(0)
        .mount(&server)
        .await;

    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.watch.href = false;
        c.watch.src = true;
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    let findings = reporter.findings();
    assert_eq!(findings.len(), 1);
    assert!(findings[0].url.ends_with("/logo.png"));
}

#[tokio::test]
async fn test_server_errors_and_fetch_errors() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html(r#"<a href="/broken">Broken</a> <a href="http://127.0.0.1:1/closed">Closed</a>"#),
    )
    .await;
    mount_page(&server, "/broken", ResponseTemplate::new(503)).await;

    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.scope.span_hosts = true;
        c.checks.client_errors = false;
        c.checks.server_errors = true;
        c.checks.fetch_errors = true;
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    assert_eq!(summary.findings_in(Category::ServerError), 1);
    assert_eq!(summary.findings_in(Category::FetchError), 1);

    let fetch_errors = reporter.findings_in(Category::FetchError);
    assert_eq!(fetch_errors[0].url, "http://127.0.0.1:1/closed");
    assert!(fetch_errors[0].status_code.is_none());
    assert!(fetch_errors[0].error.is_some());
}

#[tokio::test]
async fn test_concurrent_crawl_fetches_each_page_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..12)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();
    mount_page(&server, "/", html(&links)).await;
    for i in 0..12 {
        mount_page(&server, &format!("/p{}", i), html(&links)).await;
    }

    let (summary, _) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.limits.concurrency = 4;
        c.limits.time_delay = Duration::ZERO;
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    assert_eq!(summary.visited(), 13);
    assert_eq!(summary.stats.fetched, 13);
    for i in 0..12 {
        assert_eq!(hits(&server, &format!("/p{}", i)).await, 1);
    }
}

#[tokio::test]
async fn test_request_delay_spaces_fetches() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", html(r#"<a href="/a">A</a> <a href="/b">B</a>"#)).await;
    mount_page(&server, "/a", html("a")).await;
    mount_page(&server, "/b", html("b")).await;

    let start = std::time::Instant::now();
    let (summary, _) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.limits.concurrency = 3;
        c.limits.time_delay = Duration::from_millis(200);
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::Completed);
    // Three dispatches need at least two full delays between them
    assert!(start.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_idle_timeout_on_slow_server() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        html("slow").set_delay(Duration::from_secs(10)),
    )
    .await;

    let start = std::time::Instant::now();
    let (summary, reporter) = run_crawl(create_test_settings(&format!("{}/", base), |c| {
        c.limits.time_wait = Duration::from_millis(300);
        c.limits.request_timeout = Duration::from_secs(30);
    }))
    .await;

    assert_eq!(summary.reason, TerminationReason::IdleTimeout);
    assert!(!summary.is_clean());
    assert!(start.elapsed() < Duration::from_secs(5));
    assert!(reporter.findings().is_empty());
}
