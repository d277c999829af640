//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the real
//! reqwest transport through full walks and scheduled cycles.

use crate::common::{config_for, listing, mount_page, START_PATH};
use catalog_sync::catalog::CatalogService;
use catalog_sync::crawler::{http_walker, Scheduler, StopReason};
use catalog_sync::notifier::Notifier;
use catalog_sync::storage::{open_storage, RunStatus, Storage, StorageHandle};
use catalog_sync::ScrapedProduct;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_2: &str = "/catalog/nasosnoe-oborudovanie/page-2/";
const PAGE_3: &str = "/catalog/nasosnoe-oborudovanie/page-3/";

fn names(records: &[ScrapedProduct]) -> Vec<&str> {
    records.iter().map(|r| r.name.as_str()).collect()
}

#[tokio::test]
async fn test_full_multi_page_crawl() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        START_PATH,
        listing(&[("Pump A", "7 490 ₽"), ("Pump B", "8 100 ₽")], Some(PAGE_2)),
    )
    .await;
    mount_page(&server, PAGE_2, listing(&[("Pump C", "9 990 ₽")], Some(PAGE_3))).await;
    mount_page(&server, PAGE_3, listing(&[("Pump D", "12 300 ₽")], None)).await;

    let dir = TempDir::new().unwrap();
    let (config, _file) = config_for(&server, &dir.path().join("catalog.db"));
    let walker = http_walker(&config).unwrap();

    let outcome = walker.walk(&config.crawler.start_url).await;

    assert_eq!(outcome.stop, StopReason::Exhausted);
    assert_eq!(outcome.pages_fetched, 3);
    assert_eq!(
        names(&outcome.records),
        vec!["Pump A", "Pump B", "Pump C", "Pump D"]
    );
    assert_eq!(outcome.records[3].price, "12 300 ₽");
}

#[tokio::test]
async fn test_failure_on_third_page_keeps_earlier_records() {
    let server = MockServer::start().await;
    mount_page(&server, START_PATH, listing(&[("Pump A", "7 490 ₽")], Some(PAGE_2))).await;
    mount_page(&server, PAGE_2, listing(&[("Pump B", "8 100 ₽")], Some(PAGE_3))).await;
    Mock::given(method("GET"))
        .and(path(PAGE_3))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (config, _file) = config_for(&server, &dir.path().join("catalog.db"));
    let walker = http_walker(&config).unwrap();

    let outcome = walker.walk(&config.crawler.start_url).await;

    assert_eq!(names(&outcome.records), vec!["Pump A", "Pump B"]);
    assert_eq!(outcome.pages_fetched, 2);
    match outcome.stop {
        StopReason::FetchFailed { url, reason } => {
            assert!(url.ends_with(PAGE_3));
            assert_eq!(reason, "HTTP 500");
        }
        other => panic!("expected fetch failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_records_before_failed_page_reach_storage() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        START_PATH,
        listing(&[("Pump A", "7 490 ₽"), ("Pump B", "8 100 ₽")], Some(PAGE_2)),
    )
    .await;
    mount_page(&server, PAGE_2, listing(&[("Pump C", "9 990 ₽")], Some(PAGE_3))).await;
    Mock::given(method("GET"))
        .and(path(PAGE_3))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");
    let (config, _file) = config_for(&server, &db_path);
    let storage = StorageHandle::new(open_storage(&db_path).unwrap());
    let catalog = CatalogService::new(storage, Notifier::new());
    let walker = http_walker(&config).unwrap();
    let scheduler = Scheduler::from_config(walker, catalog.clone(), &config.crawler);

    let report = scheduler.run_cycle().await.unwrap();

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(report.reconcile.unwrap().inserted, 3);
    let stored: Vec<String> = catalog
        .list()
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    assert_eq!(stored, vec!["Pump A", "Pump B", "Pump C"]);

    let run = catalog
        .storage()
        .with(|s| s.get_run(report.run_id))
        .unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.totals.pages_fetched, 2);
    assert_eq!(run.totals.inserted, 3);
    assert_eq!(run.totals.stop_reason.as_deref(), Some("fetch-failed"));
}

#[tokio::test]
async fn test_unreachable_site_yields_empty_batch() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let (config, _file) = config_for(&server, &dir.path().join("catalog.db"));
    drop(server);

    let walker = http_walker(&config).unwrap();
    let outcome = walker.walk(&config.crawler.start_url).await;

    assert!(outcome.records.is_empty());
    assert_eq!(outcome.pages_fetched, 0);
    assert_eq!(outcome.stop.as_str(), "fetch-failed");
}

#[tokio::test]
async fn test_pages_requested_with_configured_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(START_PATH))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing(&[("Pump A", "7 490 ₽")], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (config, _file) = config_for(&server, &dir.path().join("catalog.db"));
    let walker = http_walker(&config).unwrap();

    let records = walker.run(&config.crawler.start_url).await;

    assert_eq!(names(&records), vec!["Pump A"]);
}

#[tokio::test]
async fn test_pagination_cycle_terminates() {
    let server = MockServer::start().await;
    mount_page(&server, START_PATH, listing(&[("Pump A", "7 490 ₽")], Some(PAGE_2))).await;
    mount_page(&server, PAGE_2, listing(&[("Pump B", "8 100 ₽")], Some(START_PATH))).await;

    let dir = TempDir::new().unwrap();
    let (config, _file) = config_for(&server, &dir.path().join("catalog.db"));
    let walker = http_walker(&config).unwrap();

    let outcome = walker.walk(&config.crawler.start_url).await;

    assert_eq!(names(&outcome.records), vec!["Pump A", "Pump B"]);
    assert_eq!(outcome.stop.as_str(), "cycle-detected");
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_scheduled_cycles_refresh_prices_and_keep_absent_products() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        START_PATH,
        listing(&[("Drill", "1 000 ₽"), ("Hose", "500 ₽")], None),
    )
    .await;

    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");
    let (config, _file) = config_for(&server, &db_path);

    let storage = StorageHandle::new(open_storage(&db_path).unwrap());
    let catalog = CatalogService::new(storage, Notifier::new());
    let walker = http_walker(&config).unwrap();
    let scheduler = Scheduler::from_config(walker, catalog.clone(), &config.crawler)
        .with_config_hash("integration");

    let first = scheduler.run_cycle().await.unwrap();
    assert_eq!(first.reconcile.unwrap().inserted, 2);
    let before = catalog.list().unwrap();

    server.reset().await;
    mount_page(&server, START_PATH, listing(&[("Drill", "1 200 ₽")], None)).await;

    let second = scheduler.run_cycle().await.unwrap();
    assert_eq!(second.reconcile.unwrap().updated, 1);

    let after = catalog.list().unwrap();
    assert_eq!(after.len(), 2);
    assert_eq!(after[0].id, before[0].id);
    assert_eq!(after[0].name, "Drill");
    assert_eq!(after[0].price, "1 200 ₽");
    assert_eq!(after[1], before[1]);

    // Ledger survives a reopen of the database file
    let reopened = open_storage(&db_path).unwrap();
    assert_eq!(reopened.count_runs_by_status(RunStatus::Completed).unwrap(), 2);
    let latest = reopened.get_latest_run().unwrap().unwrap();
    assert_eq!(latest.config_hash, "integration");
    assert_eq!(latest.totals.updated, 1);
    assert_eq!(latest.totals.stop_reason.as_deref(), Some("exhausted"));
}
