//! Integration tests for catalog operations against a file-backed database

use crate::common::{config_for, listing, mount_page, START_PATH};
use catalog_sync::catalog::{CatalogError, CatalogService, ProductUpdate};
use catalog_sync::crawler::{http_walker, Scheduler};
use catalog_sync::notifier::{ChannelSubscriber, Notifier};
use catalog_sync::storage::{open_storage, StorageHandle};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::Receiver;
use wiremock::MockServer;

fn open_catalog(db_path: &Path) -> CatalogService {
    let storage = StorageHandle::new(open_storage(db_path).unwrap());
    CatalogService::new(storage, Notifier::new())
}

fn listen(catalog: &CatalogService) -> Receiver<String> {
    let (subscriber, rx) = ChannelSubscriber::open(32);
    catalog.notifier().subscribe(Arc::new(subscriber));
    rx
}

fn drain(rx: &mut Receiver<String>) -> Vec<String> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[test]
fn test_edits_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("catalog.db");

    let (drill_id, hose_id) = {
        let catalog = open_catalog(&db_path);
        let drill = catalog.create("Drill", "1 000 ₽").unwrap();
        let hose = catalog.create("Hose", "500 ₽").unwrap();
        catalog
            .update(drill.id, ProductUpdate::price("1 100 ₽"))
            .unwrap();
        (drill.id, hose.id)
    };

    let catalog = open_catalog(&db_path);
    assert_eq!(catalog.get(drill_id).unwrap().price, "1 100 ₽");
    catalog.delete(hose_id).unwrap();

    let reopened = open_catalog(&db_path);
    let products = reopened.list().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].name, "Drill");
    assert!(matches!(
        reopened.get(hose_id),
        Err(CatalogError::NotFound(id)) if id == hose_id
    ));
}

#[test]
fn test_every_operation_notifies_listeners() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("catalog.db"));
    let mut first = listen(&catalog);
    let mut second = listen(&catalog);

    let drill = catalog.create("Drill", "1 000 ₽").unwrap();
    catalog.list().unwrap();
    catalog.get(drill.id).unwrap();
    catalog
        .update(drill.id, ProductUpdate::price("1 200 ₽"))
        .unwrap();
    catalog.delete(drill.id).unwrap();

    let expected = vec![
        format!("Created product {}: Drill at 1 000 ₽", drill.id),
        "Listed 1 products".to_string(),
        format!("Viewed product {} (Drill)", drill.id),
        format!("Updated product {}: Drill at 1 200 ₽", drill.id),
        format!("Deleted product {}", drill.id),
    ];
    assert_eq!(drain(&mut first), expected);
    assert_eq!(drain(&mut second), expected);
}

#[test]
fn test_disconnected_listener_does_not_block_others() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("catalog.db"));
    let gone = listen(&catalog);
    let mut live = listen(&catalog);
    drop(gone);

    catalog.create("Drill", "1 000 ₽").unwrap();

    assert_eq!(drain(&mut live).len(), 1);
}

#[test]
fn test_failed_operations_send_nothing() {
    let dir = TempDir::new().unwrap();
    let catalog = open_catalog(&dir.path().join("catalog.db"));
    catalog.create("Drill", "1 000 ₽").unwrap();
    let mut rx = listen(&catalog);

    assert!(catalog.create("Drill", "900 ₽").is_err());
    assert!(catalog.get(404).is_err());
    assert!(catalog.delete(404).is_err());
    assert!(catalog.update(404, ProductUpdate::name("Saw")).is_err());

    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn test_crawl_sync_is_announced_alongside_direct_edits() {
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
    let catalog = open_catalog(&db_path);
    let mut rx = listen(&catalog);

    let hose = catalog.create("Hose", "450 ₽").unwrap();
    let walker = http_walker(&config).unwrap();
    let scheduler = Scheduler::from_config(walker, catalog.clone(), &config.crawler);
    scheduler.run_cycle().await.unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![
            format!("Created product {}: Hose at 450 ₽", hose.id),
            "Catalog sync: 1 inserted, 1 updated".to_string(),
        ]
    );
    let stored = catalog.get(hose.id).unwrap();
    assert_eq!(stored.price, "500 ₽");
}
