//! Concurrency and cancellation behavior of catalog initialization.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{Notifications, SlowStore, config, encoded_catalog, resolver};
use stowage_runtime::{CatalogStore, InitOutcome, Stowage};
use tokio_util::sync::CancellationToken;

fn slow_stowage(delay_ms: u64, with_catalog: bool) -> (Arc<SlowStore>, Arc<Stowage>) {
    let store = Arc::new(SlowStore::new(Duration::from_millis(delay_ms)));
    let stowage = Arc::new(Stowage::new(config(), store.clone(), resolver()));
    if with_catalog {
        store
            .write(&config().catalog_location(), &encoded_catalog(&stowage))
            .unwrap();
    }
    (store, stowage)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_initialization_loads_once() {
    let (store, stowage) = slow_stowage(50, true);
    let notifications = Notifications::attach(&stowage);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let stowage = Arc::clone(&stowage);
            tokio::spawn(async move { stowage.initialize().await })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await.unwrap(), InitOutcome::Loaded { entries: 2 });
    }

    assert_eq!(store.reads(), 1);
    assert_eq!(notifications.received(), vec![true]);
    assert!(stowage.is_valid());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_a_waiter_leaves_the_running_load_alone() {
    let (_store, stowage) = slow_stowage(100, true);
    let notifications = Notifications::attach(&stowage);

    let loader = {
        let stowage = Arc::clone(&stowage);
        tokio::spawn(async move { stowage.initialize().await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    let cancel = CancellationToken::new();
    let waiter = {
        let stowage = Arc::clone(&stowage);
        let cancel = cancel.clone();
        tokio::spawn(async move { stowage.initialize_cancelable(&cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    cancel.cancel();

    assert_eq!(waiter.await.unwrap(), None);
    assert!(loader.await.unwrap().is_valid());
    assert_eq!(notifications.received(), vec![true]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelling_during_the_load_completes_as_invalid() {
    let (_store, stowage) = slow_stowage(100, true);
    let notifications = Notifications::attach(&stowage);

    let cancel = CancellationToken::new();
    let task = {
        let stowage = Arc::clone(&stowage);
        let cancel = cancel.clone();
        tokio::spawn(async move { stowage.initialize_cancelable(&cancel).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    cancel.cancel();

    assert_eq!(task.await.unwrap(), Some(InitOutcome::Cancelled));
    assert!(stowage.is_initialized());
    assert!(!stowage.is_valid());
    assert_eq!(notifications.received(), vec![false]);
    assert!(stowage.query().by_name("readme").get_result().is_none());
}

#[tokio::test]
async fn missing_catalog_notifies_invalid_once() {
    let (store, stowage) = slow_stowage(0, false);
    let notifications = Notifications::attach(&stowage);

    assert_eq!(stowage.initialize().await, InitOutcome::NotFound);
    assert_eq!(stowage.initialize().await, InitOutcome::NotFound);
    assert_eq!(store.reads(), 1);
    assert_eq!(notifications.received(), vec![false]);
}

#[test]
fn blocking_initialization_uses_the_blocking_read() {
    let (store, stowage) = slow_stowage(10_000, true);
    // The blocking path never touches the slow non-blocking read.
    assert!(stowage.initialize_blocking().is_valid());
    assert_eq!(store.reads(), 1);

    let mut query = stowage.query().by_path("ui");
    let entry = query.get_result().unwrap();
    assert_eq!(entry.name(), "icon");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reload_keeps_serving_the_previous_manifest() {
    let (_store, stowage) = slow_stowage(100, true);
    assert!(stowage.initialize().await.is_valid());
    let notifications = Notifications::attach(&stowage);

    let reload = {
        let stowage = Arc::clone(&stowage);
        tokio::spawn(async move { stowage.reinitialize().await })
    };
    tokio::time::sleep(Duration::from_millis(30)).await;

    assert!(stowage.is_initialized());
    assert!(stowage.is_valid());
    assert!(stowage.manifest().is_some());
    assert_eq!(stowage.query().get_results().len(), 2);

    assert_eq!(reload.await.unwrap(), InitOutcome::Loaded { entries: 2 });
    assert_eq!(notifications.received(), vec![true]);
}
