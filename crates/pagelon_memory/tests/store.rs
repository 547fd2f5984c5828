// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Integration tests for `MemoryStore`.

use pagelon_memory::{MemoryStore, MemoryStoreBuilder};
use pagelon_tier::{Page, PageStore, SETTINGS_VERSION, Settings, StoreKey, StoreRecord};

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    futures::executor::block_on(f)
}

fn page(index: u64, data: &[&str]) -> StoreRecord<String> {
    StoreRecord::Page(Page::new(index, data.iter().map(ToString::to_string).collect()))
}

fn settings() -> StoreRecord<String> {
    StoreRecord::Settings(Settings {
        actual_cache_size: 64,
        all_data_local: false,
        cache_size: 1024,
        collection_count: None,
        highest_saved_page: 0,
        highest_saved_page_size: 2,
        page_size: 2,
        source_id: "letters".to_string(),
        version: SETTINGS_VERSION.to_string(),
    })
}

#[test]
fn new_store_is_empty() {
    block_on(async {
        let store = MemoryStore::<String>::new();
        assert!(!store.contains(StoreKey::Page(0)).await.expect("contains failed"));
        assert!(store.read(StoreKey::Settings).await.expect("read failed").is_none());
    });
}

#[test]
fn add_then_read_returns_record() {
    block_on(async {
        let store = MemoryStore::<String>::new();
        store
            .add_or_update(StoreKey::Page(2), page(2, &["c", "d"]))
            .await
            .expect("write failed");

        let record = store.read(StoreKey::Page(2)).await.expect("read failed");
        assert_eq!(record, Some(page(2, &["c", "d"])));
    });
}

#[test]
fn add_replaces_existing_record() {
    block_on(async {
        let store = MemoryStore::<String>::new();
        store.add_or_update(StoreKey::Page(0), page(0, &["a"])).await.expect("write failed");
        store
            .add_or_update(StoreKey::Page(0), page(0, &["a", "b"]))
            .await
            .expect("write failed");

        let record = store.read(StoreKey::Page(0)).await.expect("read failed");
        assert_eq!(record, Some(page(0, &["a", "b"])));
    });
}

#[test]
fn settings_key_does_not_collide_with_pages() {
    block_on(async {
        let store = MemoryStore::<String>::new();
        store.add_or_update(StoreKey::Settings, settings()).await.expect("write failed");
        store.add_or_update(StoreKey::Page(0), page(0, &["a"])).await.expect("write failed");

        assert_eq!(store.read(StoreKey::Settings).await.expect("read failed"), Some(settings()));
        assert_eq!(store.read(StoreKey::Page(0)).await.expect("read failed"), Some(page(0, &["a"])));
    });
}

#[test]
fn remove_deletes_one_record() {
    block_on(async {
        let store = MemoryStore::<String>::new();
        store.add_or_update(StoreKey::Page(0), page(0, &["a"])).await.expect("write failed");
        store.add_or_update(StoreKey::Page(1), page(1, &["b"])).await.expect("write failed");

        store.remove(StoreKey::Page(0)).await.expect("remove failed");

        assert!(!store.contains(StoreKey::Page(0)).await.expect("contains failed"));
        assert!(store.contains(StoreKey::Page(1)).await.expect("contains failed"));
    });
}

#[test]
fn clear_removes_everything() {
    block_on(async {
        let store = MemoryStore::<String>::new();
        store.add_or_update(StoreKey::Settings, settings()).await.expect("write failed");
        store.add_or_update(StoreKey::Page(0), page(0, &["a"])).await.expect("write failed");

        store.clear().await.expect("clear failed");

        assert!(!store.contains(StoreKey::Page(0)).await.expect("contains failed"));
        assert!(store.read(StoreKey::Settings).await.expect("read failed").is_none());
        assert_eq!(store.entry_count(), 0);
    });
}

#[test]
fn clones_share_records() {
    block_on(async {
        let store = MemoryStoreBuilder::<String>::new().name("shared").initial_capacity(8).build();
        let clone = store.clone();

        store.add_or_update(StoreKey::Page(4), page(4, &["e"])).await.expect("write failed");
        assert!(clone.contains(StoreKey::Page(4)).await.expect("contains failed"));

        clone.clear().await.expect("clear failed");
        assert!(!store.contains(StoreKey::Page(4)).await.expect("contains failed"));
    });
}

#[test]
fn close_keeps_store_usable() {
    block_on(async {
        let store = MemoryStore::<String>::default();
        store.close();
        store.add_or_update(StoreKey::Page(0), page(0, &["a"])).await.expect("write failed");
        assert!(store.contains(StoreKey::Page(0)).await.expect("contains failed"));
    });
}
