// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg(feature = "test-util")]

//! Integration tests for the settings record and cache initialization.

use pagelon::{Cache, CacheState, Error, Page, SETTINGS_VERSION, Settings, StoreKey, StoreRecord};
use pagelon_tier::testing::{MockStore, StoreOp, VecSource};

type TestResult = Result<(), Error>;

fn letters() -> Vec<char> {
    vec!['A', 'B', 'C', 'D', 'E']
}

async fn settle(cache: &Cache<char, VecSource<char>, MockStore<char>>) {
    for _ in 0..10_000 {
        if cache.pending_operations() == 0 && cache.state() == CacheState::Idle {
            return;
        }
        tokio::task::yield_now().await;
    }
    assert_eq!(cache.state(), CacheState::Idle, "cache did not settle");
}

fn settings(page_size: u64, source_id: &str, version: &str) -> Settings {
    Settings {
        actual_cache_size: 0,
        all_data_local: false,
        cache_size: 1024,
        collection_count: None,
        highest_saved_page: 0,
        highest_saved_page_size: 0,
        page_size,
        source_id: source_id.to_string(),
        version: version.to_string(),
    }
}

fn stored_settings(store: &MockStore<char>) -> Option<Settings> {
    match store.get(StoreKey::Settings) {
        Some(StoreRecord::Settings(settings)) => Some(settings),
        _ => None,
    }
}

#[tokio::test]
async fn fresh_store_gets_settings_on_startup() -> TestResult {
    let store = MockStore::new();
    let cache = Cache::builder::<char, _>("letters", VecSource::new("letters", letters()))
        .page_size(2)
        .cache_size(4096)
        .store(store.clone())
        .build()?;
    settle(&cache).await;

    let settings = stored_settings(&store).unwrap();
    assert_eq!(settings.page_size, 2);
    assert_eq!(settings.cache_size, 4096);
    assert_eq!(settings.source_id, "letters");
    assert_eq!(settings.version, SETTINGS_VERSION);
    assert_eq!(settings.collection_count, None);
    assert!(!settings.all_data_local);

    Ok(())
}

#[tokio::test]
async fn settings_track_saved_pages() -> TestResult {
    let store = MockStore::new();
    let cache = Cache::builder::<char, _>("letters", VecSource::new("letters", letters()))
        .page_size(2)
        .prefetch_size(0)
        .store(store.clone())
        .build()?;

    cache.read_range(0, 5)?.await?;

    let settings = stored_settings(&store).unwrap();
    assert_eq!(settings, cache.settings());
    assert_eq!(settings.highest_saved_page, 4);
    assert_eq!(settings.highest_saved_page_size, 1);
    assert_eq!(settings.collection_count, Some(5));
    assert!(settings.all_data_local);
    assert!(settings.actual_cache_size > 0);

    Ok(())
}

#[tokio::test]
async fn second_cache_resumes_from_shared_store() -> TestResult {
    let source = VecSource::new("letters", letters());
    let store = MockStore::new();

    let first = Cache::builder::<char, _>("letters", source.clone())
        .page_size(2)
        .prefetch_unbounded()
        .store(store.clone())
        .build()?;
    first.read_range(0, 2)?.await?;
    settle(&first).await;
    let saved = first.settings();

    let second = Cache::builder::<char, _>("letters", source.clone())
        .page_size(2)
        .prefetch_unbounded()
        .store(store.clone())
        .build()?;
    settle(&second).await;

    assert_eq!(second.settings(), saved);
    assert!(!store.operations().contains(&StoreOp::Clear));

    source.clear_operations();
    assert_eq!(second.read_range(0, 5)?.await?, letters());
    assert_eq!(second.count()?.await?, 5);
    assert!(source.operations().is_empty());

    Ok(())
}

#[tokio::test]
async fn page_size_change_clears_the_store() -> TestResult {
    let source = VecSource::new("letters", letters());
    let store = MockStore::new();

    let first = Cache::builder::<char, _>("letters", source.clone())
        .page_size(2)
        .store(store.clone())
        .build()?;
    first.read_range(0, 4)?.await?;
    settle(&first).await;
    assert!(!store.page_keys().is_empty());

    let second = Cache::builder::<char, _>("letters", source)
        .page_size(3)
        .store(store.clone())
        .build()?;
    settle(&second).await;

    assert!(store.operations().contains(&StoreOp::Clear));
    assert!(store.page_keys().is_empty());
    assert_eq!(stored_settings(&store).unwrap().page_size, 3);
    assert_eq!(second.read_range(0, 4)?.await?, vec!['A', 'B', 'C', 'D']);

    Ok(())
}

#[tokio::test]
async fn source_change_clears_the_store() -> TestResult {
    let source = VecSource::new("letters", letters());
    let store = MockStore::new();

    let first = Cache::builder::<char, _>("letters", source.clone())
        .page_size(2)
        .store(store.clone())
        .build()?;
    first.read_range(0, 2)?.await?;
    settle(&first).await;

    let renamed = source.renamed("letters-v2");
    renamed.set_items(vec!['V', 'W', 'X']);
    let second = Cache::builder::<char, _>("letters", renamed)
        .page_size(2)
        .store(store.clone())
        .build()?;
    settle(&second).await;

    assert!(store.page_keys().is_empty());
    assert_eq!(stored_settings(&store).unwrap().source_id, "letters-v2");
    assert_eq!(second.read_range(0, 2)?.await?, vec!['V', 'W']);

    Ok(())
}

#[tokio::test]
async fn compatible_version_is_accepted() -> TestResult {
    let store = MockStore::new();
    store.seed(StoreKey::Settings, StoreRecord::Settings(settings(2, "letters", "1.7")));
    store.seed(StoreKey::Page(0), StoreRecord::Page(Page::new(0, vec!['a', 'b'])));

    let source = VecSource::new("letters", letters());
    let cache = Cache::builder::<char, _>("letters", source.clone())
        .page_size(2)
        .prefetch_size(0)
        .store(store.clone())
        .build()?;

    // served from the seeded page, not the source
    assert_eq!(cache.read_range(0, 2)?.await?, vec!['a', 'b']);
    assert!(source.operations().is_empty());
    assert!(!store.operations().contains(&StoreOp::Clear));

    Ok(())
}

#[tokio::test]
async fn unsupported_version_fails_initialization() -> TestResult {
    let store = MockStore::new();
    store.seed(StoreKey::Settings, StoreRecord::Settings(settings(2, "letters", "2.0")));

    let cache = Cache::builder::<char, _>("letters", VecSource::new("letters", letters()))
        .page_size(2)
        .store(store.clone())
        .build()?;

    let queued = cache.read_range(0, 1)?;
    let error = queued.await.unwrap_err();
    assert!(matches!(error, Error::Initialization { .. }));
    assert!(error.to_string().contains("2.0"));

    // every later call fails fast with the same error
    assert!(matches!(cache.read_range(0, 1), Err(Error::Initialization { .. })));
    assert!(matches!(cache.count(), Err(Error::Initialization { .. })));
    assert!(matches!(cache.clear(), Err(Error::Initialization { .. })));
    assert!(matches!(
        cache.filter_forward(0, None, |_| true),
        Err(Error::Initialization { .. })
    ));
    assert_eq!(cache.state(), CacheState::Init);
    assert_eq!(cache.pending_operations(), 0);

    // the store is left untouched
    assert!(!store.operations().iter().any(|op| matches!(op, StoreOp::AddOrUpdate { .. } | StoreOp::Clear)));

    Ok(())
}

#[tokio::test]
async fn page_under_settings_key_fails_initialization() -> TestResult {
    let store = MockStore::new();
    store.seed(StoreKey::Settings, StoreRecord::Page(Page::new(0, vec!['x'])));

    let cache = Cache::builder::<char, _>("letters", VecSource::new("letters", letters()))
        .store(store)
        .build()?;

    let error = cache.read_range(0, 1)?.await.unwrap_err();
    assert!(matches!(error, Error::Initialization { .. }));

    Ok(())
}

#[tokio::test]
async fn unreadable_store_fails_initialization() -> TestResult {
    let store = MockStore::new();
    store.fail_when(|op| matches!(op, StoreOp::Read(StoreKey::Settings)));

    let cache = Cache::builder::<char, _>("letters", VecSource::new("letters", letters()))
        .store(store)
        .build()?;

    let error = cache.clear()?.await.unwrap_err();
    match error {
        Error::Initialization { cause, .. } => assert!(cause.is_some()),
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[tokio::test]
async fn unwritable_store_fails_initialization() -> TestResult {
    let store = MockStore::new();
    store.fail_when(|op| {
        matches!(
            op,
            StoreOp::AddOrUpdate {
                key: StoreKey::Settings,
                ..
            }
        )
    });

    let cache = Cache::builder::<char, _>("letters", VecSource::new("letters", letters()))
        .store(store)
        .build()?;

    let error = cache.read_range(0, 1)?.await.unwrap_err();
    assert!(matches!(error, Error::Initialization { .. }));

    Ok(())
}
