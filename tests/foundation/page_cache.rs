//! Page cache built on RefCache with write-back to a backing store.

use crate::common::*;
use keystone::{CacheConfig, CacheError, RefCache};
use std::sync::{Arc, Barrier};
use std::thread;

#[test]
fn modified_page_is_written_back_on_last_release() {
    let cache = RefCache::new(PageStore::with_pages(4), CacheConfig::bounded(2));

    let page = cache.acquire(1).unwrap();
    page.data.lock()[0] = 0xAB;
    assert_eq!(cache.source().on_disk(1)[0], 0);

    cache.release(1).unwrap();
    assert_eq!(cache.source().on_disk(1)[0], 0xAB);
    assert_eq!(cache.source().writes(), 1);
}

#[test]
fn reacquire_after_eviction_reads_written_back_data() {
    let cache = RefCache::new(PageStore::with_pages(4), CacheConfig::bounded(2));

    let page = cache.acquire(2).unwrap();
    page.data.lock()[5] = 7;
    drop(page);
    cache.release(2).unwrap();

    let page = cache.acquire(2).unwrap();
    assert_eq!(page.data.lock()[5], 7);
    assert_eq!(cache.source().reads(), 2);
}

#[test]
fn missing_page_error_passes_through() {
    let cache = RefCache::new(PageStore::with_pages(1), CacheConfig::bounded(1));

    match cache.acquire(99) {
        Err(CacheError::Load(e)) => assert_eq!(e, NoSuchPage(99)),
        Err(other) => panic!("Expected Load error, got: {:?}", other),
        Ok(_) => panic!("Expected Load error, got a page"),
    }
    assert!(cache.is_empty());

    // Facade error keeps the loader's message
    let err: keystone::Error = cache.acquire(42).err().unwrap().into();
    assert_eq!(err.to_string(), "cache load failed: no such page: 42");
    let cause = std::error::Error::source(&err).unwrap();
    assert_eq!(cause.downcast_ref::<NoSuchPage>(), Some(&NoSuchPage(42)));
}

#[test]
fn full_cache_fails_fast_for_new_pages() {
    let cache = RefCache::new(PageStore::with_pages(8), CacheConfig::bounded(3));
    for number in 0..3 {
        cache.acquire(number).unwrap();
    }

    let err: keystone::Error = cache.acquire(3).err().unwrap().into();
    assert!(err.is_retryable());
    assert_eq!(cache.source().writes(), 0);

    cache.release(0).unwrap();
    assert!(cache.acquire(3).is_ok());
}

#[test]
fn shutdown_flushes_every_held_page() {
    let cache = RefCache::new(PageStore::with_pages(4), CacheConfig::unbounded());
    for number in 0..4 {
        let page = cache.acquire(number).unwrap();
        page.data.lock()[0] = number as u8 + 1;
    }

    cache.shutdown();

    for number in 0..4 {
        assert_eq!(cache.source().on_disk(number)[0], number as u8 + 1);
    }
    assert!(cache.is_empty());
}

#[test]
fn concurrent_writers_on_one_page_share_a_single_copy() {
    let cache = Arc::new(RefCache::new(
        PageStore::with_pages(1),
        CacheConfig::bounded(1),
    ));
    let holder = cache.acquire(0).unwrap();
    let barrier = Arc::new(Barrier::new(4));

    let handles: Vec<_> = (0..4usize)
        .map(|i| {
            let cache = Arc::clone(&cache);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let page = cache.acquire(0).unwrap();
                page.data.lock()[i] = 1;
                cache.release(0).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.source().reads(), 1);
    assert_eq!(cache.source().writes(), 0);
    drop(holder);
    cache.release(0).unwrap();

    assert_eq!(&cache.source().on_disk(0)[..4], &[1, 1, 1, 1]);
}

#[test]
fn random_workload_never_exceeds_capacity() {
    use rand::Rng;

    const CAPACITY: usize = 4;
    let cache = Arc::new(RefCache::new(
        PageStore::with_pages(16),
        CacheConfig::bounded(CAPACITY),
    ));

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                let mut rng = rand::thread_rng();
                for _ in 0..300 {
                    let number = rng.gen_range(0..16);
                    if let Ok(page) = cache.acquire(number) {
                        assert!(cache.len() <= CAPACITY);
                        let mut data = page.data.lock();
                        data[0] = data[0].wrapping_add(1);
                        drop(data);
                        cache.release(number).unwrap();
                    }
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert!(cache.is_empty());
    assert_eq!(cache.source().reads(), cache.source().writes());
}
