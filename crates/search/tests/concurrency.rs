//! Concurrent maintenance
//!
//! Many threads updating the same words must not lose ids, duplicate
//! entries, or miscount distinct words.

use nameindex_core::EntityKind;
use nameindex_engine::{Database, IndexConfig, RetryConfig};
use nameindex_search::{KeywordIndex, WordOutcome};
use std::sync::{Arc, Barrier};
use std::thread;

fn contended_index() -> Arc<KeywordIndex> {
    let config = IndexConfig {
        retry: RetryConfig::new()
            .with_max_retries(1_000)
            .with_base_delay_ms(0)
            .with_max_delay_ms(1),
        ..IndexConfig::default()
    };
    let db = Arc::new(Database::new(
        Arc::new(nameindex_storage::MemoryStore::new()),
        config,
    ));
    Arc::new(KeywordIndex::new(db, EntityKind::Team))
}

#[test]
fn concurrent_adds_to_one_word_keep_every_id() {
    const THREADS: u64 = 8;
    let index = contended_index();
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                index.on_entity_created("Shared Name", id)
            })
        })
        .collect();

    let reports: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(reports.iter().all(|r| r.is_complete()));

    let created = reports
        .iter()
        .filter(|r| matches!(r.outcome_for("shared"), Some(WordOutcome::Created { .. })))
        .count();
    assert_eq!(created, 1);

    let shared: Vec<_> = index
        .entries()
        .unwrap()
        .into_iter()
        .filter(|e| e.key_name == "shared")
        .collect();
    assert_eq!(shared.len(), 1);
    assert_eq!(shared[0].frequency().unwrap(), THREADS as usize);

    assert_eq!(index.search("shared name").sorted_ids(), (0..THREADS).collect::<Vec<_>>());
    assert_eq!(index.distinct_word_count().unwrap(), 2);
}

#[test]
fn concurrent_create_and_destroy_settle() {
    const THREADS: u64 = 6;
    let index = contended_index();
    for id in 0..THREADS {
        index.on_entity_created("Old Guard", id);
    }
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|id| {
            let index = Arc::clone(&index);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                index.on_entity_renamed("Old Guard", "New Guard", id)
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_complete());
    }

    assert!(index.entry("old").unwrap().is_none());
    assert_eq!(index.word_frequency("new").unwrap(), THREADS);
    assert_eq!(index.word_frequency("guard").unwrap(), THREADS);
    assert_eq!(index.distinct_word_count().unwrap(), 2);

    let reconciled = index.reconcile_word_count().unwrap();
    assert!(!reconciled.drifted());
}
