//! Entity lifecycle scenarios across all entity kinds

use nameindex_core::EntityKind;
use nameindex_engine::Database;
use nameindex_search::{IndexSet, KeywordIndex, WordOutcome};
use std::sync::Arc;

fn indexes() -> IndexSet {
    IndexSet::open(Arc::new(Database::in_memory())).unwrap()
}

fn id_list(index: &KeywordIndex, word: &str) -> Option<String> {
    index.entry(word).unwrap().map(|e| e.id_list)
}

#[test]
fn rename_drops_and_adds_words() {
    for kind in EntityKind::ALL {
        let set = indexes();
        let index = set.for_kind(kind);

        index.on_entity_created("John Snow", 1);
        assert_eq!(id_list(index, "john").as_deref(), Some("1"));
        assert_eq!(id_list(index, "snow").as_deref(), Some("1"));
        assert_eq!(index.distinct_word_count().unwrap(), 2);

        let report = index.on_entity_renamed("John Snow", "John Stark", 1);
        assert!(report.is_complete());
        assert_eq!(id_list(index, "john").as_deref(), Some("1"));
        assert_eq!(id_list(index, "stark").as_deref(), Some("1"));
        assert_eq!(id_list(index, "snow"), None);
        assert_eq!(index.distinct_word_count().unwrap(), 2);
    }
}

#[test]
fn destroying_last_reference_removes_entry() {
    let set = indexes();
    let users = set.users();
    users.on_entity_created("Alpha", 1);
    users.on_entity_created("Alpha", 2);
    assert_eq!(users.distinct_word_count().unwrap(), 1);

    users.on_entity_destroyed("Alpha", 1);
    assert_eq!(id_list(users, "alpha").as_deref(), Some("2"));
    assert_eq!(users.distinct_word_count().unwrap(), 1);

    let report = users.on_entity_destroyed("Alpha", 2);
    assert_eq!(
        report.outcome_for("alpha"),
        Some(&WordOutcome::Deleted { counter_synced: true })
    );
    assert_eq!(id_list(users, "alpha"), None);
    assert_eq!(users.distinct_word_count().unwrap(), 0);
}

#[test]
fn destroy_unknown_entity_writes_nothing() {
    let set = indexes();
    let teams = set.teams();
    teams.on_entity_created("Blue Birds", 4);

    let report = teams.on_entity_destroyed("Blue Whales", 9);
    assert_eq!(report.outcome_for("blue"), Some(&WordOutcome::NotMember));
    assert_eq!(report.outcome_for("whales"), Some(&WordOutcome::Missing));
    assert!(report.touched_words().is_empty());
    assert_eq!(id_list(teams, "blue").as_deref(), Some("4"));
}

#[test]
fn search_after_mixed_lifecycle() {
    let set = indexes();
    let tournaments = set.tournaments();
    tournaments.on_entity_created("World Cup 2026", 1);
    tournaments.on_entity_created("Euro Cup", 2);
    tournaments.on_entity_created("World League", 3);
    tournaments.on_entity_renamed("Euro Cup", "Euro Cup 2026", 2);
    tournaments.on_entity_destroyed("World League", 3);

    assert_eq!(tournaments.search("cup").sorted_ids(), vec![1, 2]);
    assert_eq!(tournaments.search("2026 cup").sorted_ids(), vec![1, 2]);
    assert_eq!(tournaments.search("world").sorted_ids(), vec![1]);
    assert!(tournaments.search("league").ids.is_empty());
    // world, cup, 2026, euro
    assert_eq!(tournaments.distinct_word_count().unwrap(), 4);
}

#[test]
fn report_serializes_for_handlers() {
    let set = indexes();
    let report = set.users().on_entity_created("Jon", 1);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["entity_id"], 1);
    assert_eq!(json["outcomes"][0]["word"], "jon");
    assert_eq!(json["outcomes"][0]["outcome"], "created");

    let entry = set.users().entry("jon").unwrap().unwrap();
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(json["key_name"], "jon");
    assert_eq!(json["id_list"], "1");
}
