use listsweep_core::{ItemTally, Mode, ProcessedIds, RunStats};
use pretty_assertions::assert_eq;

#[test]
fn processed_ids_reject_duplicates_and_keep_order() {
    let mut ids = ProcessedIds::new();
    assert!(ids.insert("b"));
    assert!(ids.insert("a"));
    assert!(!ids.insert("b"));

    assert_eq!(ids.len(), 2);
    assert!(ids.contains("a"));
    assert!(!ids.contains("c"));
    assert_eq!(ids.iter().collect::<Vec<_>>(), vec!["b", "a"]);
}

#[test]
fn processed_ids_collect_dedups() {
    let ids: ProcessedIds = ["x", "y", "x", "z", "y"].into_iter().collect();
    assert_eq!(ids.to_vec(), vec!["x", "y", "z"]);
}

#[test]
fn settle_total_drops_unfinished_page() {
    let mut stats = RunStats::new(Mode::RemoveOnly);
    stats.discovered(5);
    stats.record_item(ItemTally {
        removed: true,
        ..ItemTally::default()
    });
    assert_eq!(stats.remaining(), 4);

    stats.settle_total(1);
    assert_eq!(stats.total, 1);
    assert_eq!(stats.remaining(), 0);
}
