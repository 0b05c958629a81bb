//! Engine-level unit tests. End-to-end scenario coverage lives in
//! `tests/scenarios.rs`.

use rondo_types::wheel;
use rondo_types::{Item, ItemName, Mode, SpinError};

use crate::store::PersistentStore;
use crate::{Engine, MemoryStore, keys};

fn name(s: &str) -> ItemName {
    ItemName::new(s).unwrap()
}

fn engine_with(names: &[&str]) -> Engine<MemoryStore> {
    let items: Vec<Item> = names.iter().map(|s| Item::new(name(s))).collect();
    let mut engine = Engine::new(MemoryStore::new(), items);
    engine.seed(99);
    engine
}

#[test]
fn spin_without_batch_is_no_eligible_winner() {
    let mut engine = engine_with(&["a", "b", "c"]);
    assert_eq!(engine.spin(), Err(SpinError::NoEligibleWinner));
}

#[test]
fn spin_gate_rejects_reentry_until_settle() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    engine.new_batch(None).unwrap();

    engine.spin().unwrap();
    assert!(engine.is_spinning());
    assert_eq!(engine.spin(), Err(SpinError::SpinInProgress));

    engine.settle();
    assert!(!engine.is_spinning());
    engine.new_batch(None).unwrap();
    assert!(engine.spin().is_ok());
}

#[test]
fn settle_adopts_normalized_rotation() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    engine.new_batch(None).unwrap();

    let outcome = engine.spin().unwrap();
    assert_eq!(engine.rotation(), 0.0, "rotation advances only on settle");

    engine.settle();
    assert_eq!(engine.rotation(), wheel::normalize_deg(outcome.final_rotation));
    assert!(engine.rotation() >= 0.0 && engine.rotation() < 360.0);
}

#[test]
fn outcome_rotation_recovers_winner_wedge() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    for _ in 0..7 {
        engine.new_batch(None).unwrap();
        let outcome = engine.spin().unwrap();
        engine.settle();

        let winner_index = outcome
            .batch
            .iter()
            .position(|slot| *slot == outcome.winner)
            .unwrap();
        assert_eq!(
            wheel::recover_index(outcome.final_rotation, outcome.wedge_count),
            winner_index
        );
    }
}

#[test]
fn spin_commits_before_settle() {
    let mut engine = engine_with(&["a", "b", "c"]);
    engine.new_batch(None).unwrap();

    let outcome = engine.spin().unwrap();
    // No settle: the accept is already durable in ledgers and store.
    assert!(engine.ledgers().sealed().contains(&outcome.winner));
    assert!(engine.ledgers().won_this_batch().contains(&outcome.winner));
    assert_eq!(engine.ledgers().history(), [outcome.winner.clone()]);

    let persisted = engine.store().get(keys::SEALED).unwrap();
    assert!(persisted.contains(outcome.winner.as_str()));
}

#[test]
fn new_batch_clears_won_this_batch() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    engine.new_batch(None).unwrap();
    engine.spin().unwrap();
    engine.settle();
    assert_eq!(engine.ledgers().won_this_batch().len(), 1);

    engine.new_batch(None).unwrap();
    assert!(engine.ledgers().won_this_batch().is_empty());
    // The clear is persisted too.
    assert_eq!(
        engine.store().get(keys::WON_THIS_BATCH).as_deref(),
        Some("[]")
    );
}

#[test]
fn preserve_applies_only_to_current_winner() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    engine.new_batch(None).unwrap();
    let winner = engine.spin().unwrap().winner;
    engine.settle();

    let other = engine
        .pool()
        .names()
        .iter()
        .find(|n| **n != winner)
        .unwrap()
        .clone();
    let depth = engine.undo_depth();
    engine.preserve(&other);
    assert!(engine.ledgers().sealed().contains(&winner));
    assert_eq!(engine.undo_depth(), depth, "ignored preserve pushes nothing");

    engine.preserve(&winner);
    assert!(engine.ledgers().sealed().is_empty());
    assert!(engine.ledgers().history().is_empty());
    assert_eq!(engine.last_winner(), None);

    // The winner is gone; preserving again is a no-op.
    let depth = engine.undo_depth();
    engine.preserve(&winner);
    assert_eq!(engine.undo_depth(), depth);
}

#[test]
fn delete_record_on_absent_id_pushes_no_snapshot() {
    let mut engine = engine_with(&["a", "b", "c"]);
    let depth = engine.undo_depth();
    engine.delete_record(&name("a"));
    engine.delete_record(&name("never-seen"));
    assert_eq!(engine.undo_depth(), depth);
}

#[test]
fn delete_record_unseals_any_past_pick() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    engine.new_batch(None).unwrap();
    let first = engine.spin().unwrap().winner;
    engine.settle();
    engine.new_batch(None).unwrap();
    let second = engine.spin().unwrap().winner;
    engine.settle();

    engine.delete_record(&first);
    assert!(!engine.ledgers().sealed().contains(&first));
    assert!(engine.ledgers().sealed().contains(&second));
    assert_eq!(engine.ledgers().history(), [second.clone()]);
    // `first` was not the current winner, so that stays.
    assert_eq!(engine.last_winner(), Some(&second));
}

#[test]
fn toggle_favorite_roundtrips_and_snapshots() {
    let mut engine = engine_with(&["a", "b"]);
    assert!(engine.toggle_favorite(&name("a")));
    assert!(engine.ledgers().is_favorite(&name("a")));
    assert!(!engine.toggle_favorite(&name("a")));
    assert!(!engine.ledgers().is_favorite(&name("a")));
    assert_eq!(engine.undo_depth(), 2);

    // Favorites accept ids outside the pool; they are an independent set.
    assert!(engine.toggle_favorite(&name("not-in-pool")));
}

#[test]
fn clear_favorites_on_empty_set_is_a_noop() {
    let mut engine = engine_with(&["a"]);
    engine.clear_favorites();
    assert_eq!(engine.undo_depth(), 0);

    engine.toggle_favorite(&name("a"));
    engine.clear_favorites();
    assert!(engine.ledgers().favorites().is_empty());
    assert_eq!(engine.undo_depth(), 2);
}

#[test]
fn undo_is_blocked_while_spinning() {
    let mut engine = engine_with(&["a", "b", "c"]);
    engine.new_batch(None).unwrap();
    engine.spin().unwrap();

    assert!(!engine.undo());
    engine.settle();
    assert!(engine.undo());
}

#[test]
fn undo_drops_the_stale_batch() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    engine.new_batch(None).unwrap();
    engine.spin().unwrap();
    engine.settle();

    assert!(engine.undo());
    assert!(engine.active_batch().is_none());
    assert!(engine.ledgers().sealed().is_empty());
}

#[test]
fn set_mode_drops_batch_only_on_change() {
    let mut engine = engine_with(&["a", "b", "c"]);
    engine.new_batch(None).unwrap();

    engine.set_mode(Mode::All);
    assert!(engine.active_batch().is_some(), "same mode keeps the batch");

    engine.set_mode(Mode::ByRegion(None));
    assert!(engine.active_batch().is_none());
}

#[test]
fn add_item_grows_pool_once_and_rejects_blank() {
    let mut engine = engine_with(&["a", "b"]);
    assert!(engine.add_item("  c  ").is_ok());
    assert_eq!(engine.pool().len(), 3);
    assert!(engine.add_item("c").is_ok());
    assert_eq!(engine.pool().len(), 3);
    assert!(engine.add_item("   ").is_err());
    assert_eq!(engine.undo_depth(), 0, "pool growth is not undoable");
}

#[test]
fn added_item_is_offered_via_forced_include() {
    let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
    let added = engine.add_item("h").unwrap();
    let batch = engine.new_batch(Some(&added)).unwrap();
    assert!(batch.contains(&added));
}

#[test]
fn reopened_engine_adopts_persisted_state() {
    let mut engine = engine_with(&["a", "b", "c"]);
    engine.new_batch(None).unwrap();
    let winner = engine.spin().unwrap().winner;
    engine.settle();
    engine.toggle_favorite(&name("b"));
    let depth = engine.undo_depth();

    let store = engine.into_store();
    let items: Vec<Item> = ["a", "b", "c"].iter().map(|s| Item::new(name(s))).collect();
    let reopened = Engine::new(store, items);

    assert!(reopened.ledgers().sealed().contains(&winner));
    assert_eq!(reopened.ledgers().history(), [winner]);
    assert!(reopened.ledgers().is_favorite(&name("b")));
    assert_eq!(reopened.undo_depth(), depth);
    assert!(reopened.active_batch().is_none(), "batches never persist");
}

#[test]
fn batch_size_override_controls_wedge_count() {
    let items: Vec<Item> = ["a", "b", "c", "d", "e"]
        .iter()
        .map(|s| Item::new(name(s)))
        .collect();
    let mut engine = Engine::new(MemoryStore::new(), items).with_batch_size(3);
    engine.seed(1);

    let batch = engine.new_batch(None).unwrap();
    assert_eq!(batch.len(), 3);

    let outcome = engine.spin().unwrap();
    assert_eq!(outcome.wedge_count, 3);
}

#[test]
fn same_seed_same_draw_and_winner() {
    let run = || {
        let mut engine = engine_with(&["a", "b", "c", "d", "e", "f", "g"]);
        engine.seed(1234);
        let batch = engine.new_batch(None).unwrap().order().to_vec();
        let outcome = engine.spin().unwrap();
        (batch, outcome.winner, outcome.final_rotation)
    };
    assert_eq!(run(), run());
}
