//! Lifecycle tests for the tab manager.
//!
//! These cover the state machine's core guarantees:
//! - the capacity bound holds after every operation (eviction precedes
//!   insertion, never follows it)
//! - the recency ledger always mirrors the open-tab set
//! - `open` is idempotent per id and first-write-wins on title/route
//! - eviction targets the least recently used tab, never the active one
//!   (unless it is the only candidate)
//! - closing the active tab reassigns activation by recency
//! - close-right works on display order, which is independent of recency

mod common;

use common::{id, new_manager, record_events, static_loader};
use std::collections::BTreeSet;
use std::time::Duration;
use webdeck::{ShellError, TabEvent};

const FRAGMENTS: &[(&str, &str)] = &[
    ("/a", "<p>a</p>"),
    ("/b", "<p>b</p>"),
    ("/c", "<p>c</p>"),
    ("/d", "<p>d</p>"),
    ("/x", "<p>x</p>"),
    ("/y", "<p>y</p>"),
];

// ============================================================================
// Capacity and ledger invariants
// ============================================================================

#[test]
fn capacity_bound_holds_after_every_open() {
    let (_rt, mut mgr) = new_manager(3, static_loader(FRAGMENTS));

    for n in 0..10 {
        let name = format!("t{n}");
        mgr.open(name.as_str(), &name, "/a").expect("open");
        assert!(
            mgr.open_count() <= 3,
            "capacity exceeded after opening {name}: {} tabs",
            mgr.open_count()
        );
    }
    assert_eq!(mgr.open_count(), 3);
}

#[test]
fn ledger_mirrors_the_open_set_after_every_operation() {
    let (_rt, mut mgr) = new_manager(3, static_loader(FRAGMENTS));

    let check = |mgr: &webdeck::TabManager| {
        let open: BTreeSet<_> = mgr.display_order().into_iter().collect();
        let ledger = mgr.recency_order();
        let ledger_set: BTreeSet<_> = ledger.iter().cloned().collect();
        assert_eq!(
            ledger.len(),
            ledger_set.len(),
            "recency ledger contains duplicates: {ledger:?}"
        );
        assert_eq!(ledger_set, open, "ledger and open set diverged");
    };

    mgr.open("a", "A", "/a").expect("open a");
    check(&mgr);
    mgr.open("b", "B", "/b").expect("open b");
    check(&mgr);
    mgr.activate(&id("a")).expect("activate a");
    check(&mgr);
    mgr.activate(&id("a")).expect("re-activate a");
    check(&mgr);
    mgr.open("c", "C", "/c").expect("open c");
    check(&mgr);
    mgr.open("d", "D", "/d").expect("open d, evicting");
    check(&mgr);
    mgr.close(&id("a")).expect("close a");
    check(&mgr);
    mgr.close_all();
    check(&mgr);
}

// ============================================================================
// Idempotent open
// ============================================================================

#[test]
fn reopening_an_open_id_activates_without_overwriting() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "First", "/a").expect("open");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.open("a", "Second", "/x").expect("re-open");

    assert_eq!(mgr.open_count(), 2, "re-open must not create a second tab");
    let tab = mgr.get_tab(&id("a")).expect("tab a is open");
    assert_eq!(tab.title, "First", "title is first-write-wins");
    assert_eq!(tab.route, "/a", "route is first-write-wins");
    assert_eq!(mgr.get_active(), Some(&id("a")), "re-open activates");
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn eviction_targets_lru_and_spares_the_active_tab() {
    let (_rt, mut mgr) = new_manager(2, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.activate(&id("a")).expect("activate a");
    mgr.open("c", "C", "/c").expect("open c, evicting");

    // B is least recently used; A is active and spared.
    assert!(!mgr.is_open(&id("b")), "b must be evicted");
    assert!(mgr.is_open(&id("a")));
    assert!(mgr.is_open(&id("c")));
    assert_eq!(mgr.get_active(), Some(&id("c")), "new tab is activated");
}

#[test]
fn eviction_emits_a_closed_event() {
    let (_rt, mut mgr) = new_manager(1, static_loader(FRAGMENTS));
    let events = record_events(&mut mgr);

    mgr.open("x", "X", "/x").expect("open x");
    mgr.open("y", "Y", "/y").expect("open y, evicting x");

    let events = events.lock().expect("lock");
    assert!(
        events.contains(&TabEvent::Closed { id: id("x") }),
        "eviction is observable as a close: {events:?}"
    );
}

#[test]
fn single_slot_shell_swaps_tabs_end_to_end() {
    let (_rt, mut mgr) = new_manager(1, static_loader(FRAGMENTS));

    mgr.open("x", "X", "/x").expect("open x");
    assert!(mgr.is_open(&id("x")));
    assert_eq!(mgr.get_active(), Some(&id("x")));

    mgr.open("y", "Y", "/y").expect("open y");
    assert!(!mgr.is_open(&id("x")), "x is evicted");
    assert!(mgr.is_open(&id("y")));
    assert_eq!(mgr.get_active(), Some(&id("y")));
    assert_eq!(mgr.open_count(), 1);

    mgr.wait_for_loads(Duration::from_secs(5));
    assert_eq!(
        mgr.view().panel(&id("y")).map(|p| p.markup.as_str()),
        Some("<p>y</p>")
    );
}

// ============================================================================
// Close and active reassignment
// ============================================================================

#[test]
fn closing_the_active_tab_activates_the_most_recent_remaining() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.open("c", "C", "/c").expect("open c");
    mgr.activate(&id("b")).expect("activate b");
    mgr.close(&id("b")).expect("close b");

    // Recency among the remaining tabs is a then c; c wins.
    assert_eq!(mgr.get_active(), Some(&id("c")));

    mgr.activate(&id("a")).expect("activate a");
    mgr.close(&id("a")).expect("close a");
    assert_eq!(mgr.get_active(), Some(&id("c")));
}

#[test]
fn closing_an_inactive_tab_keeps_the_active_one() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.close(&id("a")).expect("close a");

    assert_eq!(mgr.get_active(), Some(&id("b")));
    assert_eq!(mgr.view().header_title(), "B");
}

#[test]
fn closing_the_last_tab_resets_the_header() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    assert_eq!(mgr.view().header_title(), "A");

    mgr.close(&id("a")).expect("close a");
    assert_eq!(mgr.get_active(), None);
    assert_eq!(mgr.view().header_title(), mgr.config().app_title);
    assert!(mgr.view().is_empty());
}

#[test]
fn operations_on_unknown_ids_are_soft_errors() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));
    mgr.open("a", "A", "/a").expect("open a");

    assert_eq!(
        mgr.close(&id("zz")),
        Err(ShellError::NotOpen { id: id("zz") })
    );
    assert_eq!(
        mgr.activate(&id("zz")),
        Err(ShellError::NotOpen { id: id("zz") })
    );
    assert_eq!(mgr.open_count(), 1, "state is untouched");
    assert_eq!(mgr.get_active(), Some(&id("a")));
}

// ============================================================================
// Bulk close operations
// ============================================================================

#[test]
fn close_others_keeps_only_the_given_tab() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.open("c", "C", "/c").expect("open c");
    mgr.close_others(&id("b"));

    assert_eq!(mgr.display_order(), vec![id("b")]);
    assert_eq!(mgr.get_active(), Some(&id("b")));
}

#[test]
fn close_all_empties_the_shell() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.close_all();

    assert_eq!(mgr.open_count(), 0);
    assert_eq!(mgr.get_active(), None);
    assert!(mgr.view().is_empty());
}

#[test]
fn close_right_uses_display_order_not_recency() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.open("c", "C", "/c").expect("open c");
    // Make c the most recently used; display order stays [a, b, c].
    mgr.activate(&id("c")).expect("activate c");

    mgr.close_right(&id("a"));

    assert_eq!(
        mgr.display_order(),
        vec![id("a")],
        "b and c are to the right of a regardless of recency"
    );
    assert_eq!(mgr.get_active(), Some(&id("a")), "active falls back to a");
}

#[test]
fn close_right_of_the_last_tab_closes_nothing() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));

    mgr.open("a", "A", "/a").expect("open a");
    mgr.open("b", "B", "/b").expect("open b");
    mgr.close_right(&id("b"));

    assert_eq!(mgr.display_order(), vec![id("a"), id("b")]);
}

// ============================================================================
// Event surface
// ============================================================================

#[test]
fn activation_events_carry_id_and_title() {
    let (_rt, mut mgr) = new_manager(5, static_loader(FRAGMENTS));
    let events = record_events(&mut mgr);

    mgr.open("a", "Accounts", "/a").expect("open a");
    mgr.close(&id("a")).expect("close a");

    let events = events.lock().expect("lock");
    assert_eq!(
        *events,
        vec![
            TabEvent::Activated {
                id: id("a"),
                title: "Accounts".to_string()
            },
            TabEvent::Closed { id: id("a") },
        ]
    );
}
