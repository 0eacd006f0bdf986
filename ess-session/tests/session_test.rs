use std::sync::Barrier;
use std::time::Duration;

use ess_core::models::{Speaker, Turn};
use ess_session::SessionStore;
use proptest::prelude::*;

// ── Creation on first reference ──

#[test]
fn get_creates_empty_transcript() {
    let store = SessionStore::new();
    assert!(store.get("s1").is_empty());
    assert_eq!(store.session_count(), 1);
    assert_eq!(store.session_ids(), vec!["s1".to_string()]);
}

// ── Ordering ──

#[test]
fn appends_keep_order() {
    let store = SessionStore::new();
    store.append("s1", Turn::user("q1"));
    store.append("s1", Turn::assistant("a1"));
    store.with_transcript("s1", |t| t.record_exchange("q2", "a2"));

    let transcript = store.get("s1");
    let got: Vec<(Speaker, &str)> = transcript
        .turns()
        .iter()
        .map(|t| (t.speaker, t.text.as_str()))
        .collect();
    assert_eq!(
        got,
        vec![
            (Speaker::User, "q1"),
            (Speaker::Assistant, "a1"),
            (Speaker::User, "q2"),
            (Speaker::Assistant, "a2"),
        ]
    );
}

#[test]
fn sessions_are_isolated() {
    let store = SessionStore::new();
    store.with_transcript("a", |t| t.record_exchange("qa", "aa"));
    assert!(store.get("b").is_empty());
    assert_eq!(store.get("a").len(), 2);
}

// ── Concurrency ──

#[test]
fn concurrent_exchanges_on_one_session_never_interleave() {
    let store = SessionStore::new();
    std::thread::scope(|scope| {
        for worker in 0..8 {
            let store = &store;
            scope.spawn(move || {
                for i in 0..25 {
                    store.with_transcript("shared", |t| {
                        t.push(Turn::user(format!("q-{worker}-{i}")));
                        std::thread::yield_now();
                        t.push(Turn::assistant(format!("a-{worker}-{i}")));
                    });
                }
            });
        }
    });

    let transcript = store.get("shared");
    assert_eq!(transcript.len(), 8 * 25 * 2);
    for pair in transcript.turns().chunks(2) {
        assert_eq!(pair[0].speaker, Speaker::User);
        assert_eq!(pair[1].speaker, Speaker::Assistant);
        assert_eq!(pair[0].text.replacen('q', "a", 1), pair[1].text);
    }
}

#[test]
fn distinct_sessions_do_not_block_each_other() {
    let store = SessionStore::new();
    let barrier = Barrier::new(2);
    // Both closures must be inside their session lock at the same time for
    // the barrier to release.
    std::thread::scope(|scope| {
        for id in ["left", "right"] {
            let (store, barrier) = (&store, &barrier);
            scope.spawn(move || {
                store.with_transcript(id, |t| {
                    barrier.wait();
                    t.record_exchange("q", "a");
                });
            });
        }
    });
    assert_eq!(store.session_count(), 2);
}

#[test]
fn poisoned_session_lock_is_recovered() {
    let store = SessionStore::new();
    store.with_transcript("p", |t| t.record_exchange("q", "a"));
    let handle = store.session("p");
    let result = std::thread::scope(|scope| {
        scope
            .spawn(|| {
                let _guard = handle.lock();
                std::thread::sleep(Duration::from_millis(1));
                panic!("worker failed mid-request");
            })
            .join()
    });
    assert!(result.is_err());
    assert_eq!(store.get("p").len(), 2);
}

proptest! {
    #[test]
    fn every_exchange_adds_exactly_two_turns(n in 0usize..20) {
        let store = SessionStore::new();
        for i in 0..n {
            store.with_transcript("s", |t| t.record_exchange(format!("q{i}"), format!("a{i}")));
        }
        prop_assert_eq!(store.get("s").len(), n * 2);
    }
}
