use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use zw_sessions::SessionRegistry;

#[test]
fn concurrent_first_visits_get_distinct_sessions() {
    const N: usize = 32;
    let registry = Arc::new(SessionRegistry::new());
    let barrier = Arc::new(Barrier::new(N));

    let handles: Vec<_> = (0..N)
        .map(|_| {
            let registry = registry.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                registry.resolve(None).issued_cookie.unwrap()
            })
        })
        .collect();

    let ids: HashSet<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(ids.len(), N);
    assert_eq!(registry.len(), N);
}

#[test]
fn concurrent_lookups_of_one_id_share_the_session() {
    let registry = Arc::new(SessionRegistry::new());
    let id = registry.resolve(None).issued_cookie.unwrap();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = registry.clone();
            let id = id.clone();
            thread::spawn(move || {
                let res = registry.resolve(Some(&id));
                assert!(res.issued_cookie.is_none());
                res.session.set_setting(format!("k{i}"), i.to_string());
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(registry.len(), 1);
    let session = registry.get(&id).unwrap();
    assert_eq!(session.setting_count(), 16);
}

#[test]
fn concurrent_writers_lose_no_updates() {
    const M: usize = 64;
    let registry = SessionRegistry::new();
    let session = registry.resolve(None).session;

    thread::scope(|scope| {
        for i in 0..M {
            let session = &session;
            scope.spawn(move || {
                session.set_setting(format!("key-{i}"), format!("value-{i}"));
            });
        }
    });

    for i in 0..M {
        assert_eq!(session.get_setting(&format!("key-{i}")), format!("value-{i}"));
    }
}
