//! Integration tests for agentos-bus NotificationDispatcher

use agentos_bus::{NotificationBus, NotificationDispatcher, NotificationKind, Notifier};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[tokio::test]
async fn test_dispatcher_runs_until_senders_dropped() {
    let (bus, rx) = NotificationBus::channel();
    let dispatcher = NotificationDispatcher::new(rx);

    let counter = Arc::new(AtomicUsize::new(0));
    let c = Arc::clone(&counter);
    let handle = tokio::spawn(dispatcher.run(move |_n| {
        c.fetch_add(1, Ordering::SeqCst);
    }));

    bus.success("one");
    bus.error("two");
    drop(bus);

    let handled = handle.await.unwrap();
    assert_eq!(handled, 2);
    assert_eq!(counter.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dispatcher_handler_receives_kinds_in_order() {
    let (bus, rx) = NotificationBus::channel();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let s = Arc::clone(&seen);
    let handle = tokio::spawn(NotificationDispatcher::new(rx).run(move |n| {
        s.lock().unwrap().push(n.kind);
    }));

    bus.success("a");
    bus.error("b");
    bus.info("c");
    drop(bus);
    handle.await.unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            NotificationKind::Success,
            NotificationKind::Error,
            NotificationKind::Info
        ]
    );
}

#[test]
fn test_drain_collects_queued_without_waiting() {
    let (bus, rx) = NotificationBus::channel();
    let mut dispatcher = NotificationDispatcher::new(rx);

    assert!(dispatcher.drain().is_empty());

    bus.error("x.pdf: too large");
    bus.error("y.exe: file type not allowed");

    let drained = dispatcher.drain();
    assert_eq!(drained.len(), 2);
    assert_eq!(drained[0].message, "x.pdf: too large");
    assert!(dispatcher.drain().is_empty());
}

#[tokio::test]
async fn test_dispatcher_with_no_messages() {
    let (bus, rx) = NotificationBus::channel();
    drop(bus);

    let handled = NotificationDispatcher::new(rx).run(|_| {}).await;
    assert_eq!(handled, 0);
}
