use super::*;

fn recorder(manager: &EventManager, topic: &str, tag: &'static str) -> (Arc<Mutex<Vec<String>>>, Subscription) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let subscription = manager.subscribe(topic, move |event: &ChangeEvent| {
        sink.lock()
            .expect("recorder lock")
            .push(format!("{tag}:{}", event.payload.clone().unwrap_or_default()));
    });
    (seen, subscription)
}

#[test]
fn handlers_fire_in_registration_order() {
    let manager = EventManager::new();
    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in ["first", "second", "third"] {
        let sink = Arc::clone(&order);
        manager.subscribe(NOTIFICATION_LIST_TOPIC, move |_event| {
            sink.lock().expect("order lock").push(tag);
        });
    }

    manager.publish(NOTIFICATION_LIST_TOPIC, None);

    assert_eq!(
        order.lock().expect("order lock").as_slice(),
        ["first", "second", "third"]
    );
}

#[test]
fn publish_only_reaches_matching_topic() {
    let manager = EventManager::new();
    let (list_seen, _list_sub) = recorder(&manager, NOTIFICATION_LIST_TOPIC, "list");
    let (other_seen, _other_sub) = recorder(&manager, "somethingElseModification", "other");

    manager.publish(NOTIFICATION_LIST_TOPIC, Some("deleted 3".into()));

    assert_eq!(
        list_seen.lock().expect("seen lock").as_slice(),
        ["list:deleted 3"]
    );
    assert!(other_seen.lock().expect("seen lock").is_empty());
}

#[test]
fn unsubscribe_removes_exactly_one_handler_and_is_idempotent() {
    let manager = EventManager::new();
    let (first_seen, first_sub) = recorder(&manager, NOTIFICATION_LIST_TOPIC, "first");
    let (second_seen, _second_sub) = recorder(&manager, NOTIFICATION_LIST_TOPIC, "second");

    manager.unsubscribe(&first_sub);
    // Second unsubscribe of the same handle must be a silent no-op.
    manager.unsubscribe(&first_sub);

    manager.publish(NOTIFICATION_LIST_TOPIC, None);

    assert!(first_seen.lock().expect("seen lock").is_empty());
    assert_eq!(second_seen.lock().expect("seen lock").len(), 1);
}

#[test]
fn handlers_registered_after_a_publish_do_not_replay_it() {
    let manager = EventManager::new();
    manager.publish(NOTIFICATION_LIST_TOPIC, Some("early".into()));

    let (seen, _sub) = recorder(&manager, NOTIFICATION_LIST_TOPIC, "late");
    assert!(seen.lock().expect("seen lock").is_empty());

    manager.publish(NOTIFICATION_LIST_TOPIC, Some("after".into()));
    assert_eq!(seen.lock().expect("seen lock").as_slice(), ["late:after"]);
}

#[test]
fn reentrant_subscribe_from_a_handler_does_not_deadlock() {
    let manager = Arc::new(EventManager::new());
    let inner_seen = Arc::new(Mutex::new(0u32));

    let manager_for_handler = Arc::clone(&manager);
    let inner_for_handler = Arc::clone(&inner_seen);
    manager.subscribe(NOTIFICATION_LIST_TOPIC, move |_event| {
        let counter = Arc::clone(&inner_for_handler);
        manager_for_handler.subscribe(NOTIFICATION_LIST_TOPIC, move |_event| {
            *counter.lock().expect("counter lock") += 1;
        });
    });

    manager.publish(NOTIFICATION_LIST_TOPIC, None);
    assert_eq!(*inner_seen.lock().expect("counter lock"), 0);

    manager.publish(NOTIFICATION_LIST_TOPIC, None);
    assert_eq!(*inner_seen.lock().expect("counter lock"), 1);
}
