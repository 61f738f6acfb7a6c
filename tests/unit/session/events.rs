use std::{cell::Cell, rc::Rc};

use super::*;

#[test]
fn dropping_subscription_detaches_listener() {
    let hub = EventHub::<u32>::new();
    let seen = Rc::new(Cell::new(0u32));
    let s = seen.clone();
    let sub = hub.subscribe(move |v| s.set(s.get() + *v));
    hub.emit(&2);
    assert_eq!(seen.get(), 2);
    assert_eq!(hub.listener_count(), 1);

    drop(sub);
    hub.emit(&5);
    assert_eq!(seen.get(), 2);
    assert_eq!(hub.listener_count(), 0);
}

#[test]
fn subscription_outliving_hub_is_harmless() {
    let hub = EventHub::<()>::new();
    let sub = hub.subscribe(|_| {});
    drop(hub);
    drop(sub);
}

#[test]
fn listeners_only_see_events_after_subscribing() {
    let hub = EventHub::<&'static str>::new();
    hub.emit(&"early");
    let log = Rc::new(std::cell::RefCell::new(Vec::new()));
    let l = log.clone();
    let _sub = hub.subscribe(move |e| l.borrow_mut().push(*e));
    hub.emit(&"late");
    assert_eq!(*log.borrow(), vec!["late"]);
}

#[test]
fn subscribing_from_a_listener_takes_effect_after_delivery() {
    let hub = Rc::new(EventHub::<u32>::new());
    let late_seen = Rc::new(std::cell::RefCell::new(Vec::new()));
    let held = Rc::new(std::cell::RefCell::new(Vec::<Subscription>::new()));

    let (h, l, k) = (Rc::downgrade(&hub), late_seen.clone(), held.clone());
    let _first = hub.subscribe(move |v| {
        if *v == 1
            && let Some(hub) = h.upgrade()
        {
            let l = l.clone();
            k.borrow_mut().push(hub.subscribe(move |v| l.borrow_mut().push(*v)));
        }
    });

    hub.emit(&1);
    assert!(late_seen.borrow().is_empty());
    assert_eq!(hub.listener_count(), 2);

    hub.emit(&2);
    assert_eq!(*late_seen.borrow(), vec![2]);
}

#[test]
fn dropping_a_subscription_from_a_listener_detaches_after_delivery() {
    let hub = EventHub::<u32>::new();
    let seen = Rc::new(Cell::new(0u32));
    let own: Rc<std::cell::RefCell<Option<Subscription>>> = Rc::default();

    let (s, o) = (seen.clone(), own.clone());
    let sub = hub.subscribe(move |v| {
        s.set(s.get() + *v);
        o.borrow_mut().take();
    });
    *own.borrow_mut() = Some(sub);

    hub.emit(&3);
    assert_eq!(seen.get(), 3);
    assert_eq!(hub.listener_count(), 0);

    hub.emit(&4);
    assert_eq!(seen.get(), 3);
}
