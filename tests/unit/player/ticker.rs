use super::*;

#[test]
fn request_and_cancel_are_edge_triggered() {
    let handle = FlagTicker::new();
    let mut t = handle.clone();
    t.request();
    t.request();
    assert!(handle.is_active());
    assert_eq!(handle.requests(), 1);
    t.cancel();
    t.cancel();
    assert!(!handle.is_active());
    assert_eq!(handle.cancels(), 1);
}
