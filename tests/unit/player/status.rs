use super::*;

#[test]
fn set_replaces_current_and_formats() {
    let mut line = StatusLine::new();
    assert_eq!(line.current().kind, StatusKind::Loading);
    let s = line.set(StatusKind::Blocked, "tap play to start").clone();
    assert_eq!(s, *line.current());
    assert_eq!(s.to_string(), "blocked: tap play to start");
}
