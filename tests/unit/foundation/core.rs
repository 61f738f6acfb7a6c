use super::*;

#[test]
fn canvas_rejects_zero_dims() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    let c = Canvas::new(1920, 1080).unwrap();
    assert!((c.aspect() - 16.0 / 9.0).abs() < 1e-6);
    assert_eq!(c.byte_len(), 1920 * 1080 * 4);
}

#[test]
fn manual_clock_handles_share_time() {
    let clock = ManualClock::new();
    let handle = clock.clone();
    handle.advance_ms(250);
    assert_eq!(clock.now(), Duration::from_millis(250));
    handle.set(Duration::from_millis(100));
    assert_eq!(clock.now(), Duration::from_millis(250));
    handle.set(Duration::from_secs(1));
    assert_eq!(clock.now(), Duration::from_secs(1));
}

#[test]
fn secs_between_saturates() {
    let a = Duration::from_millis(1500);
    let b = Duration::from_millis(500);
    assert_eq!(secs_between(a, b), 0.0);
    assert!((secs_between(b, a) - 1.0).abs() < 1e-12);
}
