use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn progress_is_elapsed_over_duration() {
    let mut t = TransitionState::new(ms(1000), ms(1000));
    assert_eq!(t.update(ms(1000)), 0.0);
    assert!((t.update(ms(1250)) - 0.25).abs() < 1e-9);
    assert!(!t.is_complete());
    assert_eq!(t.update(ms(2000)), 1.0);
    assert!(t.is_complete());
    assert_eq!(t.update(ms(5000)), 1.0);
}

#[test]
fn progress_never_decreases() {
    let mut t = TransitionState::new(ms(500), ms(1000));
    t.update(ms(1000));
    assert_eq!(t.update(ms(700)), 0.5);
    assert_eq!(t.update(ms(0)), 0.5);
}

#[test]
fn zero_duration_completes_immediately() {
    let mut t = TransitionState::new(ms(10), Duration::ZERO);
    assert_eq!(t.update(ms(10)), 1.0);
}
