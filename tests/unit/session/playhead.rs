use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn runs_only_while_started_and_caps_at_duration() {
    let mut p = Playhead::new(2.0);
    assert_eq!(p.position(ms(500)), 0.0);
    p.start(ms(1000));
    assert!((p.position(ms(1500)) - 0.5).abs() < 1e-9);
    p.stop(ms(1500));
    assert!((p.position(ms(9000)) - 0.5).abs() < 1e-9);
    p.start(ms(10_000));
    assert_eq!(p.position(ms(60_000)), 2.0);
    assert!(p.at_end(ms(60_000)));
    assert_eq!(p.remaining(ms(60_000)), 0.0);
}

#[test]
fn seek_resumes_counting_from_target() {
    let mut p = Playhead::new(5.0);
    p.start(ms(0));
    p.seek(3.0, ms(1000));
    assert!((p.position(ms(1000)) - 3.0).abs() < 1e-9);
    assert!((p.position(ms(1500)) - 3.5).abs() < 1e-9);
}

#[test]
fn seek_clamps_and_ignores_nan() {
    let mut p = Playhead::new(5.0);
    p.seek(99.0, ms(0));
    assert_eq!(p.position(ms(0)), 5.0);
    p.seek(-1.0, ms(0));
    assert_eq!(p.position(ms(0)), 0.0);
    p.seek(f64::NAN, ms(0));
    assert_eq!(p.position(ms(0)), 0.0);
}

#[test]
fn double_start_keeps_first_anchor() {
    let mut p = Playhead::new(10.0);
    p.start(ms(0));
    p.start(ms(4000));
    assert!((p.position(ms(5000)) - 5.0).abs() < 1e-9);
}
