use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::media::memory::{MemoryLoader, SyntheticVideo};

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

const OPEN: PlayGate = PlayGate {
    policy: AutoplayPolicy::Allowed,
    user_activated: false,
};

const LOCKED: PlayGate = PlayGate {
    policy: AutoplayPolicy::RequiresGesture,
    user_activated: false,
};

fn video_session(duration: f64) -> PlaybackSession {
    PlaybackSession::Video(VideoSession::new(Box::new(SyntheticVideo::new(
        4,
        4,
        duration,
        [10, 0, 10, 255],
    ))))
}

fn record(session: &PlaybackSession) -> (Rc<RefCell<Vec<SessionEvent>>>, crate::Subscription) {
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    let sub = session
        .events()
        .subscribe(move |e: &SessionEvent| l.borrow_mut().push(e.clone()));
    (log, sub)
}

#[test]
fn gate_only_restricts_video() {
    assert!(LOCKED.permits(MediaKind::Image));
    assert!(!LOCKED.permits(MediaKind::Video));
    assert!(OPEN.permits(MediaKind::Video));
    let gestured = PlayGate {
        user_activated: true,
        ..LOCKED
    };
    assert!(gestured.permits(MediaKind::Video));
}

#[test]
fn blocked_video_stays_paused_and_presentable() {
    let mut s = video_session(10.0);
    let err = s.play(ms(0), LOCKED).unwrap_err();
    assert!(err.is_autoplay_blocked());
    assert!(!s.is_playing());
    assert!(s.current_frame(ms(0)).unwrap().is_some());
}

#[test]
fn video_reaches_end_exactly_once() {
    let mut s = video_session(2.0);
    let (log, _sub) = record(&s);
    s.play(ms(0), OPEN).unwrap();
    s.poll(ms(1000));
    s.poll(ms(2000));
    s.poll(ms(2500));
    assert!(!s.is_playing());
    assert_eq!(s.current_time(ms(3000)), 2.0);
    let ended = log
        .borrow()
        .iter()
        .filter(|e| **e == SessionEvent::ReachedEnd)
        .count();
    assert_eq!(ended, 1);
}

#[test]
fn replay_after_end_restarts_from_zero() {
    let mut s = video_session(1.0);
    s.play(ms(0), OPEN).unwrap();
    s.poll(ms(1500));
    s.play(ms(2000), OPEN).unwrap();
    assert!((s.current_time(ms(2250)) - 0.25).abs() < 1e-9);
}

#[test]
fn image_seek_updates_elapsed_and_resumes_timer() {
    let entry = PlaylistEntry::image("b.png", 5.0);
    let mut s = PlaybackSession::from_loaded(
        &entry,
        LoadedMedia::Image(VisualFrame::solid(2, 2, [1, 1, 1, 255])),
    )
    .unwrap();
    let (log, _sub) = record(&s);
    s.play(ms(0), LOCKED).unwrap();
    s.seek(3.0, ms(1000));
    assert!((s.current_time(ms(1000)) - 3.0).abs() < 1e-9);
    assert!((s.current_time(ms(2000)) - 4.0).abs() < 1e-9);
    s.poll(ms(3000));
    assert!(log.borrow().contains(&SessionEvent::ReachedEnd));
    assert!(log.borrow().contains(&SessionEvent::Seeked { secs: 3.0 }));
}

#[test]
fn paused_image_does_not_count() {
    let entry = PlaylistEntry::image("b.png", 5.0);
    let mut s = PlaybackSession::from_loaded(
        &entry,
        LoadedMedia::Image(VisualFrame::solid(2, 2, [1, 1, 1, 255])),
    )
    .unwrap();
    s.play(ms(0), LOCKED).unwrap();
    s.pause(ms(1000));
    s.poll(ms(60_000));
    assert!((s.current_time(ms(60_000)) - 1.0).abs() < 1e-9);
}

#[test]
fn video_frame_holds_last_valid_during_warmup() {
    let mut s = PlaybackSession::Video(VideoSession::new(Box::new(
        SyntheticVideo::new(2, 2, 4.0, [0, 0, 0, 255]).with_warmup(1),
    )));
    assert!(s.current_frame(ms(0)).unwrap().is_none());
    assert!(s.current_frame(ms(0)).unwrap().is_some());
}

#[test]
fn session_load_resolves_through_loader() {
    let loader = MemoryLoader::new()
        .with_video("a.mp4", SyntheticVideo::new(8, 6, 10.0, [0, 0, 0, 255]))
        .with_latency_polls(1);
    let entry = PlaylistEntry::video("a.mp4");
    let mut load = PlaybackSession::load(&entry, &loader);
    assert!(load.poll().is_pending());
    let Poll::Ready(Ok(session)) = load.poll() else {
        panic!("expected loaded session");
    };
    assert_eq!(session.kind(), MediaKind::Video);
    assert_eq!(session.duration(), 10.0);
    assert_eq!(session.natural_size(), (8, 6));
}

#[test]
fn session_load_wraps_kind_mismatch() {
    let loader =
        MemoryLoader::new().with_image("a.mp4", VisualFrame::solid(1, 1, [0, 0, 0, 255]));
    let entry = PlaylistEntry::video("a.mp4");
    let mut load = PlaybackSession::load(&entry, &loader);
    assert!(matches!(
        load.poll(),
        Poll::Ready(Err(PlayerError::ResourceLoad { .. }))
    ));
}

fn count_ended(log: &Rc<RefCell<Vec<SessionEvent>>>) -> usize {
    log.borrow()
        .iter()
        .filter(|e| **e == SessionEvent::ReachedEnd)
        .count()
}

#[test]
fn seeking_running_video_to_its_end_reports_end_once() {
    let mut s = video_session(10.0);
    let (log, _sub) = record(&s);
    s.play(ms(0), OPEN).unwrap();
    s.seek(10.0, ms(1000));
    assert_eq!(count_ended(&log), 0);
    s.poll(ms(1000));
    s.poll(ms(1100));
    assert_eq!(count_ended(&log), 1);
    assert!(!s.is_playing());
}

#[test]
fn seeking_running_image_past_its_end_reports_end_once() {
    let entry = PlaylistEntry::image("b.png", 5.0);
    let mut s = PlaybackSession::from_loaded(
        &entry,
        LoadedMedia::Image(VisualFrame::solid(2, 2, [1, 1, 1, 255])),
    )
    .unwrap();
    let (log, _sub) = record(&s);
    s.play(ms(0), LOCKED).unwrap();
    s.seek(99.0, ms(500));
    assert_eq!(s.current_time(ms(500)), 5.0);
    s.poll(ms(600));
    s.poll(ms(700));
    assert_eq!(count_ended(&log), 1);
}

#[test]
fn paused_seek_to_end_replays_from_start() {
    let mut s = video_session(2.0);
    let (log, _sub) = record(&s);
    s.seek(2.0, ms(0));
    s.poll(ms(100));
    assert_eq!(count_ended(&log), 0);
    s.play(ms(200), OPEN).unwrap();
    assert!((s.current_time(ms(700)) - 0.5).abs() < 1e-9);
}
