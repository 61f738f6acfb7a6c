use std::time::{Duration, Instant};

use super::*;

fn block_on_load(load: &mut dyn PendingLoad) -> PlayerResult<LoadedMedia> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Poll::Ready(out) = load.poll_ready() {
            return out;
        }
        assert!(Instant::now() < deadline, "load never completed");
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn ready_load_yields_once() {
    let mut load = ReadyLoad::new(
        "a.png",
        Ok(LoadedMedia::Image(VisualFrame::solid(2, 2, [1, 2, 3, 255]))),
    );
    assert!(matches!(
        load.poll_ready(),
        Poll::Ready(Ok(LoadedMedia::Image(_)))
    ));
    assert!(matches!(
        load.poll_ready(),
        Poll::Ready(Err(PlayerError::ResourceLoad { .. }))
    ));
}

#[test]
fn threaded_load_reports_result_and_panics_as_errors() {
    let mut ok = ThreadedLoad::spawn("a.png", || {
        Ok(LoadedMedia::Image(VisualFrame::solid(1, 1, [0, 0, 0, 255])))
    });
    assert!(block_on_load(&mut ok).is_ok());

    let mut died = ThreadedLoad::spawn("b.png", || panic!("decoder crashed"));
    let err = block_on_load(&mut died).unwrap_err();
    assert!(err.to_string().contains("b.png"));
}

#[test]
fn kind_mismatch_is_a_load_error() {
    let entry = PlaylistEntry::video("a.mp4");
    let media = LoadedMedia::Image(VisualFrame::solid(1, 1, [0, 0, 0, 255]));
    let err = check_kind(&entry, &media).unwrap_err();
    assert!(err.to_string().contains("expected video"));
}

#[test]
fn zero_sized_image_is_rejected() {
    let entry = PlaylistEntry::image("a.png", 5.0);
    let media = LoadedMedia::Image(VisualFrame::solid(0, 0, [0, 0, 0, 0]));
    assert!(check_kind(&entry, &media).is_err());
}

#[test]
fn frame_keys_bucket_by_fps_and_clamp() {
    let info = VideoInfo {
        width: 4,
        height: 4,
        duration_secs: 2.0,
        fps: 10.0,
    };
    assert_eq!(info.frame_key(0.0), 0);
    assert_eq!(info.frame_key(0.15), 1);
    assert_eq!(info.frame_key(-1.0), 0);
    assert_eq!(info.frame_key(99.0), 20);
}
