use super::*;

#[test]
fn latency_is_reported_as_pending_polls() {
    let loader = MemoryLoader::new()
        .with_image("a.png", VisualFrame::solid(2, 2, [9, 9, 9, 255]))
        .with_latency_polls(2);
    let mut load = loader.request(&PlaylistEntry::image("a.png", 5.0));
    assert!(load.poll_ready().is_pending());
    assert!(load.poll_ready().is_pending());
    assert!(matches!(
        load.poll_ready(),
        Poll::Ready(Ok(LoadedMedia::Image(_)))
    ));
}

#[test]
fn failures_and_missing_urls_are_load_errors() {
    let loader = MemoryLoader::new()
        .with_image("a.png", VisualFrame::solid(1, 1, [0, 0, 0, 255]))
        .with_failure("a.png");
    let mut failed = loader.request(&PlaylistEntry::image("a.png", 5.0));
    match failed.poll_ready() {
        Poll::Ready(Err(PlayerError::ResourceLoad { url, reason })) => {
            assert_eq!(url, "a.png");
            assert_eq!(reason, "network error");
        }
        other => panic!("unexpected {other:?}"),
    }

    let mut missing = loader.request(&PlaylistEntry::video("nope.mp4"));
    assert!(matches!(missing.poll_ready(), Poll::Ready(Err(_))));
}

#[test]
fn synthetic_video_warms_up_then_tracks_time() {
    let mut video = SyntheticVideo::new(2, 2, 10.0, [200, 0, 50, 255]).with_warmup(1);
    assert!(video.frame_at(0.0).unwrap().is_none());
    let start = video.frame_at(0.0).unwrap().unwrap();
    let end = video.frame_at(10.0).unwrap().unwrap();
    assert_eq!(start.pixel(0, 0), Some([200, 0, 50, 255]));
    assert_eq!(end.pixel(1, 1), Some([200, 255, 50, 255]));
}
