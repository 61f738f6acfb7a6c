use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

fn gradient(w: u32, h: u32) -> VisualFrame {
    let mut data = Vec::new();
    for y in 0..h {
        for x in 0..w {
            data.extend_from_slice(&[(x * 20) as u8, (y * 20) as u8, 0, 255]);
        }
    }
    VisualFrame::new(w, h, data).unwrap()
}

#[test]
fn idle_pass_through_reproduces_source() {
    let src = gradient(8, 6);
    let mut r = CpuZoomRenderer::new(RenderSettings::default());
    assert!(r.set_source(TextureSlot::From, &src));
    assert!(r.set_source(TextureSlot::To, &src));
    let out = r.render_frame(0.0, canvas(8, 6)).unwrap();
    assert_eq!(out.data, *src.rgba8_premul);
    assert!(out.premultiplied);
}

#[test]
fn endpoints_show_from_then_to() {
    let red = VisualFrame::solid(4, 4, [255, 0, 0, 255]);
    let blue = VisualFrame::solid(4, 4, [0, 0, 255, 255]);
    let mut r = CpuZoomRenderer::new(RenderSettings::default());
    r.set_source(TextureSlot::From, &red);
    r.set_source(TextureSlot::To, &blue);

    let start = r.render_frame(0.0, canvas(4, 4)).unwrap();
    assert_eq!(start.pixel(2, 2), Some([255, 0, 0, 255]));
    let end = r.render_frame(1.0, canvas(4, 4)).unwrap();
    assert_eq!(end.pixel(2, 2), Some([0, 0, 255, 255]));
    let mid = r.render_frame(0.5, canvas(4, 4)).unwrap();
    let [rr, _, bb, a] = mid.pixel(0, 0).unwrap();
    assert_eq!(a, 255);
    assert!(rr > 100 && bb > 100);
}

#[test]
fn outgoing_frame_zooms_toward_center() {
    let src = gradient(10, 10);
    let black = VisualFrame::solid(10, 10, [0, 0, 0, 255]);
    let settings = RenderSettings {
        target_zoom: 0.5,
        ..RenderSettings::default()
    };
    let mut r = CpuZoomRenderer::new(settings);
    r.set_source(TextureSlot::From, &src);
    r.set_source(TextureSlot::To, &black);

    // Just above zero the mix barely moves but the uv scale already pulls the corner inward.
    let out = r.render_frame(0.2, canvas(10, 10)).unwrap();
    let corner = out.pixel(0, 0).unwrap();
    let untouched = src.pixel(0, 0).unwrap();
    assert!(corner[0] > untouched[0]);
    assert!(corner[1] > untouched[1]);
}

#[test]
fn undecodable_upload_keeps_previous_frame() {
    let good = VisualFrame::solid(2, 2, [0, 255, 0, 255]);
    let pending = VisualFrame::solid(0, 0, [255, 255, 255, 255]);
    let mut r = CpuZoomRenderer::new(RenderSettings::default());
    assert!(r.set_source(TextureSlot::From, &good));
    assert!(!r.set_source(TextureSlot::From, &pending));
    let out = r.render_frame(0.0, canvas(2, 2)).unwrap();
    assert_eq!(out.pixel(1, 1), Some([0, 255, 0, 255]));
}

#[test]
fn no_sources_renders_clear_color() {
    let mut r = CpuZoomRenderer::new(RenderSettings {
        clear_rgba: [1, 2, 3, 255],
        ..RenderSettings::default()
    });
    assert!(!r.has_source(TextureSlot::From));
    let out = r.render_frame(0.3, canvas(3, 3)).unwrap();
    assert_eq!(out.pixel(2, 2), Some([1, 2, 3, 255]));
}
