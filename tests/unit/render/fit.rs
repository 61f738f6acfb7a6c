use super::*;

fn canvas(w: u32, h: u32) -> Canvas {
    Canvas::new(w, h).unwrap()
}

#[test]
fn downscales_preserving_aspect() {
    let c = surface_for((1920, 1080), canvas(4000, 4000), canvas(1280, 720));
    assert_eq!((c.width, c.height), (1280, 720));

    let c = surface_for((1000, 2000), canvas(800, 600), canvas(1280, 720));
    assert_eq!((c.width, c.height), (300, 600));
}

#[test]
fn never_upscales_past_native() {
    let c = surface_for((320, 240), canvas(1920, 1080), canvas(1280, 720));
    assert_eq!((c.width, c.height), (320, 240));
}

#[test]
fn degenerate_inputs_collapse_to_one_pixel() {
    let c = fit_within(Size::new(0.0, 10.0), Size::new(100.0, 100.0));
    assert_eq!((c.width, c.height), (1, 1));
}

#[test]
fn same_size_scale_is_identity() {
    let mut data = Vec::new();
    for i in 0..(3 * 2) {
        data.extend_from_slice(&[i as u8 * 10, 0, 0, 255]);
    }
    let frame = VisualFrame::new(3, 2, data.clone()).unwrap();
    let out = scale_frame(&frame, canvas(3, 2));
    assert_eq!(out.data, data);
}

#[test]
fn undecodable_frame_renders_black() {
    let frame = VisualFrame::solid(0, 0, [255, 255, 255, 255]);
    let out = scale_frame(&frame, canvas(2, 2));
    assert_eq!(out.pixel(1, 1), Some([0, 0, 0, 255]));
}
