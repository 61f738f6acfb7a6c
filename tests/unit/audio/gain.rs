use super::*;

#[test]
fn element_volume_scales_uniformly() {
    let mut v = ElementVolume::new(0.5);
    let mut buf = [1.0f32, -1.0, 0.5, 0.25];
    v.process(&mut buf, 2);
    assert_eq!(buf, [0.5, -0.5, 0.25, 0.125]);
}

#[test]
fn volume_is_clamped() {
    let mut v = ElementVolume::new(2.0);
    assert_eq!(v.volume(), 1.0);
    v.set_volume(-0.3);
    assert_eq!(v.volume(), 0.0);
    v.set_volume(f32::NAN);
    assert_eq!(v.volume(), 0.0);
}

#[test]
fn gain_node_ramps_across_block_then_holds() {
    let mut g = GainNode::new(0.0);
    g.set_volume(1.0);
    let mut buf = [1.0f32; 8];
    g.process(&mut buf, 2);
    assert_eq!(buf[0], buf[1]);
    assert!(buf[0] > 0.0 && buf[0] < 1.0);
    assert!((buf[6] - 1.0).abs() < 1e-6);
    assert_eq!(g.applied_gain(), 1.0);

    let mut next = [1.0f32; 4];
    g.process(&mut next, 2);
    assert!(next.iter().all(|s| (*s - 1.0).abs() < 1e-6));
}

#[test]
fn factory_selects_mechanism() {
    assert_eq!(
        create_volume_control(VolumeMode::Element, 0.3).mode(),
        VolumeMode::Element
    );
    let g = create_volume_control(VolumeMode::GainNode, 0.3);
    assert_eq!(g.mode(), VolumeMode::GainNode);
    assert!((g.volume() - 0.3).abs() < 1e-6);
}
