use super::*;

#[test]
fn uniforms_clamp_progress_and_carry_aspect() {
    let canvas = Canvas::new(200, 100).unwrap();
    let u = ZoomUniforms::new(1.7, 0.9, canvas);
    assert_eq!(u.progress, 1.0);
    assert_eq!(u.aspect, 2.0);
    assert_eq!(ZoomUniforms::new(f32::NAN, 0.9, canvas).progress, 0.0);
    assert_eq!(ZoomUniforms::new(-3.0, 0.9, canvas).progress, 0.0);
}

#[test]
fn zoom_scale_interpolates_from_one_to_target() {
    let canvas = Canvas::new(4, 4).unwrap();
    assert_eq!(ZoomUniforms::new(0.0, 0.9, canvas).from_uv_scale(), 1.0);
    assert!((ZoomUniforms::new(0.5, 0.9, canvas).from_uv_scale() - 0.95).abs() < 1e-6);
    assert!((ZoomUniforms::new(1.0, 0.9, canvas).from_uv_scale() - 0.9).abs() < 1e-6);
}

#[test]
fn mix_factor_is_smoothstepped() {
    let canvas = Canvas::new(4, 4).unwrap();
    assert_eq!(ZoomUniforms::new(0.0, 0.9, canvas).mix_factor(), 0.0);
    assert_eq!(ZoomUniforms::new(1.0, 0.9, canvas).mix_factor(), 1.0);
    assert!(ZoomUniforms::new(0.2, 0.9, canvas).mix_factor() < 0.2);
    assert!(ZoomUniforms::new(0.8, 0.9, canvas).mix_factor() > 0.8);
}

#[test]
fn uniform_bytes_are_little_endian_f32s() {
    let canvas = Canvas::new(2, 1).unwrap();
    let bytes = ZoomUniforms::new(0.5, 0.9, canvas).to_bytes();
    assert_eq!(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]), 0.5);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), 0.9);
    assert_eq!(f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]), 2.0);
}

#[test]
fn cpu_is_always_available() {
    let r = create_renderer(RendererKind::Cpu, &RenderSettings::default()).unwrap();
    assert_eq!(r.backend_name(), "cpu");
}

#[test]
fn invalid_zoom_fails_init() {
    let settings = RenderSettings {
        target_zoom: 0.0,
        ..RenderSettings::default()
    };
    assert!(matches!(
        create_renderer(RendererKind::Cpu, &settings),
        Err(PlayerError::RendererInit(_))
    ));
}

#[cfg(not(feature = "gpu"))]
#[test]
fn gpu_without_feature_is_an_init_error() {
    assert!(matches!(
        create_renderer(RendererKind::Gpu, &RenderSettings::default()),
        Err(PlayerError::RendererInit(_))
    ));
}
