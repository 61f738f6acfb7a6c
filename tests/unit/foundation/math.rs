use super::*;

#[test]
fn mul_div255_variants_align() {
    for x in [0u16, 1, 127, 255] {
        for y in [0u16, 1, 127, 255] {
            assert_eq!(u16::from(mul_div255_u8(x, y)), mul_div255_u16(x, y));
        }
    }
}

#[test]
fn smoothstep_matches_shader_builtin() {
    assert_eq!(smoothstep(0.0, 1.0, -0.5), 0.0);
    assert_eq!(smoothstep(0.0, 1.0, 0.0), 0.0);
    assert!((smoothstep(0.0, 1.0, 0.5) - 0.5).abs() < 1e-6);
    assert_eq!(smoothstep(0.0, 1.0, 1.0), 1.0);
    assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
    assert!(smoothstep(0.0, 1.0, 0.25) < 0.25);
}

#[test]
fn unit_clamp_handles_nan_and_bounds() {
    assert_eq!(unit_clamp(f64::NAN), 0.0);
    assert_eq!(unit_clamp(-1.0), 0.0);
    assert_eq!(unit_clamp(3.0), 1.0);
    assert_eq!(lerp(1.0, 0.9, 0.5), 0.95);
}
