use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = PlayerConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, PlayerConfig::default());
    assert_eq!(cfg.transition_duration(), Duration::from_millis(1000));
    assert_eq!(cfg.ducking.video, 0.15);
    assert_eq!(cfg.ducking.image, 0.6);
    assert_eq!((cfg.max_width, cfg.max_height), (1280, 720));
}

#[test]
fn parses_variants() {
    let cfg = PlayerConfig::from_json_str(
        r#"{
            "transition_ms": 600,
            "advance": {"mode": "early"},
            "volume_mode": "gain_node",
            "unlock": "persistent_element",
            "autoplay": "allowed",
            "renderer": "gpu",
            "ducking": {"video": 0.2, "ease": "linear"},
            "music": "bed.mp3"
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.advance, AdvanceTrigger::Early { lead_ms: 250 });
    assert_eq!(cfg.advance.lead_secs(), Some(0.25));
    assert_eq!(cfg.volume_mode, VolumeMode::GainNode);
    assert_eq!(cfg.unlock, UnlockStrategy::PersistentElement);
    assert_eq!(cfg.autoplay, AutoplayPolicy::Allowed);
    assert_eq!(cfg.renderer, RendererKind::Gpu);
    assert_eq!(cfg.ducking.video, 0.2);
    assert_eq!(cfg.ducking.image, 0.6);
    assert_eq!(cfg.ducking.ease, crate::animation::ease::Ease::Linear);
    assert_eq!(cfg.music.as_deref(), Some(Path::new("bed.mp3")));
}

#[test]
fn rejects_unknown_fields_and_bad_values() {
    assert!(matches!(
        PlayerConfig::from_json_str(r#"{"transiton_ms": 5}"#),
        Err(PlayerError::Serde(_))
    ));
    assert!(matches!(
        PlayerConfig::from_json_str(r#"{"transition_ms": 0}"#),
        Err(PlayerError::Validation(_))
    ));
    assert!(matches!(
        PlayerConfig::from_json_str(r#"{"ducking": {"image": -0.1}}"#),
        Err(PlayerError::Validation(_))
    ));
    assert!(matches!(
        PlayerConfig::from_json_str(r#"{"seek_step_secs": 0}"#),
        Err(PlayerError::Validation(_))
    ));
}

#[test]
fn render_settings_carry_zoom() {
    let cfg = PlayerConfig {
        target_zoom: 0.8,
        ..PlayerConfig::default()
    };
    assert_eq!(cfg.render_settings().target_zoom, 0.8);
}

#[test]
fn missing_file_is_wrapped_io_error() {
    let err = PlayerConfig::from_json_file(Path::new("/no/such/config.json")).unwrap_err();
    assert!(matches!(err, PlayerError::Other(_)));
}
