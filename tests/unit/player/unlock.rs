use super::*;

#[test]
fn helper_ignores_mirroring_before_first_gesture() {
    let mut h = HelperVideoUnlock::default();
    h.mirror(true);
    assert!(!h.is_helper_playing());
    assert!(!h.has_unlocked());

    h.on_user_gesture();
    assert!(h.has_unlocked());
    assert!(h.is_helper_playing());
    h.mirror(false);
    assert!(!h.is_helper_playing());
    h.on_user_gesture();
    assert!(h.has_unlocked());
    assert!(!h.is_helper_playing());
}

#[test]
fn persistent_element_counts_swaps() {
    let mut p = PersistentElementUnlock::default();
    p.on_user_gesture();
    p.mirror(true);
    p.on_swap();
    p.on_swap();
    assert!(p.is_helper_playing());
    assert_eq!(p.reuses(), 2);
}

#[test]
fn factory_matches_strategy() {
    for s in [
        UnlockStrategy::HelperVideo,
        UnlockStrategy::PersistentElement,
        UnlockStrategy::Disabled,
    ] {
        assert_eq!(create_unlock(s).strategy(), s);
    }
    let mut noop = create_unlock(UnlockStrategy::Disabled);
    noop.on_user_gesture();
    noop.mirror(true);
    assert!(!noop.has_unlocked());
    assert!(!noop.is_helper_playing());
}
