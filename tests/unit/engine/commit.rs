use super::*;
use crate::engine::resolve::DiamondState;
use crate::foundation::core::Phase;
use crate::store::elements::{Element, MemoryElementStore};
use crate::store::keyframes::MemoryKeyframeStore;

fn stores() -> (MemoryKeyframeStore, MemoryElementStore, PhaseDurations) {
    let mut elements = MemoryElementStore::new();
    elements.insert(Element::new("E1", "Title").with(PropertyKey::Opacity, 1.0));
    elements.insert(Element::new("E2", "Bug").with(PropertyKey::Opacity, 1.0));
    (
        MemoryKeyframeStore::new(),
        elements,
        PhaseDurations::new(4000.0, 5000.0, 1000.0),
    )
}

fn e(id: &str) -> ElementId {
    ElementId::from(id)
}

#[test]
fn add_keyframe_creates_animation_lazily() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let out = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.5.into(),
            &SelectionContext::at(Phase::In, 1000.0),
        )
        .unwrap();
    assert!(!out.merged);

    let anim = kfs.animation(out.animation).unwrap();
    assert_eq!(anim.duration_ms, 4000.0);
    assert_eq!(anim.phase, Phase::In);
    assert_eq!(kfs.keyframe(out.keyframe).unwrap().position_ms, 1000.0);
}

#[test]
fn add_keyframe_rounds_and_clamps_the_playhead() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let a = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::X,
            1.0.into(),
            &SelectionContext::at(Phase::In, 1234.6),
        )
        .unwrap();
    let b = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Y,
            1.0.into(),
            &SelectionContext::at(Phase::In, 99_999.0),
        )
        .unwrap();
    assert_eq!(kfs.keyframe(a.keyframe).unwrap().position_ms, 1235.0);
    assert_eq!(kfs.keyframe(b.keyframe).unwrap().position_ms, 4000.0);
}

#[test]
fn add_keyframe_ignores_selection() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let first = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.0.into(),
            &SelectionContext::at(Phase::In, 0.0),
        )
        .unwrap();
    let ctx = SelectionContext::at(Phase::In, 2000.0).with_selected(first.keyframe);
    let second = router
        .add_keyframe(&e("E1"), &PropertyKey::Opacity, 1.0.into(), &ctx)
        .unwrap();
    assert_ne!(first.keyframe, second.keyframe);
}

#[test]
fn add_keyframe_with_unusable_duration_is_a_no_op() {
    let (mut kfs, mut els, mut d) = stores();
    d.set(Phase::Loop, 0.0);
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let err = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.0.into(),
            &SelectionContext::at(Phase::Loop, 0.0),
        )
        .unwrap_err();
    assert!(matches!(err, TimelineError::InvalidDuration(_)));
    assert!(kfs.animations().is_empty());
}

#[test]
fn add_keyframe_rejects_non_finite_playhead() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    assert!(
        router
            .add_keyframe(
                &e("E1"),
                &PropertyKey::Opacity,
                0.0.into(),
                &SelectionContext::at(Phase::In, f64::NAN),
            )
            .is_err()
    );
}

#[test]
fn add_keyframe_rejecting_value_leaves_no_animation() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let err = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::X,
            f64::NAN.into(),
            &SelectionContext::at(Phase::In, 10.0),
        )
        .unwrap_err();
    assert!(matches!(err, TimelineError::Validation(_)));
    assert!(kfs.find_animation(&e("E1"), Phase::In).is_none());
    assert_eq!(kfs.keyframe_count(), 0);
}

#[test]
fn add_keyframe_corrects_stale_duration_first() {
    let (mut kfs, mut els, mut d) = stores();
    CommitRouter::new(&mut kfs, &mut els, &d)
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.0.into(),
            &SelectionContext::at(Phase::In, 0.0),
        )
        .unwrap();

    d.set(Phase::In, 8000.0);
    let out = CommitRouter::new(&mut kfs, &mut els, &d)
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            1.0.into(),
            &SelectionContext::at(Phase::In, 6000.0),
        )
        .unwrap();
    assert_eq!(kfs.animation(out.animation).unwrap().duration_ms, 8000.0);
    assert_eq!(kfs.keyframe(out.keyframe).unwrap().position_ms, 6000.0);
}

#[test]
fn commit_without_selection_writes_base() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let target = router
        .commit(
            &e("E1"),
            &PropertyKey::Opacity,
            0.3.into(),
            &SelectionContext::at(Phase::In, 0.0),
        )
        .unwrap();
    assert_eq!(target, CommitTarget::Base);
    assert_eq!(
        els.get_property(&e("E1"), &PropertyKey::Opacity),
        Some(PropertyValue::Number(0.3))
    );
}

#[test]
fn commit_overwrites_selected_keyframe_that_animates_the_key() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let out = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.5.into(),
            &SelectionContext::at(Phase::In, 1000.0),
        )
        .unwrap();
    let ctx = SelectionContext::at(Phase::In, 0.0).with_selected(out.keyframe);
    let target = router
        .commit(&e("E1"), &PropertyKey::Opacity, 0.9.into(), &ctx)
        .unwrap();
    assert_eq!(target, CommitTarget::Keyframe(out.keyframe));
    assert_eq!(
        router.resolve(&e("E1"), &PropertyKey::Opacity, &ctx).display_value,
        Some(PropertyValue::Number(0.9))
    );
    assert_eq!(
        els.get_property(&e("E1"), &PropertyKey::Opacity),
        Some(PropertyValue::Number(1.0))
    );
}

#[test]
fn commit_does_not_extend_selected_keyframe() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let out = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::X,
            10.0.into(),
            &SelectionContext::at(Phase::In, 1000.0),
        )
        .unwrap();
    let ctx = SelectionContext::at(Phase::In, 1000.0).with_selected(out.keyframe);
    let target = router
        .commit(&e("E1"), &PropertyKey::Opacity, 0.1.into(), &ctx)
        .unwrap();
    assert_eq!(target, CommitTarget::Base);
    assert!(!kfs.keyframe(out.keyframe).unwrap().defines(&PropertyKey::Opacity));
}

#[test]
fn commit_with_foreign_selection_writes_own_base() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let a = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.5.into(),
            &SelectionContext::at(Phase::In, 0.0),
        )
        .unwrap();
    let ctx = SelectionContext::at(Phase::In, 0.0).with_selected(a.keyframe);
    let target = router
        .commit(&e("E2"), &PropertyKey::Opacity, 0.2.into(), &ctx)
        .unwrap();
    assert_eq!(target, CommitTarget::Base);
    assert_eq!(
        kfs.keyframe(a.keyframe).unwrap().value(&PropertyKey::Opacity),
        Some(&PropertyValue::Number(0.5))
    );
    assert_eq!(
        els.get_property(&e("E2"), &PropertyKey::Opacity),
        Some(PropertyValue::Number(0.2))
    );
}

#[test]
fn commit_sees_selection_changes_between_calls() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    let a = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.5.into(),
            &SelectionContext::at(Phase::In, 0.0),
        )
        .unwrap();
    let selected = SelectionContext::at(Phase::In, 0.0).with_selected(a.keyframe);
    assert_eq!(
        router
            .commit(&e("E1"), &PropertyKey::Opacity, 0.6.into(), &selected)
            .unwrap(),
        CommitTarget::Keyframe(a.keyframe)
    );

    // Keyframe deleted elsewhere while the slider is still being dragged.
    router
        .remove_keyframe_property(a.keyframe, &PropertyKey::Opacity)
        .unwrap();
    assert_eq!(
        router
            .commit(&e("E1"), &PropertyKey::Opacity, 0.7.into(), &selected)
            .unwrap(),
        CommitTarget::Base
    );
    assert_eq!(
        router.resolve(&e("E1"), &PropertyKey::Opacity, &selected).diamond,
        DiamondState::None
    );
}

#[test]
fn commit_rejects_non_finite_values() {
    let (mut kfs, mut els, d) = stores();
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d);
    assert!(
        router
            .commit(
                &e("E1"),
                &PropertyKey::Opacity,
                f64::INFINITY.into(),
                &SelectionContext::at(Phase::In, 0.0),
            )
            .is_err()
    );
}

#[test]
fn custom_merge_tolerance_is_honoured() {
    let (mut kfs, mut els, d) = stores();
    let opts = EngineOpts {
        write_merge_tolerance_ms: 50.0,
        ..EngineOpts::default()
    };
    let mut router = CommitRouter::new(&mut kfs, &mut els, &d).with_opts(opts);
    let a = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::Opacity,
            0.0.into(),
            &SelectionContext::at(Phase::In, 1000.0),
        )
        .unwrap();
    let b = router
        .add_keyframe(
            &e("E1"),
            &PropertyKey::X,
            0.0.into(),
            &SelectionContext::at(Phase::In, 1040.0),
        )
        .unwrap();
    assert_eq!(a.keyframe, b.keyframe);
}
