use super::*;
use crate::engine::resolve::{DiamondState, SelectionContext};
use crate::flight::camera::CameraState;
use crate::foundation::core::{Phase, PropertyKey};
use crate::store::elements::Element;

fn workspace() -> Workspace {
    let mut ws = Workspace {
        durations: PhaseDurations::new(4000.0, 5000.0, 1000.0),
        ..Workspace::default()
    };
    ws.elements
        .insert(Element::new("E1", "Title").with(PropertyKey::Opacity, 1.0));
    ws
}

#[test]
fn router_and_resolver_share_state() {
    let mut ws = workspace();
    let e1 = ElementId::from("E1");
    let ctx = SelectionContext::at(Phase::In, 1000.0);
    ws.router()
        .add_keyframe(&e1, &PropertyKey::Opacity, 0.5.into(), &ctx)
        .unwrap();
    let r = ws.resolver().resolve(&e1, &PropertyKey::Opacity, &ctx);
    assert_eq!(r.diamond, DiamondState::AtPlayhead);
}

#[test]
fn json_roundtrip_preserves_everything() {
    let mut ws = workspace();
    let e1 = ElementId::from("E1");
    ws.router()
        .add_keyframe(
            &e1,
            &PropertyKey::Opacity,
            0.5.into(),
            &SelectionContext::at(Phase::In, 0.0),
        )
        .unwrap();
    ws.flight_path_mut(&ElementId::from("map"))
        .append(CameraState::new(0.0, 0.0, 3.0), Phase::In)
        .unwrap();

    let mut buf = Vec::new();
    ws.to_writer(&mut buf).unwrap();
    let de = Workspace::from_reader(buf.as_slice()).unwrap();
    assert_eq!(de, ws);
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = Workspace::from_reader("{ not json".as_bytes()).unwrap_err();
    assert!(matches!(err, TimelineError::Serde(_)));
}

#[test]
fn missing_file_is_reported_with_path() {
    let err = Workspace::from_path("definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("definitely/not/here.json"));
}
