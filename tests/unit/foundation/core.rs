use super::*;

#[test]
fn phase_parses_case_insensitively() {
    assert_eq!("IN".parse::<Phase>().unwrap(), Phase::In);
    assert_eq!(" loop ".parse::<Phase>().unwrap(), Phase::Loop);
    assert!("outro".parse::<Phase>().is_err());
}

#[test]
fn phase_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Phase::Out).unwrap(), "\"out\"");
}

#[test]
fn require_rejects_missing_and_non_positive_durations() {
    let mut d = PhaseDurations::empty();
    assert!(matches!(
        d.require(Phase::In),
        Err(TimelineError::InvalidDuration(_))
    ));
    d.set(Phase::In, 0.0);
    assert!(d.require(Phase::In).is_err());
    d.set(Phase::In, -5.0);
    assert!(d.require(Phase::In).is_err());
    d.set(Phase::In, f64::NAN);
    assert!(d.require(Phase::In).is_err());
    d.set(Phase::In, 4000.0);
    assert_eq!(d.require(Phase::In).unwrap(), 4000.0);
}

#[test]
fn durations_json_uses_phase_names() {
    let d = PhaseDurations::new(1000.0, 2000.0, 3000.0);
    let s = serde_json::to_string(&d).unwrap();
    assert_eq!(s, r#"{"in":1000.0,"loop":2000.0,"out":3000.0}"#);
}

#[test]
fn property_key_accepts_builtins_and_namespaced_extensions() {
    assert_eq!(PropertyKey::parse("opacity").unwrap(), PropertyKey::Opacity);
    assert_eq!(
        PropertyKey::parse("backgroundColor").unwrap(),
        PropertyKey::BackgroundColor
    );
    assert_eq!(
        PropertyKey::parse("chart.progress").unwrap(),
        PropertyKey::Extension("chart.progress".to_owned())
    );
}

#[test]
fn property_key_rejects_unknown_keys() {
    for bad in ["opactiy", "", ".x", "chart.", "a.b c"] {
        assert!(
            matches!(
                PropertyKey::parse(bad),
                Err(TimelineError::UnknownProperty(_))
            ),
            "{bad:?} should be rejected"
        );
    }
}

#[test]
fn property_key_json_is_its_string_form() {
    let s = serde_json::to_string(&PropertyKey::FontSize).unwrap();
    assert_eq!(s, "\"fontSize\"");
    let k: PropertyKey = serde_json::from_str("\"scaleX\"").unwrap();
    assert_eq!(k, PropertyKey::ScaleX);
    assert!(serde_json::from_str::<PropertyKey>("\"nope\"").is_err());
}

#[test]
fn property_value_is_untagged() {
    let v: PropertyValue = serde_json::from_str("0.5").unwrap();
    assert_eq!(v, PropertyValue::Number(0.5));
    let v: PropertyValue = serde_json::from_str("\"#ff0000\"").unwrap();
    assert_eq!(v.as_text(), Some("#ff0000"));
}

#[test]
fn property_value_from_input_prefers_numbers() {
    assert_eq!(PropertyValue::from_input("12.5"), PropertyValue::Number(12.5));
    assert_eq!(
        PropertyValue::from_input("Breaking news"),
        PropertyValue::Text("Breaking news".to_owned())
    );
    assert!(PropertyValue::Number(f64::INFINITY).validate().is_err());
}
