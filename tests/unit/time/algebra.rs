use super::*;
use crate::foundation::error::TimelineError;

#[test]
fn percent_rounds_to_one_decimal() {
    assert_eq!(ms_to_percent(1000.0, 4000.0).unwrap(), 25.0);
    assert_eq!(ms_to_percent(1003.0, 4000.0).unwrap(), 25.1);
    assert_eq!(ms_to_percent(1.0, 3.0).unwrap(), 33.3);
}

#[test]
fn percent_rejects_unusable_duration() {
    for d in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            ms_to_percent(10.0, d),
            Err(TimelineError::InvalidDuration(_))
        ));
    }
    assert!(percent_to_ms(50.0, 0.0).is_err());
    assert_eq!(percent_to_ms(50.0, 4000.0).unwrap(), 2000.0);
}

#[test]
fn parse_time_input_grammars() {
    assert_eq!(parse_time_input("2.5s", 10000.0), Some(2500.0));
    assert_eq!(parse_time_input("500ms", 10000.0), Some(500.0));
    assert_eq!(parse_time_input("50%", 10000.0), Some(5000.0));
    assert_eq!(parse_time_input("1.5", 10000.0), Some(1500.0));
    assert_eq!(parse_time_input(" 250 MS ", 10000.0), Some(250.0));
}

#[test]
fn parse_time_input_rejects_garbage() {
    for bad in ["garbage", "", "ms", "%", "1.2.3s", "nan", "inf", "12px"] {
        assert_eq!(parse_time_input(bad, 10000.0), None, "{bad:?}");
    }
}

#[test]
fn parse_time_input_clamps_to_phase() {
    assert_eq!(parse_time_input("15000ms", 1000.0), Some(1000.0));
    assert_eq!(parse_time_input("-2s", 1000.0), Some(0.0));
    assert_eq!(parse_time_input("150%", 1000.0), Some(1000.0));
}

#[test]
fn parse_time_input_needs_a_duration() {
    assert_eq!(parse_time_input("1s", 0.0), None);
}

#[test]
fn format_ms_uses_two_decimal_seconds() {
    assert_eq!(format_ms(1500.0), "1.50s");
    assert_eq!(format_ms(0.0), "0.00s");
    assert_eq!(format_ms(12346.0), "12.35s");
}
