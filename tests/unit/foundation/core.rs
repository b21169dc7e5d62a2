use super::*;

fn target(preempt: f64) -> Target {
    Target {
        preempt,
        ..Target::new(TargetId(1), 1000.0, Point::new(10.0, 20.0))
    }
}

#[test]
fn validate_accepts_defaults() {
    assert!(target(1200.0).validate().is_ok());
}

#[test]
fn validate_rejects_non_positive_preempt() {
    assert!(target(0.0).validate().is_err());
    assert!(target(-50.0).validate().is_err());
    assert!(target(f64::NAN).validate().is_err());
}

#[test]
fn validate_rejects_non_finite_time_and_position() {
    let t = Target {
        start_time: f64::INFINITY,
        ..target(1200.0)
    };
    assert!(t.validate().is_err());

    let t = Target {
        position: Point::new(f64::NAN, 0.0),
        ..target(1200.0)
    };
    assert!(t.validate().is_err());
}

#[test]
fn serde_fills_default_attributes() {
    let t: Target =
        serde_json::from_str(r#"{"id":7,"start_time":250.0,"position":{"x":1.0,"y":2.0}}"#)
            .unwrap();
    assert_eq!(t.id, TargetId(7));
    assert_eq!(t.scale, 1.0);
    assert_eq!(t.fade_in, 400.0);
    assert_eq!(t.preempt, 1200.0);
}

#[test]
fn sources_resolve_by_id() {
    let a = Target::new(TargetId(1), 0.0, Point::ZERO);
    let b = Target::new(TargetId(2), 10.0, Point::ZERO);

    let list = vec![a, b];
    assert_eq!(list.target(TargetId(2)).map(|t| t.start_time), Some(10.0));
    assert!(list.target(TargetId(3)).is_none());

    let map: BTreeMap<TargetId, Target> = list.iter().map(|t| (t.id, *t)).collect();
    assert_eq!(map.target(TargetId(1)).map(|t| t.start_time), Some(0.0));
}
