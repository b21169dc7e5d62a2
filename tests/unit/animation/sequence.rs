use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn base_pose_holds_before_first_tween() {
    let mut tf = Transforms::new(Pose {
        alpha: 0.0,
        ..Pose::default()
    });
    tf.begin_at(100.0).fade_in(50.0);

    assert_eq!(tf.pose_at(0.0).alpha, 0.0);
    assert_eq!(tf.pose_at(99.9).alpha, 0.0);
    assert!(approx(tf.pose_at(125.0).alpha, 0.5));
    assert_eq!(tf.pose_at(150.0).alpha, 1.0);
    assert_eq!(tf.pose_at(10_000.0).alpha, 1.0);
}

#[test]
fn delayed_tween_starts_from_previous_value() {
    let mut tf = Transforms::new(Pose {
        alpha: 0.0,
        ..Pose::default()
    });
    tf.begin_at(0.0).fade_in(10.0).delay(100.0).fade_out(10.0);

    let tweens = tf.alpha_tweens();
    assert_eq!(tweens.len(), 2);
    assert_eq!(tweens[1].start, 100.0);
    assert_eq!(tweens[1].from, 1.0);
    assert_eq!(tf.pose_at(50.0).alpha, 1.0);
    assert!(approx(tf.pose_at(105.0).alpha, 0.5));
    assert_eq!(tf.pose_at(110.0).alpha, 0.0);
}

#[test]
fn move_and_scale_use_ease() {
    let mut tf = Transforms::new(Pose {
        position: Point::new(0.0, 0.0),
        scale: 2.0,
        ..Pose::default()
    });
    tf.begin_at(0.0)
        .move_to(Point::new(100.0, 0.0), 100.0, Ease::Out)
        .scale_to(1.0, 100.0, Ease::Out);

    let mid = tf.pose_at(50.0);
    assert!(approx(mid.position.x, 75.0));
    assert!(approx(mid.scale, 1.25));
    assert_eq!(tf.pose_at(100.0).position, Point::new(100.0, 0.0));
}

#[test]
fn expire_uses_latest_tween_end() {
    let mut tf = Transforms::default();
    assert_eq!(tf.lifetime_end(), f64::INFINITY);

    let end = tf
        .begin_at(10.0)
        .fade_in(5.0)
        .delay(20.0)
        .fade_out(7.0)
        .expire();
    assert_eq!(end, 37.0);
    assert_eq!(tf.lifetime_end(), 37.0);
}

#[test]
fn clear_drops_tweens_and_expiry() {
    let mut tf = Transforms::default();
    tf.begin_at(0.0).fade_out(10.0).expire();
    tf.clear();

    assert!(tf.alpha_tweens().is_empty());
    assert!(tf.latest_end_time().is_none());
    assert_eq!(tf.lifetime_end(), f64::INFINITY);
    assert_eq!(tf.pose_at(5.0).alpha, 1.0);
}
