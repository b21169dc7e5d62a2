use super::*;
use crate::connection::{point::PointPhase, timing::SPACING};
use crate::render::pool::PoolOpts;
use std::collections::BTreeMap;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn target(id: u64, start_time: f64, x: f64, y: f64) -> Target {
    Target::new(TargetId(id), start_time, Point::new(x, y))
}

fn targets(list: &[Target]) -> BTreeMap<TargetId, Target> {
    list.iter().map(|t| (t.id, *t)).collect()
}

fn point_pool() -> Pool<FollowPoint> {
    Pool::new(PoolOpts {
        prewarm: 4,
        soft_max: 64,
    })
}

fn linked(start: &Target, end: &Target) -> ConnectionEntry {
    let mut entry = ConnectionEntry::new(start.id, start.start_time);
    entry.set_end(Some(end.id));
    entry
}

#[test]
fn five_hundred_pixels_yield_fourteen_points() {
    let a = target(1, 0.0, 0.0, 0.0);
    let b = target(2, 1000.0, 500.0, 0.0);

    let plans = plan_points(&a, &b, SPACING, &TimingModel::default());
    assert_eq!(plans.len(), 14);

    for (i, plan) in plans.iter().enumerate() {
        let d = 48.0 + 32.0 * i as f64;
        assert_eq!(plan.fraction, d / 500.0);
        assert!(plan.fraction > 0.0 && plan.fraction < 1.0);
        assert!(approx(plan.to.x, d) && plan.to.y == 0.0);
        assert!(approx(plan.from.x, d - 50.0));
    }
    assert!(approx(plans.last().unwrap().to.x, 464.0));
}

#[test]
fn short_connections_have_no_points() {
    let a = target(1, 0.0, 0.0, 0.0);
    let timing = TimingModel::default();

    assert!(plan_points(&a, &target(2, 10.0, 79.0, 0.0), SPACING, &timing).is_empty());
    assert!(plan_points(&a, &target(2, 10.0, 80.0, 0.0), SPACING, &timing).is_empty());
    assert_eq!(
        plan_points(&a, &target(2, 10.0, 81.0, 0.0), SPACING, &timing).len(),
        1
    );
    assert!(plan_points(&a, &target(2, 10.0, 0.0, 0.0), SPACING, &timing).is_empty());
}

#[test]
fn oversized_spacing_and_segments_yield_no_points() {
    let timing = TimingModel::default();
    let a = target(1, 0.0, 0.0, 0.0);
    let far = target(2, 1000.0, 4_294_967_295.0, 0.0);

    assert!(plan_points(&a, &far, 1 << 30, &timing).is_empty());
    assert!(plan_points(&a, &far, SPACING, &timing).is_empty());
    assert_eq!(entry_lifetime(&a, Some(&far), SPACING, &timing), (0.0, 0.0));

    let near = target(3, 1000.0, 500.0, 0.0);
    assert!(plan_points(&a, &near, u32::MAX, &timing).is_empty());
    assert_eq!(entry_lifetime(&a, Some(&near), u32::MAX, &timing), (0.0, 0.0));

    // The longest allowed segment still gets points.
    let edge = target(4, 1000.0, f64::from(MAX_SEGMENT_LENGTH), 0.0);
    let plans = plan_points(&a, &edge, SPACING, &timing);
    assert_eq!(plans.len(), 2046);
    assert!(plans.iter().all(|p| p.fraction < 1.0));
}

#[test]
fn plans_carry_rotation_scale_and_timing() {
    let a = target(1, 1000.0, 0.0, 0.0);
    let b = Target {
        scale: 0.8,
        fade_in: 250.0,
        ..target(2, 2000.0, 0.0, 200.0)
    };

    let plans = plan_points(&a, &b, SPACING, &TimingModel::default());
    assert!(!plans.is_empty());
    for plan in &plans {
        assert!(approx(plan.rotation, 90.0));
        assert!(approx(plan.initial_scale, 1.2));
        assert_eq!(plan.scale, 0.8);
        assert_eq!(plan.fade_duration, 250.0);
        assert_eq!(plan.fade.fade_out, 1000.0 + plan.fraction * 1000.0);
        assert_eq!(plan.fade.fade_in, plan.fade.fade_out - 800.0);
    }
}

#[test]
fn entry_lifetime_starts_at_first_fade_in() {
    let a = target(1, 1000.0, 0.0, 0.0);
    let b = target(2, 1500.0, 480.0, 0.0);
    let timing = TimingModel::default();

    let (start, end) = entry_lifetime(&a, Some(&b), SPACING, &timing);
    assert_eq!(start, 1000.0 + 0.1 * 500.0 - 800.0);
    assert_eq!(end, f64::INFINITY);

    assert_eq!(entry_lifetime(&a, None, SPACING, &timing), (1000.0, 1000.0));
    let near = target(3, 1200.0, 10.0, 0.0);
    assert_eq!(
        entry_lifetime(&a, Some(&near), SPACING, &timing),
        (1000.0, 1000.0)
    );
}

#[test]
fn refresh_binds_points_and_pins_lifetime_end() {
    let a = target(1, 0.0, 0.0, 0.0);
    let b = target(2, 1000.0, 500.0, 0.0);
    let src = targets(&[a, b]);
    let mut pool = point_pool();
    let mut entry = linked(&a, &b);

    let mut conn = FollowPointConnection::default();
    let this = {
        let mut conns: Pool<FollowPointConnection> = Pool::new(PoolOpts {
            prewarm: 1,
            soft_max: 1,
        });
        conns.acquire()
    };
    conn.apply(this, &mut entry, &src, &mut pool, SPACING, &TimingModel::default());

    assert_eq!(conn.points().len(), 14);
    assert_eq!(entry.invalidation().subscribers(), &[this]);
    assert_eq!(pool.stats().live, 14);

    let last = pool.get(*conn.points().last().unwrap()).unwrap();
    assert_eq!(entry.lifetime_end(), last.lifetime_end());
    // fade_out of the last point (464 / 500 of the way) plus the fade-out duration.
    assert!(approx(entry.lifetime_end(), 464.0 / 500.0 * 1000.0 + 400.0));

    let first = pool.get(conn.points()[0]).unwrap();
    assert_eq!(first.phase_at(first.animation_start_time()), PointPhase::FadingIn);
    assert_eq!(first.pose_at(first.animation_start_time()).alpha, 0.0);
    let settled = first.pose_at(first.animation_start_time() + 400.0);
    assert!(approx(settled.position.x, 48.0));
    assert_eq!(settled.alpha, 1.0);

    conn.free(this, Some(&mut entry), &mut pool);
    assert!(conn.points().is_empty());
    assert!(conn.entry().is_none());
    assert!(entry.invalidation().subscribers().is_empty());
    assert_eq!(pool.stats().live, 0);
}

#[test]
fn refresh_twice_is_idempotent() {
    let a = target(1, 0.0, 0.0, 0.0);
    let b = target(2, 700.0, 300.0, 400.0);
    let src = targets(&[a, b]);
    let mut pool = point_pool();
    let mut entry = linked(&a, &b);
    let timing = TimingModel::default();

    let mut conns: Pool<FollowPointConnection> = Pool::new(PoolOpts {
        prewarm: 1,
        soft_max: 1,
    });
    let this = conns.acquire();
    let mut conn = FollowPointConnection::default();
    conn.apply(this, &mut entry, &src, &mut pool, SPACING, &timing);

    let snapshot = |conn: &FollowPointConnection, pool: &Pool<FollowPoint>| {
        conn.points()
            .iter()
            .map(|h| {
                let p = pool.get(*h).unwrap();
                (
                    p.animation_start_time(),
                    p.lifetime_end(),
                    p.pose_at(0.0),
                    p.pose_at(500.0),
                )
            })
            .collect::<Vec<_>>()
    };

    let first = snapshot(&conn, &pool);
    let first_end = entry.lifetime_end();
    conn.refresh(&mut entry, &src, &mut pool, SPACING, &timing);
    let second = snapshot(&conn, &pool);

    assert!(!first.is_empty());
    assert_eq!(first, second);
    assert_eq!(first_end, entry.lifetime_end());
    assert_eq!(pool.stats().live, first.len());
}

#[test]
fn refresh_without_end_releases_everything() {
    let a = target(1, 0.0, 0.0, 0.0);
    let b = target(2, 1000.0, 500.0, 0.0);
    let src = targets(&[a, b]);
    let mut pool = point_pool();
    let mut entry = linked(&a, &b);
    let timing = TimingModel::default();

    let mut conns: Pool<FollowPointConnection> = Pool::new(PoolOpts {
        prewarm: 1,
        soft_max: 1,
    });
    let this = conns.acquire();
    let mut conn = FollowPointConnection::default();
    conn.apply(this, &mut entry, &src, &mut pool, SPACING, &timing);
    assert_eq!(pool.stats().live, 14);

    entry.set_end(None);
    assert_eq!(conn.refresh(&mut entry, &src, &mut pool, SPACING, &timing), 0);
    assert_eq!(pool.stats().live, 0);
}

#[test]
fn expired_points_return_to_the_pool() {
    let a = target(1, 0.0, 0.0, 0.0);
    let b = target(2, 1000.0, 500.0, 0.0);
    let src = targets(&[a, b]);
    let mut pool = point_pool();
    let mut entry = linked(&a, &b);
    let timing = TimingModel::default();

    let mut conns: Pool<FollowPointConnection> = Pool::new(PoolOpts {
        prewarm: 1,
        soft_max: 1,
    });
    let this = conns.acquire();
    let mut conn = FollowPointConnection::default();
    conn.apply(this, &mut entry, &src, &mut pool, SPACING, &timing);

    // The first point fades out at 96ms and is gone 400ms later.
    assert_eq!(conn.expire_points(495.9, &mut pool), 0);
    assert_eq!(conn.expire_points(496.1, &mut pool), 1);
    assert_eq!(conn.points().len(), 13);
    assert_eq!(conn.expire_points(f64::MAX, &mut pool), 13);
    assert_eq!(pool.stats().live, 0);
}

#[test]
#[should_panic(expected = "not bound to this entry")]
fn refreshing_a_detached_connection_panics() {
    let a = target(1, 0.0, 0.0, 0.0);
    let b = target(2, 1000.0, 500.0, 0.0);
    let src = targets(&[a, b]);
    let mut pool = point_pool();
    let mut entry = linked(&a, &b);

    let mut conn = FollowPointConnection::default();
    conn.refresh(&mut entry, &src, &mut pool, SPACING, &TimingModel::default());
}
