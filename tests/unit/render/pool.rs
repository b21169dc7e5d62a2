use super::*;

fn pool(prewarm: usize, soft_max: usize) -> Pool<Vec<u8>> {
    Pool::new(PoolOpts { prewarm, soft_max })
}

#[test]
fn prewarmed_slots_are_reused_before_growing() {
    let mut p = pool(2, 8);
    let a = p.acquire();
    let b = p.acquire();
    assert_eq!(p.stats().grown, 0);

    let c = p.acquire();
    assert_eq!(p.stats().grown, 1);
    assert_eq!(p.stats().live, 3);

    p.release(a);
    p.release(b);
    p.release(c);
    let st = p.stats();
    assert_eq!(st.live, 0);
    assert_eq!(st.free, 3);
    assert_eq!(st.peak_live, 3);
}

#[test]
fn released_handles_go_stale() {
    let mut p = pool(1, 8);
    let a = p.acquire();
    p.get_mut(a).unwrap().push(7);
    p.release(a);

    assert!(!p.is_live(a));
    assert!(p.get(a).is_none());

    // Same slot, new generation.
    let b = p.acquire();
    assert_ne!(a, b);
    assert!(p.get(a).is_none());
    assert!(p.is_live(b));
}

#[test]
fn release_does_not_reset_state() {
    let mut p = pool(1, 8);
    let a = p.acquire();
    p.get_mut(a).unwrap().push(1);
    p.release(a);

    let b = p.acquire();
    assert_eq!(p.get(b).unwrap().as_slice(), &[1]);
}

#[test]
fn growth_past_soft_max_still_succeeds() {
    let mut p = pool(0, 1);
    let handles: Vec<_> = (0..4).map(|_| p.acquire()).collect();
    assert!(handles.iter().all(|h| p.is_live(*h)));
    assert_eq!(p.stats().live, 4);
}

#[test]
#[should_panic(expected = "stale pool handle")]
fn double_release_panics() {
    let mut p = pool(1, 8);
    let a = p.acquire();
    p.release(a);
    p.release(a);
}
