//! End-to-end pooling flow through the session facade: config-driven
//! prewarm, reuse precedence, child release, leases, and an observable
//! counter fed from pool activity.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use respawn::{InstanceHost, PoolsConfig, Session, State};

const CONFIG: &str = r#"
default_count = 2

[[prewarm]]
prototype = "bullet"
count = 2
"#;

#[test]
fn pooled_combat_round() {
    let mut session = Session::new();
    let bullet = session.register_prototype("bullet");
    let gun = session.register_prototype("gun");

    let config = PoolsConfig::from_toml_str(CONFIG).unwrap();
    session.apply_config(&config).unwrap();

    // prepare(P, 2): two free, none in use, factory ran twice.
    assert_eq!(session.pools().free_count(bullet), 2);
    assert_eq!(session.pools().in_use_count(bullet), 0);
    assert_eq!(session.stage().created_count(), 2);

    let muzzle = session.stage_mut().create(gun, None).unwrap();

    // First shot comes from the prewarm.
    let shot = session.acquire(bullet, Some(muzzle)).unwrap();
    assert_eq!(session.pools().in_use_count(bullet), 1);
    assert_eq!(session.pools().free_count(bullet), 1);
    assert_eq!(session.stage().parent_of(shot), Some(muzzle));

    // Returning it restores the full free set.
    session.release(shot);
    assert_eq!(session.pools().in_use_count(bullet), 0);
    assert_eq!(session.pools().free_count(bullet), 2);

    // Reuse precedence: the freed instance comes back before any create.
    let again = session.acquire(bullet, Some(muzzle)).unwrap();
    assert_eq!(again, shot);

    // Drain the pool and push one past it: exactly one fresh creation.
    let second = session.acquire(bullet, Some(muzzle)).unwrap();
    let third = session.acquire(bullet, Some(muzzle)).unwrap();
    assert_eq!(session.pools().in_use_count(bullet), 3);
    assert_eq!(session.stage().created_count(), 4); // 2 bullets prewarmed + gun + 1 overflow
    assert_ne!(third, second);

    // Everything under the gun goes home in one call.
    session.release_children(muzzle);
    assert_eq!(session.pools().in_use_count(bullet), 0);
    assert_eq!(session.pools().free_count(bullet), 3);
    assert!(session.stage().children(muzzle).is_empty());
}

#[test]
fn leased_effects_expire_on_their_own() {
    let mut session = Session::new();
    let flash = session.register_prototype("muzzle_flash");
    session.prepare(flash, 1);

    let effect = session.acquire_for(flash, None, 3).unwrap();
    assert!(session.stage().is_active(effect));

    session.update();
    session.update();
    assert_eq!(session.pools().in_use_count(flash), 1);

    session.update();
    assert_eq!(session.pools().in_use_count(flash), 0);
    assert_eq!(session.pools().free_count(flash), 1);
    assert!(!session.stage().is_active(effect));
}

#[test]
fn observable_counter_follows_pool_activity() {
    let mut session = Session::new();
    let bullet = session.register_prototype("bullet");
    session.prepare(bullet, 4);

    // HUD-style observable fed from pool activity.
    let live_bullets: Arc<State<u32>> = Arc::new(State::new(0));
    let peak = Arc::new(AtomicU32::new(0));

    let peak_in_cb = Arc::clone(&peak);
    live_bullets.subscribe(move |count| {
        peak_in_cb.fetch_max(*count, Ordering::SeqCst);
    });

    let mut shots = Vec::new();
    for _ in 0..3 {
        shots.push(session.acquire(bullet, None).unwrap());
        live_bullets.set(u32::try_from(shots.len()).unwrap());
    }
    while let Some(shot) = shots.pop() {
        session.release(shot);
        live_bullets.set(u32::try_from(shots.len()).unwrap());
    }

    assert_eq!(peak.load(Ordering::SeqCst), 3);
    assert_eq!(live_bullets.get(), 0);
    assert_eq!(session.pools().free_count(bullet), 4);
}
