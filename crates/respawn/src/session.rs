//! # Session
//!
//! One owner for the stage and the pool registry. Everything that used to
//! be ambient global state lives here as a plain value: drop the session,
//! drop the lot.

use respawn_core::{InstanceHandle, PrototypeId, Stage};
use respawn_pool::{PoolError, PoolResult, Pools, PoolsConfig};

/// Owns a [`Stage`] and a [`Pools`] and keeps them in step.
///
/// The session is the application-lifetime object: create it at startup,
/// call [`update`](Self::update) once per frame, and let it drop with the
/// application. The facade methods thread the stage through the registry
/// so call sites never juggle the two borrows themselves.
pub struct Session {
    stage: Stage,
    pools: Pools,
    frame: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stage: Stage::new(),
            pools: Pools::new(),
            frame: 0,
        }
    }

    /// Registers a prototype with the stage (idempotent by name).
    pub fn register_prototype(&mut self, name: &str) -> PrototypeId {
        self.stage.register_prototype(name)
    }

    /// Applies a pool configuration: sets the lazy prewarm count and
    /// builds every listed pool ahead of time.
    ///
    /// Prototype names are resolved against the stage registry before
    /// anything is built, so a failed application changes nothing.
    ///
    /// # Errors
    ///
    /// [`PoolError::InvalidConfig`] if the configuration fails validation,
    /// [`PoolError::UnknownPrototype`] if a prewarm entry names a
    /// prototype that was never registered.
    pub fn apply_config(&mut self, config: &PoolsConfig) -> PoolResult<()> {
        config.validate()?;

        let mut resolved = Vec::with_capacity(config.prewarm.len());
        for entry in &config.prewarm {
            let Some(prototype) = self.stage.prototype_id(&entry.prototype) else {
                return Err(PoolError::UnknownPrototype {
                    name: entry.prototype.clone(),
                });
            };
            resolved.push((prototype, entry.count));
        }

        self.pools.set_default_count(config.default_count);
        for (prototype, count) in resolved {
            self.pools.prepare(&mut self.stage, prototype, count);
        }

        tracing::info!(
            "pool configuration applied: {} prewarmed pools, default count {}",
            config.prewarm.len(),
            config.default_count
        );
        Ok(())
    }

    /// Ensures a pool exists for `prototype` with `count` prewarmed
    /// instances. See [`Pools::prepare`].
    pub fn prepare(&mut self, prototype: PrototypeId, count: usize) {
        self.pools.prepare(&mut self.stage, prototype, count);
    }

    /// Hands out an instance of `prototype`. See [`Pools::acquire`].
    pub fn acquire(
        &mut self,
        prototype: PrototypeId,
        parent: Option<InstanceHandle>,
    ) -> Option<InstanceHandle> {
        self.pools.acquire(&mut self.stage, prototype, parent)
    }

    /// Acquires with an auto-release lease already attached: the instance
    /// returns to its pool after `ticks` frames unless released first.
    pub fn acquire_for(
        &mut self,
        prototype: PrototypeId,
        parent: Option<InstanceHandle>,
        ticks: u32,
    ) -> Option<InstanceHandle> {
        let handle = self.pools.acquire(&mut self.stage, prototype, parent)?;
        self.pools.release_after(handle, ticks);
        Some(handle)
    }

    /// Returns an instance to its pool. See [`Pools::release`].
    pub fn release(&mut self, handle: InstanceHandle) {
        self.pools.release(&mut self.stage, handle);
    }

    /// Releases every direct child of `parent`. See
    /// [`Pools::release_children`].
    pub fn release_children(&mut self, parent: InstanceHandle) {
        self.pools.release_children(&mut self.stage, parent);
    }

    /// Registers an auto-release lease on an already-acquired instance.
    /// See [`Pools::release_after`].
    pub fn release_after(&mut self, handle: InstanceHandle, ticks: u32) {
        self.pools.release_after(handle, ticks);
    }

    /// Advances one frame: expires leases and runs the incremental sweep.
    pub fn update(&mut self) {
        self.frame += 1;
        self.pools.tick(&mut self.stage);
    }

    /// Number of completed [`update`](Self::update) calls.
    #[inline]
    #[must_use]
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// The stage, for direct host work.
    #[inline]
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// The stage, mutably.
    #[inline]
    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// The pool registry (read-only; mutation goes through the facade so
    /// the stage stays threaded through).
    #[inline]
    #[must_use]
    pub fn pools(&self) -> &Pools {
        &self.pools
    }

    /// Sets the neutral holder released instances are parented under.
    pub fn set_holder(&mut self, holder: Option<InstanceHandle>) {
        self.pools.set_holder(holder);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_config_builds_listed_pools() {
        let mut session = Session::new();
        let bullet = session.register_prototype("bullet");
        session.register_prototype("spark");

        let config = PoolsConfig::from_toml_str(
            r#"
            default_count = 2

            [[prewarm]]
            prototype = "bullet"
            count = 3
            "#,
        )
        .unwrap();

        session.apply_config(&config).unwrap();

        assert_eq!(session.pools().free_count(bullet), 3);
        assert_eq!(session.pools().default_count(), 2);
        assert_eq!(session.stage().created_count(), 3);
    }

    #[test]
    fn test_apply_config_unknown_prototype_changes_nothing() {
        let mut session = Session::new();
        session.register_prototype("bullet");

        let config = PoolsConfig::from_toml_str(
            r#"
            default_count = 7

            [[prewarm]]
            prototype = "bullet"
            count = 3

            [[prewarm]]
            prototype = "never_registered"
            count = 1
            "#,
        )
        .unwrap();

        let err = session.apply_config(&config).unwrap_err();
        assert_eq!(
            err,
            PoolError::UnknownPrototype {
                name: "never_registered".into()
            }
        );

        // Failed application is all-or-nothing.
        assert_eq!(session.pools().pool_count(), 0);
        assert_eq!(session.stage().created_count(), 0);
        assert_ne!(session.pools().default_count(), 7);
    }

    #[test]
    fn test_update_drives_leases() {
        let mut session = Session::new();
        let proto = session.register_prototype("decal");
        session.prepare(proto, 1);

        let handle = session.acquire_for(proto, None, 2).unwrap();
        assert_eq!(session.pools().in_use_count(proto), 1);

        session.update();
        assert_eq!(session.pools().in_use_count(proto), 1);

        session.update();
        assert_eq!(session.pools().in_use_count(proto), 0);
        assert_eq!(session.pools().free_count(proto), 1);
        assert!(!session.stage().is_active(handle));
        assert_eq!(session.frame(), 2);
    }
}
