//! # Instance Pools
//!
//! [`Pools`] is the registry: one [`Pool`] per prototype, created lazily,
//! plus a reverse handle map so release never searches. The host is passed
//! into every operation; the registry owns handles and counters, nothing
//! else.

use std::collections::VecDeque;

use ahash::AHashMap;

use respawn_core::{InstanceHandle, InstanceHost, PrototypeId};

use crate::config::DEFAULT_POOL_COUNT;
use crate::lease::Leases;
use crate::stats::PoolStats;

/// One prototype's pool: the instances it issued, split into the two
/// disjoint states.
///
/// Every live handle issued through the pool is in exactly one of
/// `in_use` and `free`. Handles the host destroyed out-of-band linger in
/// their list until the lazy purge (acquire for `free`, the sweep for
/// `in_use`) drops them.
#[derive(Debug, Default)]
pub struct Pool {
    /// Handed out and not yet returned. Front is the oldest, which is the
    /// end the sweep probes.
    in_use: VecDeque<InstanceHandle>,
    /// Returned and available. The back is the most recently freed, which
    /// is the end acquire pops (LIFO keeps warm instances hot).
    free: Vec<InstanceHandle>,
}

impl Pool {
    /// Number of handles currently tracked as in use.
    ///
    /// May overstate live instances until the sweep catches up with
    /// out-of-band destruction.
    #[inline]
    #[must_use]
    pub fn in_use_len(&self) -> usize {
        self.in_use.len()
    }

    /// Number of handles currently tracked as free.
    ///
    /// May overstate available instances until acquire drains stale
    /// entries.
    #[inline]
    #[must_use]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Iterates the in-use handles, oldest first.
    pub fn in_use_handles(&self) -> impl Iterator<Item = InstanceHandle> + '_ {
        self.in_use.iter().copied()
    }

    /// Iterates the free handles, most recently freed last.
    pub fn free_handles(&self) -> impl Iterator<Item = InstanceHandle> + '_ {
        self.free.iter().copied()
    }
}

/// Per-prototype instance pool registry.
///
/// Explicitly owned value - there is no ambient global registry. Thread it
/// by `&mut` wherever pooling happens; its lifecycle is the owning
/// session's lifecycle.
///
/// All operations degrade gracefully: an unknown prototype yields `None`,
/// a foreign or stale handle makes the operation a no-op. The registry is
/// a best-effort creation-cost cache, never a correctness gate.
///
/// # Example
///
/// ```rust,ignore
/// let mut pools = Pools::new();
/// pools.prepare(&mut stage, bullet, 32);
///
/// let shot = pools.acquire(&mut stage, bullet, Some(gun)).unwrap();
/// pools.release_after(shot, 120); // auto-release two seconds later
///
/// // once per frame:
/// pools.tick(&mut stage);
/// ```
#[derive(Debug)]
pub struct Pools {
    /// Per-prototype pools, created on first request.
    pools: AHashMap<PrototypeId, Pool>,
    /// Reverse map: issued handle to owning prototype, for O(1) release.
    owner_of: AHashMap<InstanceHandle, PrototypeId>,
    /// Prewarm size for pools created lazily on first acquire.
    default_count: usize,
    /// Neutral parent released instances are moved under (root if `None`).
    holder: Option<InstanceHandle>,
    /// Outstanding auto-release leases.
    leases: Leases,
    /// Scratch buffer reused by `tick`, so steady-state maintenance does
    /// not allocate.
    expired: Vec<InstanceHandle>,
    /// Pool creation order; the sweep rotates through it.
    sweep_order: Vec<PrototypeId>,
    /// Next pool the sweep probes.
    sweep_cursor: usize,
    /// Diagnostic counters.
    stats: PoolStats,
}

impl Default for Pools {
    fn default() -> Self {
        Self::new()
    }
}

impl Pools {
    /// Creates an empty registry with the stock default prewarm count.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_count(DEFAULT_POOL_COUNT)
    }

    /// Creates an empty registry with the given lazy prewarm count.
    #[must_use]
    pub fn with_default_count(default_count: usize) -> Self {
        Self {
            pools: AHashMap::new(),
            owner_of: AHashMap::new(),
            default_count,
            holder: None,
            leases: Leases::default(),
            expired: Vec::new(),
            sweep_order: Vec::new(),
            sweep_cursor: 0,
            stats: PoolStats::default(),
        }
    }

    /// Returns the lazy prewarm count.
    #[inline]
    #[must_use]
    pub const fn default_count(&self) -> usize {
        self.default_count
    }

    /// Sets the lazy prewarm count for pools not yet created.
    pub fn set_default_count(&mut self, default_count: usize) {
        self.default_count = default_count;
    }

    /// Returns the neutral holder released instances are parented under.
    #[inline]
    #[must_use]
    pub const fn holder(&self) -> Option<InstanceHandle> {
        self.holder
    }

    /// Sets the neutral holder (`None` detaches released instances to the
    /// root).
    pub fn set_holder(&mut self, holder: Option<InstanceHandle>) {
        self.holder = holder;
    }

    /// Ensures a pool exists for `prototype`, pre-creating `count`
    /// deactivated instances if the pool is new.
    ///
    /// Idempotent: repeat calls are no-ops regardless of `count`.
    /// `count == 0` builds an empty pool. An unregistered prototype is
    /// ignored with a diagnostic notice.
    pub fn prepare(&mut self, host: &mut impl InstanceHost, prototype: PrototypeId, count: usize) {
        if !host.has_prototype(prototype) {
            tracing::warn!(
                "prepare ignored: prototype {} is not registered with the host",
                prototype.index()
            );
            return;
        }
        if self.pools.contains_key(&prototype) {
            return;
        }
        self.create_pool(host, prototype, count);
    }

    /// Hands out an instance of `prototype`, parented under `parent`.
    ///
    /// Reuses the most recently freed instance if one is available,
    /// discarding stale handles encountered on the way; otherwise creates
    /// a fresh instance. The pool itself is created (and prewarmed with
    /// the default count) if this is the first request for `prototype`.
    ///
    /// # Returns
    ///
    /// The instance handle, or `None` if `prototype` is not registered
    /// with the host.
    pub fn acquire(
        &mut self,
        host: &mut impl InstanceHost,
        prototype: PrototypeId,
        parent: Option<InstanceHandle>,
    ) -> Option<InstanceHandle> {
        if !host.has_prototype(prototype) {
            tracing::debug!(
                "acquire refused: prototype {} is not registered with the host",
                prototype.index()
            );
            return None;
        }

        if !self.pools.contains_key(&prototype) {
            tracing::debug!(
                "pool for prototype {} created on first acquire",
                prototype.index()
            );
            self.create_pool(host, prototype, self.default_count);
        }

        let pool = self.pools.get_mut(&prototype)?;

        while let Some(handle) = pool.free.pop() {
            if !host.is_alive(handle) {
                // Destroyed out-of-band; drop it and keep looking.
                self.owner_of.remove(&handle);
                self.stats.record_stale_discard();
                continue;
            }

            pool.in_use.push_back(handle);
            let _ = host.set_active(handle, true);
            let _ = host.set_parent(handle, parent);
            self.stats.record_reuse();
            return Some(handle);
        }

        // Free list drained - create straight into in_use.
        let created = host.create(prototype, parent)?;
        pool.in_use.push_back(created);
        self.owner_of.insert(created, prototype);
        self.stats.record_creation();
        Some(created)
    }

    /// Returns an instance to its pool.
    ///
    /// No-op for the null handle and for handles the registry never
    /// issued. A handle that is already free is deactivated and
    /// re-parented again but not moved, so double release cannot corrupt
    /// the lists.
    pub fn release(&mut self, host: &mut impl InstanceHost, handle: InstanceHandle) {
        if handle.is_null() {
            return;
        }
        let Some(&prototype) = self.owner_of.get(&handle) else {
            return;
        };
        let Some(pool) = self.pools.get_mut(&prototype) else {
            return;
        };

        let _ = host.set_parent(handle, self.holder);
        let _ = host.set_active(handle, false);

        if let Some(pos) = pool.in_use.iter().position(|&h| h == handle) {
            let _ = pool.in_use.swap_remove_back(pos);
            pool.free.push(handle);
            self.leases.cancel(handle);
            self.stats.record_release();
        }
    }

    /// Releases every direct child of `parent` back to its owning pool.
    ///
    /// Children the registry never issued are skipped by the `release`
    /// no-op rule.
    pub fn release_children(&mut self, host: &mut impl InstanceHost, parent: InstanceHandle) {
        for child in host.children(parent) {
            self.release(host, child);
        }
    }

    /// Registers an auto-release lease: the instance returns to its pool
    /// after `ticks` maintenance ticks unless released or destroyed first.
    ///
    /// `ticks == 0` expires on the next tick. Re-registering replaces the
    /// prior lease. Handles the registry never issued are ignored.
    pub fn release_after(&mut self, handle: InstanceHandle, ticks: u32) {
        if handle.is_null() || !self.owner_of.contains_key(&handle) {
            return;
        }
        self.leases.set(handle, ticks);
    }

    /// One maintenance step; call once per host update.
    ///
    /// Expires due leases, then probes one pool's oldest in-use handle for
    /// out-of-band destruction (rotating through pools across ticks).
    pub fn tick(&mut self, host: &mut impl InstanceHost) {
        let mut expired = std::mem::take(&mut self.expired);
        self.leases.expire_into(&mut expired);
        for handle in expired.drain(..) {
            self.release(host, handle);
        }
        self.expired = expired;

        self.sweep_step(&*host);
    }

    /// Number of instances currently free for `prototype`.
    #[must_use]
    pub fn free_count(&self, prototype: PrototypeId) -> usize {
        self.pools.get(&prototype).map_or(0, Pool::free_len)
    }

    /// Number of instances currently in use for `prototype`.
    #[must_use]
    pub fn in_use_count(&self, prototype: PrototypeId) -> usize {
        self.pools.get(&prototype).map_or(0, Pool::in_use_len)
    }

    /// Checks whether a handle is tracked by the registry (in either
    /// state).
    #[must_use]
    pub fn is_pooled(&self, handle: InstanceHandle) -> bool {
        self.owner_of.contains_key(&handle)
    }

    /// Returns a prototype's pool, if one has been created.
    #[must_use]
    pub fn pool(&self, prototype: PrototypeId) -> Option<&Pool> {
        self.pools.get(&prototype)
    }

    /// Number of pools created so far.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Number of outstanding auto-release leases.
    #[must_use]
    pub fn lease_count(&self) -> usize {
        self.leases.len()
    }

    /// Returns a snapshot of the diagnostic counters.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        self.stats
    }

    /// Builds a pool with `count` deactivated free instances and registers
    /// it. The prototype must already be validated against the host.
    fn create_pool(&mut self, host: &mut impl InstanceHost, prototype: PrototypeId, count: usize) {
        let mut pool = Pool::default();
        for _ in 0..count {
            let Some(handle) = host.create(prototype, self.holder) else {
                break;
            };
            let _ = host.set_active(handle, false);
            self.owner_of.insert(handle, prototype);
            pool.free.push(handle);
            self.stats.record_prewarm();
        }
        self.sweep_order.push(prototype);
        self.pools.insert(prototype, pool);
    }

    /// One incremental sweep step: probe the front of the next pool's
    /// in-use queue, purge it if destroyed, rotate it to the back if not.
    fn sweep_step(&mut self, host: &impl InstanceHost) {
        if self.sweep_order.is_empty() {
            return;
        }
        self.sweep_cursor %= self.sweep_order.len();
        let prototype = self.sweep_order[self.sweep_cursor];
        self.sweep_cursor += 1;

        let Some(pool) = self.pools.get_mut(&prototype) else {
            return;
        };
        let Some(probe) = pool.in_use.pop_front() else {
            return;
        };

        if host.is_alive(probe) {
            pool.in_use.push_back(probe);
        } else {
            self.owner_of.remove(&probe);
            self.leases.cancel(probe);
            self.stats.record_sweep();
        }
    }
}
