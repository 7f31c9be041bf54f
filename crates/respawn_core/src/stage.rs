//! # Stage
//!
//! The in-memory reference host. Owns every instance in growable slot
//! storage, recycles slots through a free list, and bumps a generation
//! counter on reuse so stale handles are detected without any
//! "is destroyed" escape hatch.

use ahash::AHashMap;

use crate::handle::{InstanceHandle, PrototypeId};
use crate::host::InstanceHost;

/// One instance slot. Dead slots keep their generation until reuse.
#[derive(Debug)]
struct Slot {
    generation: u32,
    alive: bool,
    active: bool,
    prototype: PrototypeId,
    parent: InstanceHandle,
    children: Vec<InstanceHandle>,
}

impl Slot {
    fn fresh() -> Self {
        Self {
            generation: 0,
            alive: false,
            active: false,
            prototype: PrototypeId::new(0),
            parent: InstanceHandle::NULL,
            children: Vec::new(),
        }
    }
}

/// In-memory instance host.
///
/// Storage grows on demand and never shrinks; destroyed slots are recycled
/// through a free list with a generation bump, the same scheme the pooling
/// layer relies on for cheap staleness checks.
///
/// # Thread Safety
///
/// The stage is NOT thread-safe. It is `&mut`-driven from the host's update
/// loop, like everything built on top of it.
///
/// # Example
///
/// ```rust,ignore
/// let mut stage = Stage::new();
/// let spark = stage.register_prototype("spark");
///
/// let a = stage.create(spark, None).unwrap();
/// let b = stage.create(spark, Some(a)).unwrap();
///
/// stage.destroy(a); // b dies with its parent
/// assert!(!stage.is_alive(b));
/// ```
#[derive(Debug, Default)]
pub struct Stage {
    /// All instance slots; index is the lower half of a handle.
    slots: Vec<Slot>,
    /// Indices of dead slots available for reuse.
    free_indices: Vec<u32>,
    /// Number of currently live instances.
    live_count: usize,
    /// Total instances ever created (the factory-invocation count).
    created_total: u64,
    /// Registered prototype names, indexed by `PrototypeId`.
    prototype_names: Vec<String>,
    /// Reverse lookup: name to id.
    prototype_ids: AHashMap<String, PrototypeId>,
}

impl Stage {
    /// Creates an empty stage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty stage with slot storage reserved for `capacity`
    /// instances.
    ///
    /// Purely an allocation hint; the stage still grows past it on demand.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_indices: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// Registers a prototype by name, returning its id.
    ///
    /// Registration is idempotent: a name that is already registered
    /// returns the existing id.
    ///
    /// # Panics
    ///
    /// Panics if the registry exceeds `u32::MAX` prototypes.
    pub fn register_prototype(&mut self, name: &str) -> PrototypeId {
        if let Some(&id) = self.prototype_ids.get(name) {
            return id;
        }

        assert!(
            self.prototype_names.len() < u32::MAX as usize,
            "prototype registry full"
        );

        #[allow(clippy::cast_possible_truncation)]
        let id = PrototypeId::new(self.prototype_names.len() as u32);
        self.prototype_names.push(name.to_owned());
        self.prototype_ids.insert(name.to_owned(), id);
        id
    }

    /// Looks up a prototype id by name.
    #[must_use]
    pub fn prototype_id(&self, name: &str) -> Option<PrototypeId> {
        self.prototype_ids.get(name).copied()
    }

    /// Returns the name a prototype was registered under.
    #[must_use]
    pub fn prototype_name(&self, prototype: PrototypeId) -> Option<&str> {
        self.prototype_names
            .get(prototype.index() as usize)
            .map(String::as_str)
    }

    /// Returns the number of registered prototypes.
    #[inline]
    #[must_use]
    pub fn prototype_count(&self) -> usize {
        self.prototype_names.len()
    }

    /// Returns the number of currently live instances.
    #[inline]
    #[must_use]
    pub const fn live_count(&self) -> usize {
        self.live_count
    }

    /// Returns the total number of instances ever created.
    ///
    /// This is the factory-invocation count the pooling layer exists to
    /// keep low.
    #[inline]
    #[must_use]
    pub const fn created_count(&self) -> u64 {
        self.created_total
    }

    /// Checks whether a live instance is currently active.
    ///
    /// Dead or stale handles report inactive.
    #[must_use]
    pub fn is_active(&self, handle: InstanceHandle) -> bool {
        self.live_slot(handle).is_some_and(|slot| slot.active)
    }

    /// Returns the parent of a live instance (`None` for root instances and
    /// for dead or stale handles).
    #[must_use]
    pub fn parent_of(&self, handle: InstanceHandle) -> Option<InstanceHandle> {
        let slot = self.live_slot(handle)?;
        if slot.parent.is_null() {
            None
        } else {
            Some(slot.parent)
        }
    }

    /// Returns the prototype a live instance was created from.
    #[must_use]
    pub fn prototype_of(&self, handle: InstanceHandle) -> Option<PrototypeId> {
        self.live_slot(handle).map(|slot| slot.prototype)
    }

    fn live_slot(&self, handle: InstanceHandle) -> Option<&Slot> {
        if handle.is_null() {
            return None;
        }
        let slot = self.slots.get(handle.index() as usize)?;
        (slot.alive && slot.generation == handle.generation()).then_some(slot)
    }

    /// Detaches `handle` from its parent's child list, if it has one.
    fn unlink_from_parent(&mut self, handle: InstanceHandle) {
        let idx = handle.index() as usize;
        let parent = self.slots[idx].parent;
        if parent.is_null() {
            return;
        }
        let siblings = &mut self.slots[parent.index() as usize].children;
        if let Some(pos) = siblings.iter().position(|&h| h == handle) {
            siblings.swap_remove(pos);
        }
    }

    /// Checks whether `candidate` is `handle` or one of its descendants.
    ///
    /// Walks parent links upward from `candidate`; live slots always have
    /// live parents, so the walk terminates at the root.
    fn is_in_subtree_of(&self, candidate: InstanceHandle, handle: InstanceHandle) -> bool {
        let mut current = candidate;
        while !current.is_null() {
            if current == handle {
                return true;
            }
            current = self.slots[current.index() as usize].parent;
        }
        false
    }
}

impl InstanceHost for Stage {
    fn create(
        &mut self,
        prototype: PrototypeId,
        parent: Option<InstanceHandle>,
    ) -> Option<InstanceHandle> {
        if !self.has_prototype(prototype) {
            return None;
        }

        // A stale parent degrades to the root rather than failing the create.
        let parent_handle = match parent {
            Some(p) if self.is_alive(p) => p,
            _ => InstanceHandle::NULL,
        };

        let index = if let Some(index) = self.free_indices.pop() {
            // Increment generation to invalidate old references
            let slot = &mut self.slots[index as usize];
            slot.generation = slot.generation.wrapping_add(1);
            index
        } else {
            let index = u32::try_from(self.slots.len()).ok()?;
            self.slots.push(Slot::fresh());
            index
        };

        let slot = &mut self.slots[index as usize];
        let handle = InstanceHandle::new(index, slot.generation);
        slot.alive = true;
        slot.active = true;
        slot.prototype = prototype;
        slot.parent = parent_handle;
        slot.children.clear();

        if !parent_handle.is_null() {
            self.slots[parent_handle.index() as usize]
                .children
                .push(handle);
        }

        self.live_count += 1;
        self.created_total += 1;
        Some(handle)
    }

    fn destroy(&mut self, handle: InstanceHandle) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        self.unlink_from_parent(handle);

        // Iterative subtree teardown; children die with their parent.
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let idx = current.index() as usize;
            let slot = &mut self.slots[idx];
            if !slot.alive || slot.generation != current.generation() {
                continue;
            }

            stack.append(&mut slot.children);
            slot.alive = false;
            slot.active = false;
            slot.parent = InstanceHandle::NULL;

            self.free_indices.push(current.index());
            self.live_count -= 1;
        }

        true
    }

    fn set_active(&mut self, handle: InstanceHandle, active: bool) -> bool {
        if !self.is_alive(handle) {
            return false;
        }
        self.slots[handle.index() as usize].active = active;
        true
    }

    fn set_parent(&mut self, handle: InstanceHandle, parent: Option<InstanceHandle>) -> bool {
        if !self.is_alive(handle) {
            return false;
        }

        let new_parent = match parent {
            Some(p) => {
                if !self.is_alive(p) || self.is_in_subtree_of(p, handle) {
                    return false;
                }
                p
            }
            None => InstanceHandle::NULL,
        };

        self.unlink_from_parent(handle);
        self.slots[handle.index() as usize].parent = new_parent;
        if !new_parent.is_null() {
            self.slots[new_parent.index() as usize].children.push(handle);
        }
        true
    }

    fn is_alive(&self, handle: InstanceHandle) -> bool {
        self.live_slot(handle).is_some()
    }

    fn has_prototype(&self, prototype: PrototypeId) -> bool {
        (prototype.index() as usize) < self.prototype_names.len()
    }

    fn children(&self, parent: InstanceHandle) -> Vec<InstanceHandle> {
        self.live_slot(parent)
            .map(|slot| slot.children.clone())
            .unwrap_or_default()
    }
}
