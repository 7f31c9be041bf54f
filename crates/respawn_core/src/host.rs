//! # Instance Host
//!
//! The seam between the pooling layer and whatever actually owns instances.
//! A host supplies four primitives: create, destroy, activation toggling,
//! and re-parenting. Everything else the pool does is bookkeeping over
//! handles.

use crate::handle::{InstanceHandle, PrototypeId};

/// Environment that owns instances and their scene relationships.
///
/// All operations are synchronous and infallible in the panic sense:
/// a stale or foreign handle makes the operation a no-op (reported through
/// the return value), never an error. This mirrors the degrade-gracefully
/// contract of the pooling layer built on top.
pub trait InstanceHost {
    /// Creates a new instance of `prototype` under `parent` (root if `None`
    /// or if `parent` is stale).
    ///
    /// Newly created instances start active.
    ///
    /// # Returns
    ///
    /// The handle of the new instance, or `None` if `prototype` is not
    /// registered with this host.
    fn create(&mut self, prototype: PrototypeId, parent: Option<InstanceHandle>)
        -> Option<InstanceHandle>;

    /// Destroys an instance and all of its descendants.
    ///
    /// # Returns
    ///
    /// `true` if the instance was alive and is now destroyed.
    fn destroy(&mut self, handle: InstanceHandle) -> bool;

    /// Toggles an instance's active flag.
    ///
    /// # Returns
    ///
    /// `true` if the instance was alive and the flag was applied.
    fn set_active(&mut self, handle: InstanceHandle, active: bool) -> bool;

    /// Re-parents an instance (`None` detaches it to the root).
    ///
    /// # Returns
    ///
    /// `true` if the instance was alive and the move was applied. Moving an
    /// instance under a stale parent, or under one of its own descendants,
    /// is refused.
    fn set_parent(&mut self, handle: InstanceHandle, parent: Option<InstanceHandle>) -> bool;

    /// Checks whether a handle still refers to a live instance.
    fn is_alive(&self, handle: InstanceHandle) -> bool;

    /// Checks whether a prototype id is registered with this host.
    fn has_prototype(&self, prototype: PrototypeId) -> bool;

    /// Returns a snapshot of the direct children of `parent`.
    ///
    /// The snapshot is safe to iterate while mutating the host (children
    /// destroyed or re-parented after the call are simply stale entries).
    fn children(&self, parent: InstanceHandle) -> Vec<InstanceHandle>;
}
