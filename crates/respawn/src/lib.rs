//! # RESPAWN
//!
//! Game-runtime support utilities: instance pooling over a host seam,
//! observable state, and the [`Session`] that ties them to one owner.
//!
//! ## Modules
//!
//! - `session`: the owning object - stage + pools + per-frame maintenance
//! - re-exported member crates: [`core`], [`pool`], [`events`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use respawn::Session;
//!
//! let mut session = Session::new();
//! let bullet = session.register_prototype("bullet");
//! session.prepare(bullet, 32);
//!
//! let shot = session.acquire(bullet, None).unwrap();
//! session.release_after(shot, 120);
//!
//! // once per frame:
//! session.update();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod session;

// Re-export the member crates
pub use respawn_core as core;
pub use respawn_events as events;
pub use respawn_pool as pool;

// Re-export commonly used types
pub use respawn_core::{InstanceHandle, InstanceHost, PrototypeId, Stage};
pub use respawn_events::State;
pub use respawn_pool::{PoolError, PoolResult, Pools, PoolsConfig};
pub use session::Session;
