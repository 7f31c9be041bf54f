//! # RESPAWN Pool
//!
//! Per-prototype instance pooling over any [`InstanceHost`]:
//!
//! - Pools are created lazily on first request and prewarmed with a
//!   configurable default count of deactivated instances
//! - Acquire reuses the most recently freed instance (LIFO), silently
//!   discarding handles the host destroyed out-of-band
//! - Release is O(1) to route (reverse map) and a safe no-op for handles
//!   the pool never issued
//! - Auto-release leases and an incremental destroyed-instance sweep run
//!   from a once-per-frame [`Pools::tick`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use respawn_core::Stage;
//! use respawn_pool::Pools;
//!
//! let mut stage = Stage::new();
//! let bullet = stage.register_prototype("bullet");
//!
//! let mut pools = Pools::new();
//! pools.prepare(&mut stage, bullet, 32);
//!
//! let shot = pools.acquire(&mut stage, bullet, None).unwrap();
//! pools.release(&mut stage, shot);
//! ```
//!
//! [`InstanceHost`]: respawn_core::InstanceHost

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
mod lease;
pub mod pool;
pub mod stats;

pub use config::{PoolsConfig, PrewarmEntry, DEFAULT_POOL_COUNT};
pub use error::{PoolError, PoolResult};
pub use pool::{Pool, Pools};
pub use stats::PoolStats;
