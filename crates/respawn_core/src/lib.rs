//! # RESPAWN Core
//!
//! Instance handles and the host seam the pooling layer is built against.
//!
//! ## Architecture Rules
//!
//! 1. **Handles, never references** - the host owns every instance; callers
//!    hold generation-counted handles that go stale safely
//! 2. **One seam** - everything the pooling layer needs from an engine is the
//!    [`InstanceHost`] trait; [`Stage`] is the in-memory reference host
//! 3. **Single-threaded by contract** - all mutation goes through `&mut`,
//!    cooperative with the host's update loop
//!
//! ## Example
//!
//! ```rust,ignore
//! use respawn_core::{InstanceHost, Stage};
//!
//! let mut stage = Stage::new();
//! let spark = stage.register_prototype("spark");
//! let handle = stage.create(spark, None).unwrap();
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod handle;
pub mod host;
pub mod stage;

pub use handle::{InstanceHandle, PrototypeId};
pub use host::InstanceHost;
pub use stage::Stage;
