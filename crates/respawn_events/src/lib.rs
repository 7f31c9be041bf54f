//! # RESPAWN Events
//!
//! Observable state: a value cell that notifies subscribers when the value
//! changes. See [`State`].

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod state;

pub use state::{State, SubscriptionId};
