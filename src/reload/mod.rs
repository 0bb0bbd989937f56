// src/reload/mod.rs

//! Debounced reload dispatch.
//!
//! The counting rules live in [`debounce`] as a plain state machine; the
//! async worker around it (tick timer, channels, signal delivery) is in
//! [`worker`].

pub mod debounce;
pub mod worker;

pub use debounce::{PendingReloads, TickOutcome};
pub use worker::{DebounceOptions, DebounceStats, ReloadDebouncer};
