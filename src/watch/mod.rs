// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Building the fixed set of directories to watch (exclusion rules apply
//!   to whole subtrees).
//! - Wrapping the platform notification service (`notify`) behind a small
//!   backend contract.
//! - Filtering raw events down to writes of watched file types and turning
//!   them into reload requests.
//!
//! It does **not** know about ticks or signals; debouncing lives in
//! [`crate::reload`].

pub mod backend;
pub mod filter;
pub mod indexer;
pub mod watcher;

pub use backend::{BackendStreams, NotifyBackend, OpKind, RawEvent, WatchBackend};
pub use filter::{EventDecision, ReloadFilter};
pub use indexer::{index_directories, register_watch_set, ExclusionRules, Visit, WatchSet};
pub use watcher::EventWatcher;
