// src/watch/filter.rs

//! Decides which raw events count as "the monitored process should reload".

use crate::config::WatchSection;
use crate::watch::backend::{OpKind, RawEvent};

/// Outcome of looking at a single raw event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDecision {
    /// Not a write; only interesting for verbose logging.
    NotAWrite,
    /// A write to a file whose suffix is not watched.
    UnwatchedExtension,
    /// A write to a watched file type.
    Reload,
}

/// Write-kind + suffix rule.
#[derive(Debug, Clone)]
pub struct ReloadFilter {
    extensions: Vec<String>,
}

impl ReloadFilter {
    pub fn new(extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn from_config(watch: &WatchSection) -> Self {
        Self::new(watch.extensions.iter().cloned())
    }

    pub fn decide(&self, event: &RawEvent) -> EventDecision {
        if event.kind != OpKind::Write {
            return EventDecision::NotAWrite;
        }
        // Exact, case-sensitive suffix on the whole path.
        let path = event.path.to_string_lossy();
        if self.extensions.iter().any(|ext| path.ends_with(ext.as_str())) {
            EventDecision::Reload
        } else {
            EventDecision::UnwatchedExtension
        }
    }
}

impl Default for ReloadFilter {
    fn default() -> Self {
        Self::from_config(&WatchSection::default())
    }
}
