// src/watch/backend.rs

//! Filesystem-event backend abstraction.
//!
//! The event watcher only ever sees two streams: raw events and backend
//! errors. Whoever owns the backend ends both streams by calling
//! [`WatchBackend::close`]. Production code uses [`NotifyBackend`]; tests can
//! provide a backend that injects events by hand.

use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::ModifyKind;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::trace;

use crate::errors::{ReloaderError, Result};

/// Kind of filesystem operation reported for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    Write,
    Create,
    Remove,
    Rename,
    Chmod,
    Other,
}

impl From<&EventKind> for OpKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                OpKind::Write
            }
            EventKind::Modify(ModifyKind::Name(_)) => OpKind::Rename,
            EventKind::Modify(ModifyKind::Metadata(_)) => OpKind::Chmod,
            EventKind::Create(_) => OpKind::Create,
            EventKind::Remove(_) => OpKind::Remove,
            _ => OpKind::Other,
        }
    }
}

/// One path touched by one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEvent {
    pub path: PathBuf,
    pub kind: OpKind,
}

impl RawEvent {
    pub fn new(path: impl Into<PathBuf>, kind: OpKind) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a notify event into one `RawEvent` per affected path.
    pub fn from_notify(event: Event) -> Vec<RawEvent> {
        let kind = OpKind::from(&event.kind);
        event
            .paths
            .into_iter()
            .map(|path| RawEvent { path, kind })
            .collect()
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.path.display())
    }
}

/// Receiving ends handed out when a backend is created.
///
/// Both streams yield `None` once the backend has been closed.
#[derive(Debug)]
pub struct BackendStreams {
    pub events: mpsc::UnboundedReceiver<RawEvent>,
    pub errors: mpsc::UnboundedReceiver<notify::Error>,
}

/// Contract the reloader needs from a filesystem notification service.
pub trait WatchBackend: Send + 'static {
    /// Start delivering events for entries directly inside `dir`.
    fn register(&mut self, dir: &Path) -> Result<()>;

    /// Stop all delivery. Both [`BackendStreams`] end afterwards.
    ///
    /// Calling it again is a no-op.
    fn close(&mut self) -> Result<()>;
}

/// Backend built on `notify`'s platform watcher.
pub struct NotifyBackend {
    inner: Option<RecommendedWatcher>,
    registered: Vec<PathBuf>,
}

impl fmt::Debug for NotifyBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotifyBackend")
            .field("open", &self.inner.is_some())
            .field("registered", &self.registered.len())
            .finish()
    }
}

impl NotifyBackend {
    /// Create the platform watcher and the two streams it feeds.
    pub fn new() -> Result<(Self, BackendStreams)> {
        let (event_tx, events) = mpsc::unbounded_channel::<RawEvent>();
        let (error_tx, errors) = mpsc::unbounded_channel::<notify::Error>();

        // Called synchronously on notify's own thread. The senders live in
        // this closure, so dropping the watcher ends both streams.
        let watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    for raw in RawEvent::from_notify(event) {
                        if event_tx.send(raw).is_err() {
                            trace!("event stream receiver gone; dropping event");
                        }
                    }
                }
                Err(err) => {
                    if error_tx.send(err).is_err() {
                        trace!("error stream receiver gone; dropping backend error");
                    }
                }
            },
            Config::default(),
        )?;

        let backend = Self {
            inner: Some(watcher),
            registered: Vec::new(),
        };
        Ok((backend, BackendStreams { events, errors }))
    }
}

impl WatchBackend for NotifyBackend {
    fn register(&mut self, dir: &Path) -> Result<()> {
        let Some(watcher) = self.inner.as_mut() else {
            return Err(ReloaderError::Backend(notify::Error::generic(
                "watch backend already closed",
            )));
        };
        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .map_err(|source| ReloaderError::Registration {
                path: dir.to_path_buf(),
                source,
            })?;
        self.registered.push(dir.to_path_buf());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let Some(mut watcher) = self.inner.take() else {
            return Ok(());
        };

        // Try every directory, report the first failure.
        let mut first_err = None;
        for dir in self.registered.drain(..) {
            if let Err(err) = watcher.unwatch(&dir) {
                first_err.get_or_insert(err);
            }
        }
        drop(watcher);

        match first_err {
            Some(err) => Err(ReloaderError::Backend(err)),
            None => Ok(()),
        }
    }
}
